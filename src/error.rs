use thiserror::Error;

use crate::domain::{OrderStatus, QuantityTier};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Item not found: {0}")]
    NotFound(u32),
    #[error("Catalog validation error: {0}")]
    ValidationError(String),
    #[error("Tier {tier} is not available for item: {item}")]
    InvalidTierForItem { item: String, tier: QuantityTier },
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Cart line not found: {0}")]
    LineNotFound(u64),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Cannot checkout an empty cart")]
    EmptyCart,
    #[error("No customer is logged in")]
    Unauthenticated,
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStateTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdminError {
    #[error("Admin not found: {0}")]
    NotFound(String),
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Admin validation error: {0}")]
    ValidationError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("Customer not found: {0}")]
    NotFound(String),
    #[error("Customer already registered: {0}")]
    AlreadyExists(String),
    #[error("Invalid phone or password")]
    InvalidCredentials,
    #[error("Registration validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
