use rust_decimal::Decimal;
use tokio::sync::oneshot;

use crate::domain::{
    AdminCreate, AdminUser, Address, AppConfig, CartLine, CartSummary, Category, Customer,
    CustomerRegistration, MenuItem, MenuItemCreate, MenuItemPatch, Order, OrderDraft,
    OrderStatus, QuantityTier,
};
use crate::error::{AdminError, AuthError, CartError, CatalogError, OrderError};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed message enums for service communication. Each variant carries its
/// parameters and a oneshot channel for the response. Mutating admin
/// operations carry the acting admin so handlers can check section
/// permissions before touching state.

#[derive(Debug)]
pub enum CatalogRequest {
    ResolveItem {
        id: u32,
        respond_to: ServiceResponse<MenuItem, CatalogError>,
    },
    ListItems {
        category: Option<Category>,
        respond_to: ServiceResponse<Vec<MenuItem>, CatalogError>,
    },
    AddCustomItem {
        actor: AdminUser,
        payload: MenuItemCreate,
        respond_to: ServiceResponse<MenuItem, CatalogError>,
    },
    UpdateItem {
        actor: AdminUser,
        id: u32,
        patch: MenuItemPatch,
        respond_to: ServiceResponse<MenuItem, CatalogError>,
    },
    DeleteItem {
        actor: AdminUser,
        id: u32,
        respond_to: ServiceResponse<(), CatalogError>,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum CartRequest {
    AddLine {
        customer_id: String,
        item: MenuItem,
        tier: QuantityTier,
        unit_count: u32,
        respond_to: ServiceResponse<CartLine, CartError>,
    },
    RemoveLine {
        customer_id: String,
        line_id: u64,
        respond_to: ServiceResponse<(), CartError>,
    },
    ChangeQuantity {
        customer_id: String,
        line_id: u64,
        delta: i32,
        respond_to: ServiceResponse<Option<CartLine>, CartError>,
    },
    GetLines {
        customer_id: String,
        respond_to: ServiceResponse<Vec<CartLine>, CartError>,
    },
    Summary {
        customer_id: String,
        delivery_fee: Decimal,
        respond_to: ServiceResponse<CartSummary, CartError>,
    },
    Clear {
        customer_id: String,
        respond_to: ServiceResponse<(), CartError>,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum OrderRequest {
    PlaceOrder {
        draft: OrderDraft,
        respond_to: ServiceResponse<Order, OrderError>,
    },
    GetOrder {
        id: String,
        respond_to: ServiceResponse<Option<Order>, OrderError>,
    },
    ListOrders {
        actor: AdminUser,
        respond_to: ServiceResponse<Vec<Order>, OrderError>,
    },
    Transition {
        actor: AdminUser,
        order_id: String,
        status: OrderStatus,
        respond_to: ServiceResponse<Order, OrderError>,
    },
    Reject {
        actor: AdminUser,
        order_id: String,
        reason: String,
        respond_to: ServiceResponse<Order, OrderError>,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum AdminRequest {
    Login {
        username: String,
        password: String,
        respond_to: ServiceResponse<AdminUser, AdminError>,
    },
    Logout {
        respond_to: ServiceResponse<(), AdminError>,
    },
    CurrentAdmin {
        respond_to: ServiceResponse<Option<AdminUser>, AdminError>,
    },
    ListAdmins {
        actor: AdminUser,
        respond_to: ServiceResponse<Vec<AdminUser>, AdminError>,
    },
    AddAdmin {
        actor: AdminUser,
        payload: AdminCreate,
        respond_to: ServiceResponse<AdminUser, AdminError>,
    },
    DeleteAdmin {
        actor: AdminUser,
        id: String,
        respond_to: ServiceResponse<(), AdminError>,
    },
    GetConfig {
        respond_to: ServiceResponse<AppConfig, AdminError>,
    },
    SetDeliveryFee {
        actor: AdminUser,
        fee: Decimal,
        respond_to: ServiceResponse<AppConfig, AdminError>,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum AuthRequest {
    Register {
        registration: CustomerRegistration,
        respond_to: ServiceResponse<Customer, AuthError>,
    },
    Login {
        phone: String,
        password: String,
        respond_to: ServiceResponse<Customer, AuthError>,
    },
    Logout {
        respond_to: ServiceResponse<(), AuthError>,
    },
    CurrentCustomer {
        respond_to: ServiceResponse<Option<Customer>, AuthError>,
    },
    AddAddress {
        customer_id: String,
        address: Address,
        respond_to: ServiceResponse<Customer, AuthError>,
    },
    Shutdown,
}
