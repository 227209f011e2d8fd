use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::CartLine;
use super::customer::CustomerSnapshot;
use crate::error::OrderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Pix,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Card => "Cartão",
            PaymentMethod::Pix => "PIX",
        }
    }
}

/// Order lifecycle state.
///
/// Transitions only move forward one step at a time:
/// `pending → confirmed → ready → delivered`, with `pending → rejected` as
/// the other terminal branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Ready,
    Delivered,
    Rejected,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Aguardando Confirmação",
            OrderStatus::Confirmed => "Em Preparação",
            OrderStatus::Ready => "Pronto",
            OrderStatus::Delivered => "Entregue",
            OrderStatus::Rejected => "Recusado",
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Pending, OrderStatus::Rejected)
                | (OrderStatus::Confirmed, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::Delivered)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// One append-only history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

/// Everything the order service needs to stamp a new order. Assembled by the
/// checkout orchestration from the session, cart and config.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer: CustomerSnapshot,
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub is_delivery: bool,
    pub payment_method: PaymentMethod,
}

/// An immutable order record. After creation only `status`, `status_history`
/// and `rejection_reason` ever change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub customer: CustomerSnapshot,
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub is_delivery: bool,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub status_history: Vec<StatusEntry>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn from_draft(id: String, order_number: String, draft: OrderDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            order_number,
            customer: draft.customer,
            lines: draft.lines,
            subtotal: draft.subtotal,
            delivery_fee: draft.delivery_fee,
            total: draft.total,
            is_delivery: draft.is_delivery,
            payment_method: draft.payment_method,
            status: OrderStatus::Pending,
            status_history: vec![StatusEntry {
                status: OrderStatus::Pending,
                timestamp: now,
                description: "Pedido recebido - Aguardando confirmação".to_string(),
            }],
            rejection_reason: None,
            created_at: now,
        }
    }

    /// Advances to `next`, appending one history entry. Skipped or reversed
    /// transitions leave the order untouched.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if next == OrderStatus::Rejected {
            // Rejection goes through `reject` so a reason is always present.
            return Err(OrderError::ValidationError(
                "rejection requires a reason".to_string(),
            ));
        }
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.status_history.push(StatusEntry {
            status: next,
            timestamp: Utc::now(),
            description: next.label().to_string(),
        });
        Ok(())
    }

    /// Rejects a pending order. The trimmed reason must be non-empty; on any
    /// failure neither status nor history change.
    pub fn reject(&mut self, reason: &str) -> Result<(), OrderError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(OrderError::ValidationError(
                "rejection reason must not be empty".to_string(),
            ));
        }
        if !self.status.can_transition_to(OrderStatus::Rejected) {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: OrderStatus::Rejected,
            });
        }
        self.status = OrderStatus::Rejected;
        self.rejection_reason = Some(reason.to_string());
        self.status_history.push(StatusEntry {
            status: OrderStatus::Rejected,
            timestamp: Utc::now(),
            description: format!("Pedido recusado: {}", reason),
        });
        Ok(())
    }
}
