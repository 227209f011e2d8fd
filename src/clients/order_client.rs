use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

use super::{client_method, client_shutdown, AdminClient, AuthClient, CartClient};
use crate::domain::{
    AdminUser, Address, CustomerSnapshot, Order, OrderDraft, OrderStatus, PaymentMethod,
};
use crate::error::OrderError;
use crate::messages::OrderRequest;

/// Raw handle to the order actor's request channel.
#[derive(Clone)]
pub struct OrderSender {
    sender: mpsc::Sender<OrderRequest>,
}

impl OrderSender {
    pub fn new(sender: mpsc::Sender<OrderRequest>) -> Self {
        Self { sender }
    }
}

client_method!(OrderSender => fn place_order(draft: OrderDraft) -> Order as OrderRequest::PlaceOrder, Error = OrderError);
client_method!(OrderSender => fn get_order(id: String) -> Option<Order> as OrderRequest::GetOrder, Error = OrderError);
client_method!(OrderSender => fn list_orders(actor: AdminUser) -> Vec<Order> as OrderRequest::ListOrders, Error = OrderError);
client_method!(OrderSender => fn transition(actor: AdminUser, order_id: String, status: OrderStatus) -> Order as OrderRequest::Transition, Error = OrderError);
client_method!(OrderSender => fn reject(actor: AdminUser, order_id: String, reason: String) -> Order as OrderRequest::Reject, Error = OrderError);
client_shutdown!(OrderSender => OrderRequest);

/// Checkout choices made by the customer.
#[derive(Debug, Clone)]
pub struct CheckoutOptions {
    pub is_delivery: bool,
    pub payment_method: PaymentMethod,
    /// Alternate delivery address picked for this order, when delivery is
    /// selected. `None` falls back to the profile address.
    pub selected_address: Option<Address>,
}

/// Client for the order actor.
///
/// Checkout is orchestration across services: session, cart, config and the
/// order actor itself. The cart is cleared only after the order is stored.
#[derive(Clone)]
pub struct OrderClient {
    inner: OrderSender,
    auth: AuthClient,
    cart: CartClient,
    admin: AdminClient,
}

impl OrderClient {
    pub fn new(
        inner: OrderSender,
        auth: AuthClient,
        cart: CartClient,
        admin: AdminClient,
    ) -> Self {
        Self { inner, auth, cart, admin }
    }

    #[instrument(skip(self))]
    pub async fn checkout(&self, options: CheckoutOptions) -> Result<Order, OrderError> {
        info!("Processing checkout request");

        // Step 1: a customer must be logged in
        let customer = match self.auth.current_customer().await {
            Ok(Some(customer)) => {
                info!(customer_name = %customer.name, "Customer session found");
                customer
            }
            Ok(None) => {
                error!("No customer logged in");
                return Err(OrderError::Unauthenticated);
            }
            Err(e) => {
                error!(error = %e, "Session lookup failed");
                return Err(OrderError::ActorCommunicationError(e.to_string()));
            }
        };

        // Step 2: the cart must have lines
        let lines = self
            .cart
            .get_lines(customer.id.clone())
            .await
            .map_err(|e| OrderError::ActorCommunicationError(e.to_string()))?;
        if lines.is_empty() {
            error!("Checkout with empty cart");
            return Err(OrderError::EmptyCart);
        }

        // Step 3: totals with the configured delivery fee
        let config = self
            .admin
            .get_config()
            .await
            .map_err(|e| OrderError::ActorCommunicationError(e.to_string()))?;
        let delivery_fee = if options.is_delivery {
            config.delivery_fee
        } else {
            Decimal::ZERO
        };
        let subtotal: Decimal = lines.iter().map(|l| l.total_price).sum();

        // Step 4: freeze the customer with the resolved delivery address
        let selected = if options.is_delivery {
            options.selected_address
        } else {
            None
        };
        let snapshot = CustomerSnapshot::from_customer(&customer, selected);

        let draft = OrderDraft {
            customer: snapshot,
            lines,
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
            is_delivery: options.is_delivery,
            payment_method: options.payment_method,
        };
        let order = self.inner.place_order(draft).await?;
        info!(order_number = %order.order_number, total = %order.total, "Order placed");

        // Step 5: clear the cart only after the order is stored
        if let Err(e) = self.cart.clear(customer.id).await {
            warn!(error = %e, "Order stored but cart could not be cleared");
        }

        Ok(order)
    }

    pub async fn get_order(&self, id: String) -> Result<Option<Order>, OrderError> {
        self.inner.get_order(id).await
    }

    pub async fn list_orders(&self, actor: AdminUser) -> Result<Vec<Order>, OrderError> {
        self.inner.list_orders(actor).await
    }

    pub async fn transition(
        &self,
        actor: AdminUser,
        order_id: String,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        self.inner.transition(actor, order_id, status).await
    }

    pub async fn reject(
        &self,
        actor: AdminUser,
        order_id: String,
        reason: String,
    ) -> Result<Order, OrderError> {
        self.inner.reject(actor, order_id, reason).await
    }

    pub async fn shutdown(&self) -> Result<(), String> {
        self.inner.shutdown().await
    }
}
