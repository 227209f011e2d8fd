use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, error, instrument};

use super::{client_method, client_shutdown, AdminClient, CatalogClient};
use crate::domain::{CartLine, CartSummary, MenuItem, QuantityTier};
use crate::error::CartError;
use crate::messages::CartRequest;

/// Raw handle to the cart actor's request channel.
#[derive(Clone)]
pub struct CartSender {
    sender: mpsc::Sender<CartRequest>,
}

impl CartSender {
    pub fn new(sender: mpsc::Sender<CartRequest>) -> Self {
        Self { sender }
    }
}

client_method!(CartSender => fn add_line(customer_id: String, item: MenuItem, tier: QuantityTier, unit_count: u32) -> CartLine as CartRequest::AddLine, Error = CartError);
client_method!(CartSender => fn remove_line(customer_id: String, line_id: u64) -> () as CartRequest::RemoveLine, Error = CartError);
client_method!(CartSender => fn change_quantity(customer_id: String, line_id: u64, delta: i32) -> Option<CartLine> as CartRequest::ChangeQuantity, Error = CartError);
client_method!(CartSender => fn get_lines(customer_id: String) -> Vec<CartLine> as CartRequest::GetLines, Error = CartError);
client_method!(CartSender => fn summary(customer_id: String, delivery_fee: Decimal) -> CartSummary as CartRequest::Summary, Error = CartError);
client_method!(CartSender => fn clear(customer_id: String) -> () as CartRequest::Clear, Error = CartError);
client_shutdown!(CartSender => CartRequest);

/// Client for the cart actor.
///
/// Orchestrates with the catalog (item lookup when adding by id) and the
/// admin config (delivery fee for summaries), so callers only name an item
/// and a tier.
#[derive(Clone)]
pub struct CartClient {
    inner: CartSender,
    catalog: CatalogClient,
    admin: AdminClient,
}

impl CartClient {
    pub fn new(inner: CartSender, catalog: CatalogClient, admin: AdminClient) -> Self {
        Self { inner, catalog, admin }
    }

    /// Resolves `item_id` through the catalog and adds one order of `tier`
    /// to the customer's cart, merging with an identical selection.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        customer_id: String,
        item_id: u32,
        tier: QuantityTier,
        unit_count: u32,
    ) -> Result<CartLine, CartError> {
        debug!("Sending request");
        let item = self.catalog.resolve_item(item_id).await?;
        self.inner.add_line(customer_id, item, tier, unit_count).await
    }

    /// Cart totals with the configured delivery fee applied when delivery is
    /// selected.
    #[instrument(skip(self))]
    pub async fn summary(
        &self,
        customer_id: String,
        is_delivery: bool,
    ) -> Result<CartSummary, CartError> {
        debug!("Sending request");
        let delivery_fee = if is_delivery {
            match self.admin.get_config().await {
                Ok(config) => config.delivery_fee,
                Err(e) => {
                    error!(error = %e, "Failed to load delivery fee");
                    return Err(CartError::ActorCommunicationError(e.to_string()));
                }
            }
        } else {
            Decimal::ZERO
        };
        self.inner.summary(customer_id, delivery_fee).await
    }

    pub async fn remove_line(&self, customer_id: String, line_id: u64) -> Result<(), CartError> {
        self.inner.remove_line(customer_id, line_id).await
    }

    pub async fn change_quantity(
        &self,
        customer_id: String,
        line_id: u64,
        delta: i32,
    ) -> Result<Option<CartLine>, CartError> {
        self.inner.change_quantity(customer_id, line_id, delta).await
    }

    pub async fn get_lines(&self, customer_id: String) -> Result<Vec<CartLine>, CartError> {
        self.inner.get_lines(customer_id).await
    }

    pub async fn clear(&self, customer_id: String) -> Result<(), CartError> {
        self.inner.clear(customer_id).await
    }

    pub async fn shutdown(&self) -> Result<(), String> {
        self.inner.shutdown().await
    }
}
