use std::collections::HashMap;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use super::send_error;
use crate::clients::CartSender;
use crate::domain::{CartLine, CartSummary, MenuItem, QuantityTier};
use crate::error::CartError;
use crate::messages::{CartRequest, ServiceResponse};
use crate::storage::{self, KeyValueStore};

const CARTS_KEY: &str = "carts";

/// Cart actor: one working set of lines per customer session.
///
/// Line prices are snapshots; `change_quantity` derives the per-tier price by
/// dividing out the previous quantity instead of re-asking the catalog, so a
/// price captured at add time holds for the whole session.
pub struct CartService {
    receiver: mpsc::Receiver<CartRequest>,
    carts: HashMap<String, Vec<CartLine>>,
    next_line_id: u64,
    store: Box<dyn KeyValueStore>,
}

impl CartService {
    pub fn new(buffer_size: usize, store: Box<dyn KeyValueStore>) -> (Self, CartSender) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let carts: HashMap<String, Vec<CartLine>> =
            storage::load(store.as_ref(), CARTS_KEY).unwrap_or_default();
        let next_line_id = carts
            .values()
            .flatten()
            .map(|l| l.line_id)
            .max()
            .unwrap_or(0)
            + 1;
        let service = Self {
            receiver,
            carts,
            next_line_id,
            store,
        };
        (service, CartSender::new(sender))
    }

    #[instrument(name = "cart_service", skip(self))]
    pub async fn run(mut self) {
        info!("CartService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CartRequest::AddLine { customer_id, item, tier, unit_count, respond_to } => {
                    self.handle_add_line(customer_id, item, tier, unit_count, respond_to);
                }
                CartRequest::RemoveLine { customer_id, line_id, respond_to } => {
                    self.handle_remove_line(customer_id, line_id, respond_to);
                }
                CartRequest::ChangeQuantity { customer_id, line_id, delta, respond_to } => {
                    self.handle_change_quantity(customer_id, line_id, delta, respond_to);
                }
                CartRequest::GetLines { customer_id, respond_to } => {
                    self.handle_get_lines(customer_id, respond_to);
                }
                CartRequest::Summary { customer_id, delivery_fee, respond_to } => {
                    self.handle_summary(customer_id, delivery_fee, respond_to);
                }
                CartRequest::Clear { customer_id, respond_to } => {
                    self.handle_clear(customer_id, respond_to);
                }
                CartRequest::Shutdown => {
                    info!("CartService shutting down");
                    break;
                }
            }
        }

        info!("CartService stopped");
    }

    fn persist(&mut self) {
        storage::persist(self.store.as_mut(), CARTS_KEY, &self.carts);
    }

    #[instrument(fields(customer_id = %customer_id, item_id = item.id, %tier), skip(self, customer_id, item, respond_to))]
    fn handle_add_line(
        &mut self,
        customer_id: String,
        item: MenuItem,
        tier: QuantityTier,
        unit_count: u32,
        respond_to: ServiceResponse<CartLine, CartError>,
    ) {
        debug!("Processing add_line request");

        let tier_price = match item.price_for_tier(tier, unit_count) {
            Ok(price) => price,
            Err(e) => send_error!(respond_to, CartError::from(e)),
        };

        let lines = self.carts.entry(customer_id).or_default();
        let line = match lines
            .iter_mut()
            .find(|l| l.merges_with(item.id, tier, unit_count))
        {
            Some(existing) => {
                existing.quantity += 1;
                existing.total_price += tier_price;
                info!(line_id = existing.line_id, quantity = existing.quantity, "Merged into existing line");
                existing.clone()
            }
            None => {
                let line = CartLine::new(self.next_line_id, &item, tier, unit_count, tier_price);
                self.next_line_id += 1;
                lines.push(line.clone());
                info!(line_id = line.line_id, "Line added");
                line
            }
        };

        self.persist();
        let _ = respond_to.send(Ok(line));
    }

    /// Removal is idempotent: removing an absent line succeeds.
    #[instrument(fields(customer_id = %customer_id, line_id), skip(self, customer_id, respond_to))]
    fn handle_remove_line(
        &mut self,
        customer_id: String,
        line_id: u64,
        respond_to: ServiceResponse<(), CartError>,
    ) {
        debug!("Processing remove_line request");
        if let Some(lines) = self.carts.get_mut(&customer_id) {
            lines.retain(|l| l.line_id != line_id);
        }
        self.persist();
        let _ = respond_to.send(Ok(()));
    }

    #[instrument(fields(customer_id = %customer_id, line_id, delta), skip(self, customer_id, respond_to))]
    fn handle_change_quantity(
        &mut self,
        customer_id: String,
        line_id: u64,
        delta: i32,
        respond_to: ServiceResponse<Option<CartLine>, CartError>,
    ) {
        debug!("Processing change_quantity request");

        let Some(lines) = self.carts.get_mut(&customer_id) else {
            send_error!(respond_to, CartError::LineNotFound(line_id));
        };
        let Some(index) = lines.iter().position(|l| l.line_id == line_id) else {
            send_error!(respond_to, CartError::LineNotFound(line_id));
        };

        let line = &mut lines[index];
        let new_quantity = i64::from(line.quantity) + i64::from(delta);
        let result = if new_quantity <= 0 {
            lines.remove(index);
            info!("Line removed by quantity change");
            None
        } else {
            let new_quantity = new_quantity as u32;
            // Derive the per-tier price from the stored total so session
            // price adjustments survive quantity changes.
            let tier_price = line.total_price / Decimal::from(line.quantity);
            line.quantity = new_quantity;
            line.total_price = tier_price * Decimal::from(new_quantity);
            info!(quantity = new_quantity, "Line quantity changed");
            Some(line.clone())
        };

        self.persist();
        let _ = respond_to.send(Ok(result));
    }

    #[instrument(fields(customer_id = %customer_id), skip(self, customer_id, respond_to))]
    fn handle_get_lines(
        &self,
        customer_id: String,
        respond_to: ServiceResponse<Vec<CartLine>, CartError>,
    ) {
        debug!("Processing get_lines request");
        let lines = self.carts.get(&customer_id).cloned().unwrap_or_default();
        let _ = respond_to.send(Ok(lines));
    }

    #[instrument(fields(customer_id = %customer_id), skip(self, customer_id, respond_to))]
    fn handle_summary(
        &self,
        customer_id: String,
        delivery_fee: Decimal,
        respond_to: ServiceResponse<CartSummary, CartError>,
    ) {
        debug!("Processing summary request");
        let lines = self.carts.get(&customer_id).map(Vec::as_slice).unwrap_or(&[]);
        let summary = CartSummary::compute(lines, delivery_fee);
        info!(subtotal = %summary.subtotal, total = %summary.total, "Cart summarized");
        let _ = respond_to.send(Ok(summary));
    }

    #[instrument(fields(customer_id = %customer_id), skip(self, customer_id, respond_to))]
    fn handle_clear(
        &mut self,
        customer_id: String,
        respond_to: ServiceResponse<(), CartError>,
    ) {
        debug!("Processing clear request");
        self.carts.remove(&customer_id);
        self.persist();
        let _ = respond_to.send(Ok(()));
    }
}
