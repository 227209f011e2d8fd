use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use super::send_error;
use crate::clients::OrderSender;
use crate::domain::{AdminUser, Order, OrderDraft, OrderStatus, Section};
use crate::error::OrderError;
use crate::messages::{OrderRequest, ServiceResponse};
use crate::storage::{self, KeyValueStore};

const ORDERS_KEY: &str = "orders";

/// Order actor: immutable order records and their status state machine.
///
/// Orders are created once at checkout; afterwards only status, history and
/// the rejection reason ever change, and only through admin-triggered
/// transitions.
pub struct OrderService {
    receiver: mpsc::Receiver<OrderRequest>,
    orders: HashMap<String, Order>,
    order_seq: u64,
    store: Box<dyn KeyValueStore>,
}

impl OrderService {
    pub fn new(buffer_size: usize, store: Box<dyn KeyValueStore>) -> (Self, OrderSender) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let orders: HashMap<String, Order> =
            storage::load(store.as_ref(), ORDERS_KEY).unwrap_or_default();
        let order_seq = orders.len() as u64 + 1;
        let service = Self {
            receiver,
            orders,
            order_seq,
            store,
        };
        (service, OrderSender::new(sender))
    }

    #[instrument(name = "order_service", skip(self))]
    pub async fn run(mut self) {
        info!("OrderService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                OrderRequest::PlaceOrder { draft, respond_to } => {
                    self.handle_place_order(draft, respond_to);
                }
                OrderRequest::GetOrder { id, respond_to } => {
                    self.handle_get_order(id, respond_to);
                }
                OrderRequest::ListOrders { actor, respond_to } => {
                    self.handle_list_orders(actor, respond_to);
                }
                OrderRequest::Transition { actor, order_id, status, respond_to } => {
                    self.handle_transition(actor, order_id, status, respond_to);
                }
                OrderRequest::Reject { actor, order_id, reason, respond_to } => {
                    self.handle_reject(actor, order_id, reason, respond_to);
                }
                OrderRequest::Shutdown => {
                    info!("OrderService shutting down");
                    break;
                }
            }
        }

        info!("OrderService stopped");
    }

    fn persist(&mut self) {
        storage::persist(self.store.as_mut(), ORDERS_KEY, &self.orders);
    }

    #[instrument(fields(customer = %draft.customer.name, total = %draft.total), skip(self, draft, respond_to))]
    fn handle_place_order(
        &mut self,
        draft: OrderDraft,
        respond_to: ServiceResponse<Order, OrderError>,
    ) {
        debug!("Processing place_order request");

        if draft.lines.is_empty() {
            error!("Draft has no lines");
            send_error!(respond_to, OrderError::EmptyCart);
        }

        let id = format!("order_{}", self.order_seq);
        let order_number = format!("PED-{:04}", self.order_seq);
        self.order_seq += 1;

        let order = Order::from_draft(id.clone(), order_number, draft);
        self.orders.insert(id, order.clone());
        self.persist();

        info!(order_number = %order.order_number, "Order created");
        let _ = respond_to.send(Ok(order));
    }

    #[instrument(fields(order_id = %id), skip(self, respond_to))]
    fn handle_get_order(&self, id: String, respond_to: ServiceResponse<Option<Order>, OrderError>) {
        debug!("Processing get_order request");
        let order = self.orders.get(&id).cloned();
        match &order {
            Some(order) => debug!(status = %order.status, "Order found"),
            None => debug!("Order not found"),
        }
        let _ = respond_to.send(Ok(order));
    }

    #[instrument(fields(admin = %actor.username), skip(self, actor, respond_to))]
    fn handle_list_orders(
        &self,
        actor: AdminUser,
        respond_to: ServiceResponse<Vec<Order>, OrderError>,
    ) {
        debug!("Processing list_orders request");

        if !actor.has_permission(Section::Pedidos) {
            error!("Permission denied");
            send_error!(
                respond_to,
                OrderError::PermissionDenied(format!("{} cannot view orders", actor.username))
            );
        }

        let mut orders: Vec<Order> = self.orders.values().cloned().collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_number.cmp(&a.order_number))
        });
        info!(count = orders.len(), "Listed orders");
        let _ = respond_to.send(Ok(orders));
    }

    #[instrument(fields(admin = %actor.username, order_id = %order_id, %status), skip(self, actor, order_id, respond_to))]
    fn handle_transition(
        &mut self,
        actor: AdminUser,
        order_id: String,
        status: OrderStatus,
        respond_to: ServiceResponse<Order, OrderError>,
    ) {
        debug!("Processing transition request");

        if !actor.has_permission(Section::Pedidos) {
            error!("Permission denied");
            send_error!(
                respond_to,
                OrderError::PermissionDenied(format!("{} cannot manage orders", actor.username))
            );
        }

        let Some(order) = self.orders.get_mut(&order_id) else {
            debug!("Order not found");
            send_error!(respond_to, OrderError::NotFound(order_id));
        };

        match order.transition(status) {
            Ok(()) => {
                let updated = order.clone();
                self.persist();
                info!(order_number = %updated.order_number, "Order status updated");
                let _ = respond_to.send(Ok(updated));
            }
            Err(e) => {
                error!(error = %e, "Transition refused");
                let _ = respond_to.send(Err(e));
            }
        }
    }

    #[instrument(fields(admin = %actor.username, order_id = %order_id), skip(self, actor, order_id, reason, respond_to))]
    fn handle_reject(
        &mut self,
        actor: AdminUser,
        order_id: String,
        reason: String,
        respond_to: ServiceResponse<Order, OrderError>,
    ) {
        debug!("Processing reject request");

        if !actor.has_permission(Section::Pedidos) {
            error!("Permission denied");
            send_error!(
                respond_to,
                OrderError::PermissionDenied(format!("{} cannot manage orders", actor.username))
            );
        }

        let Some(order) = self.orders.get_mut(&order_id) else {
            debug!("Order not found");
            send_error!(respond_to, OrderError::NotFound(order_id));
        };

        match order.reject(&reason) {
            Ok(()) => {
                let updated = order.clone();
                self.persist();
                info!(order_number = %updated.order_number, "Order rejected");
                let _ = respond_to.send(Ok(updated));
            }
            Err(e) => {
                error!(error = %e, "Rejection refused");
                let _ = respond_to.send(Err(e));
            }
        }
    }
}
