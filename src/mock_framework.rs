//! # Mock Framework
//!
//! Utilities for testing the orchestrating clients in isolation.
//!
//! The composite clients ([`CartClient`](crate::clients::CartClient),
//! [`OrderClient`](crate::clients::OrderClient)) contain real logic that is
//! worth testing without spinning up every service: instead of a running
//! actor we hand the client a channel we control, inspect the requests that
//! arrive on it and answer them ourselves. That lets a test simulate any
//! service behavior (success, failure, empty results) deterministically.

use tokio::sync::{mpsc, oneshot};

use crate::clients::{AdminClient, AuthClient, CartSender, CatalogClient, OrderSender};
use crate::domain::{AppConfig, CartLine, Customer, Order, OrderDraft};
use crate::error::{AdminError, AuthError, CartError, OrderError};
use crate::messages::{AdminRequest, AuthRequest, CartRequest, CatalogRequest, OrderRequest};

pub fn mock_auth_client(buffer_size: usize) -> (AuthClient, mpsc::Receiver<AuthRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (AuthClient::new(sender), receiver)
}

pub fn mock_admin_client(buffer_size: usize) -> (AdminClient, mpsc::Receiver<AdminRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (AdminClient::new(sender), receiver)
}

pub fn mock_cart_sender(buffer_size: usize) -> (CartSender, mpsc::Receiver<CartRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (CartSender::new(sender), receiver)
}

pub fn mock_catalog_client(buffer_size: usize) -> (CatalogClient, mpsc::Receiver<CatalogRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (CatalogClient::new(sender), receiver)
}

pub fn mock_order_sender(buffer_size: usize) -> (OrderSender, mpsc::Receiver<OrderRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (OrderSender::new(sender), receiver)
}

/// Next message must be a `CurrentCustomer` lookup.
pub async fn expect_current_customer(
    receiver: &mut mpsc::Receiver<AuthRequest>,
) -> Option<oneshot::Sender<Result<Option<Customer>, AuthError>>> {
    match receiver.recv().await {
        Some(AuthRequest::CurrentCustomer { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Next message must be a `GetLines` request; returns the customer id too.
pub async fn expect_get_lines(
    receiver: &mut mpsc::Receiver<CartRequest>,
) -> Option<(String, oneshot::Sender<Result<Vec<CartLine>, CartError>>)> {
    match receiver.recv().await {
        Some(CartRequest::GetLines { customer_id, respond_to }) => {
            Some((customer_id, respond_to))
        }
        _ => None,
    }
}

/// Next message must be a `Clear` request.
pub async fn expect_clear(
    receiver: &mut mpsc::Receiver<CartRequest>,
) -> Option<(String, oneshot::Sender<Result<(), CartError>>)> {
    match receiver.recv().await {
        Some(CartRequest::Clear { customer_id, respond_to }) => Some((customer_id, respond_to)),
        _ => None,
    }
}

/// Next message must be a `GetConfig` request.
pub async fn expect_get_config(
    receiver: &mut mpsc::Receiver<AdminRequest>,
) -> Option<oneshot::Sender<Result<AppConfig, AdminError>>> {
    match receiver.recv().await {
        Some(AdminRequest::GetConfig { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Next message must be a `PlaceOrder` request; returns the draft too.
pub async fn expect_place_order(
    receiver: &mut mpsc::Receiver<OrderRequest>,
) -> Option<(OrderDraft, oneshot::Sender<Result<Order, OrderError>>)> {
    match receiver.recv().await {
        Some(OrderRequest::PlaceOrder { draft, respond_to }) => Some((draft, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{CartClient, CheckoutOptions, OrderClient};
    use crate::domain::{Address, PaymentMethod, QuantityTier};
    use rust_decimal::Decimal;

    fn customer() -> Customer {
        Customer {
            id: "customer_1".to_string(),
            name: "Alice Souza".to_string(),
            phone: "(51) 99999-0000".to_string(),
            email: "alice@example.com".to_string(),
            address: Address {
                street: "Rua Ida Berlet".to_string(),
                number: "1738".to_string(),
                complement: None,
                city: "Quinze de Novembro".to_string(),
            },
            password: "Segredo#1".to_string(),
            saved_addresses: Vec::new(),
        }
    }

    fn line() -> CartLine {
        CartLine {
            line_id: 1,
            item_id: 2,
            item_name: "Coxinha frango".to_string(),
            unit_price: Decimal::new(11000, 2),
            tier: QuantityTier::Cento,
            unit_count: 1,
            quantity: 1,
            total_price: Decimal::new(11000, 2),
        }
    }

    fn pickup() -> CheckoutOptions {
        CheckoutOptions {
            is_delivery: false,
            payment_method: PaymentMethod::Cash,
            selected_address: None,
        }
    }

    fn wire_order_client() -> (
        OrderClient,
        mpsc::Receiver<OrderRequest>,
        mpsc::Receiver<AuthRequest>,
        mpsc::Receiver<CartRequest>,
        mpsc::Receiver<AdminRequest>,
    ) {
        let (order_sender, order_rx) = mock_order_sender(10);
        let (auth_client, auth_rx) = mock_auth_client(10);
        let (admin_client, admin_rx) = mock_admin_client(10);
        let (cart_sender, cart_rx) = mock_cart_sender(10);
        let (catalog_client, _catalog_rx) = mock_catalog_client(10);
        let cart_client = CartClient::new(cart_sender, catalog_client, admin_client.clone());
        let order_client = OrderClient::new(order_sender, auth_client, cart_client, admin_client);
        (order_client, order_rx, auth_rx, cart_rx, admin_rx)
    }

    #[tokio::test]
    async fn checkout_requires_a_session() {
        let (order_client, _order_rx, mut auth_rx, _cart_rx, _admin_rx) = wire_order_client();

        let checkout = tokio::spawn(async move { order_client.checkout(pickup()).await });

        let responder = expect_current_customer(&mut auth_rx)
            .await
            .expect("Expected CurrentCustomer request");
        responder.send(Ok(None)).unwrap();

        let result = checkout.await.unwrap();
        assert_eq!(result.unwrap_err(), OrderError::Unauthenticated);
    }

    #[tokio::test]
    async fn checkout_keeps_the_cart_when_the_order_fails() {
        let (order_client, mut order_rx, mut auth_rx, mut cart_rx, mut admin_rx) =
            wire_order_client();

        let checkout = tokio::spawn(async move { order_client.checkout(pickup()).await });

        let responder = expect_current_customer(&mut auth_rx).await.unwrap();
        responder.send(Ok(Some(customer()))).unwrap();

        let (customer_id, responder) = expect_get_lines(&mut cart_rx).await.unwrap();
        assert_eq!(customer_id, "customer_1");
        responder.send(Ok(vec![line()])).unwrap();

        let responder = expect_get_config(&mut admin_rx).await.unwrap();
        responder.send(Ok(AppConfig::default())).unwrap();

        let (draft, responder) = expect_place_order(&mut order_rx).await.unwrap();
        assert_eq!(draft.total, Decimal::new(11000, 2));
        responder
            .send(Err(OrderError::ValidationError("storage offline".to_string())))
            .unwrap();

        // The order service refused, so the cart must never be cleared.
        let result = checkout.await.unwrap();
        assert!(result.is_err());
        assert!(
            cart_rx.try_recv().is_err(),
            "cart was touched after a failed order"
        );
    }

    #[tokio::test]
    async fn checkout_clears_the_cart_after_the_order_is_stored() {
        let (order_client, mut order_rx, mut auth_rx, mut cart_rx, mut admin_rx) =
            wire_order_client();

        let checkout = tokio::spawn(async move { order_client.checkout(pickup()).await });

        let responder = expect_current_customer(&mut auth_rx).await.unwrap();
        responder.send(Ok(Some(customer()))).unwrap();

        let (_, responder) = expect_get_lines(&mut cart_rx).await.unwrap();
        responder.send(Ok(vec![line()])).unwrap();

        let responder = expect_get_config(&mut admin_rx).await.unwrap();
        responder.send(Ok(AppConfig::default())).unwrap();

        let (draft, responder) = expect_place_order(&mut order_rx).await.unwrap();
        // Pickup orders never pay the delivery fee.
        assert_eq!(draft.delivery_fee, Decimal::ZERO);
        let order = Order::from_draft("order_1".to_string(), "PED-0001".to_string(), draft);
        responder.send(Ok(order)).unwrap();

        let (customer_id, responder) = expect_clear(&mut cart_rx).await.unwrap();
        assert_eq!(customer_id, "customer_1");
        responder.send(Ok(())).unwrap();

        let placed = checkout.await.unwrap().unwrap();
        assert_eq!(placed.order_number, "PED-0001");
    }

    #[tokio::test]
    async fn checkout_refuses_an_empty_cart() {
        let (order_client, _order_rx, mut auth_rx, mut cart_rx, _admin_rx) = wire_order_client();

        let checkout = tokio::spawn(async move { order_client.checkout(pickup()).await });

        let responder = expect_current_customer(&mut auth_rx).await.unwrap();
        responder.send(Ok(Some(customer()))).unwrap();

        let (_, responder) = expect_get_lines(&mut cart_rx).await.unwrap();
        responder.send(Ok(Vec::new())).unwrap();

        let result = checkout.await.unwrap();
        assert_eq!(result.unwrap_err(), OrderError::EmptyCart);
    }
}
