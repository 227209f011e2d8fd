mod app_system;
mod clients;
mod domain;
mod error;
mod messages;
mod services;
mod storage;

#[cfg(test)]
mod mock_framework;

use tracing::{info, Instrument};

use crate::app_system::{setup_tracing, StoreSystem};
use crate::clients::CheckoutOptions;
use crate::domain::{
    Address, Category, CustomerRegistration, OrderStatus, PaymentMethod, QuantityTier,
    PRINCIPAL_ADMIN,
};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting salgaderia storefront");

    // Create the entire store system (starts all services)
    let system = StoreSystem::new();

    // A customer registers and fills a cart
    let span = tracing::info_span!("customer_session");
    let customer = async {
        info!("Registering demo customer");
        system
            .auth_client
            .register(CustomerRegistration {
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
                confirm_password: "Segredo#1".to_string(),
            })
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    info!(customer_id = %customer.id, "Customer registered");

    let span = tracing::info_span!("cart_building");
    async {
        let fritos = system
            .catalog_client
            .list_items(Some(Category::Salgados))
            .await
            .map_err(|e| e.to_string())?;
        info!(
            count = fritos.len(),
            category = Category::Salgados.label(),
            "Browsing menu category"
        );

        system
            .cart_client
            .add_item(customer.id.clone(), 2, QuantityTier::Cento, 1)
            .await
            .map_err(|e| e.to_string())?;
        system
            .cart_client
            .add_item(customer.id.clone(), 26, QuantityTier::Porcao, 1)
            .await
            .map_err(|e| e.to_string())?;

        let summary = system
            .cart_client
            .summary(customer.id.clone(), true)
            .await
            .map_err(|e| e.to_string())?;
        info!(
            subtotal = %summary.subtotal,
            delivery_fee = %summary.delivery_fee,
            total = %summary.total,
            "Cart ready"
        );
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    // Checkout flows through auth, cart, config and the order service
    let span = tracing::info_span!("checkout");
    let order = async {
        system
            .order_client
            .checkout(CheckoutOptions {
                is_delivery: true,
                payment_method: PaymentMethod::Pix,
                selected_address: None,
            })
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    info!(
        order_number = %order.order_number,
        total = %order.total,
        payment = order.payment_method.label(),
        "Order placed"
    );

    // The store confirms the order from the admin panel
    let span = tracing::info_span!("admin_panel");
    async {
        let admin = system
            .admin_client
            .login(PRINCIPAL_ADMIN.to_string(), "123".to_string())
            .await
            .map_err(|e| e.to_string())?;
        info!(admin = %admin.username, role = admin.role.label(), "Admin logged in");

        let config = system
            .admin_client
            .get_config()
            .await
            .map_err(|e| e.to_string())?;
        info!(delivery_fee = %config.delivery_fee, "Current settings");

        let confirmed = system
            .order_client
            .transition(admin, order.id.clone(), OrderStatus::Confirmed)
            .await
            .map_err(|e| e.to_string())?;
        info!(
            order_number = %confirmed.order_number,
            status = %confirmed.status.label(),
            "Order confirmed"
        );
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    system.shutdown().await?;

    info!("Demo flow finished");
    Ok(())
}
