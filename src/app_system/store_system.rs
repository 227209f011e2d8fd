use tracing::{error, info};

use crate::clients::{AdminClient, AuthClient, CartClient, CatalogClient, OrderClient};
use crate::services::{AdminService, AuthService, CartService, CatalogService, OrderService};
use crate::storage::SharedStore;

const CHANNEL_BUFFER: usize = 32;

/// The main application system that orchestrates all actors.
///
/// Responsible for starting the services, wiring the clients together, and
/// handling shutdown. All services persist through one shared store so a
/// rebuilt system picks up where the previous one left off.
pub struct StoreSystem {
    pub catalog_client: CatalogClient,
    pub cart_client: CartClient,
    pub order_client: OrderClient,
    pub admin_client: AdminClient,
    pub auth_client: AuthClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl StoreSystem {
    pub fn new() -> Self {
        Self::with_store(SharedStore::new())
    }

    pub fn with_store(store: SharedStore) -> Self {
        // Stateless-dependency services first, orchestrating clients after.
        let (catalog_service, catalog_client) =
            CatalogService::new(CHANNEL_BUFFER, Box::new(store.clone()));
        let catalog_handle = tokio::spawn(catalog_service.run());

        let (admin_service, admin_client) =
            AdminService::new(CHANNEL_BUFFER, Box::new(store.clone()));
        let admin_handle = tokio::spawn(admin_service.run());

        let (auth_service, auth_client) =
            AuthService::new(CHANNEL_BUFFER, Box::new(store.clone()));
        let auth_handle = tokio::spawn(auth_service.run());

        let (cart_service, cart_sender) =
            CartService::new(CHANNEL_BUFFER, Box::new(store.clone()));
        let cart_client =
            CartClient::new(cart_sender, catalog_client.clone(), admin_client.clone());
        let cart_handle = tokio::spawn(cart_service.run());

        let (order_service, order_sender) =
            OrderService::new(CHANNEL_BUFFER, Box::new(store));
        let order_client = OrderClient::new(
            order_sender,
            auth_client.clone(),
            cart_client.clone(),
            admin_client.clone(),
        );
        let order_handle = tokio::spawn(order_service.run());

        Self {
            catalog_client,
            cart_client,
            order_client,
            admin_client,
            auth_client,
            handles: vec![
                catalog_handle,
                admin_handle,
                auth_handle,
                cart_handle,
                order_handle,
            ],
        }
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        self.order_client.shutdown().await?;
        self.cart_client.shutdown().await?;
        self.catalog_client.shutdown().await?;
        self.auth_client.shutdown().await?;
        self.admin_client.shutdown().await?;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Service task failed: {:?}", e);
                return Err(format!("Service task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

impl Default for StoreSystem {
    fn default() -> Self {
        Self::new()
    }
}
