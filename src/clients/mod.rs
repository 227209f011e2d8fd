//! Typed clients for the service actors.
//!
//! Simple clients are thin wrappers over a request channel with
//! macro-generated methods. The cart and order clients additionally
//! orchestrate across services (delivery fee lookup, checkout), which keeps
//! the services themselves single-purpose.

mod admin_client;
mod auth_client;
mod cart_client;
mod catalog_client;
mod macros;
mod order_client;

pub(crate) use macros::{client_method, client_shutdown};

pub use admin_client::AdminClient;
pub use auth_client::AuthClient;
pub use cart_client::{CartClient, CartSender};
pub use catalog_client::CatalogClient;
pub use order_client::{CheckoutOptions, OrderClient, OrderSender};
