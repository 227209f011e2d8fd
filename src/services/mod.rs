//! Service actors. Each service owns its state, receives typed requests over
//! an mpsc channel and answers on oneshot channels; see the matching clients
//! in [`crate::clients`].

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod order;

pub use admin::AdminService;
pub use auth::AuthService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use order::OrderService;

/// Macro for clean error response handling
macro_rules! send_error {
    ($respond_to:expr, $error:expr) => {{
        let _ = $respond_to.send(Err($error));
        return;
    }};
}

pub(crate) use send_error;
