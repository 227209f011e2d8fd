pub mod admin;
pub mod cart;
pub mod customer;
pub mod menu;
pub mod order;

pub use admin::*;
pub use cart::*;
pub use customer::*;
pub use menu::*;
pub use order::*;
