use tokio::sync::mpsc;

use super::{client_method, client_shutdown};
use crate::domain::{AdminUser, Category, MenuItem, MenuItemCreate, MenuItemPatch};
use crate::error::CatalogError;
use crate::messages::CatalogRequest;

/// Client for the catalog actor.
#[derive(Clone)]
pub struct CatalogClient {
    sender: mpsc::Sender<CatalogRequest>,
}

impl CatalogClient {
    pub fn new(sender: mpsc::Sender<CatalogRequest>) -> Self {
        Self { sender }
    }
}

client_method!(CatalogClient => fn resolve_item(id: u32) -> MenuItem as CatalogRequest::ResolveItem, Error = CatalogError);
client_method!(CatalogClient => fn list_items(category: Option<Category>) -> Vec<MenuItem> as CatalogRequest::ListItems, Error = CatalogError);
client_method!(CatalogClient => fn add_custom_item(actor: AdminUser, payload: MenuItemCreate) -> MenuItem as CatalogRequest::AddCustomItem, Error = CatalogError);
client_method!(CatalogClient => fn update_item(actor: AdminUser, id: u32, patch: MenuItemPatch) -> MenuItem as CatalogRequest::UpdateItem, Error = CatalogError);
client_method!(CatalogClient => fn delete_item(actor: AdminUser, id: u32) -> () as CatalogRequest::DeleteItem, Error = CatalogError);
client_shutdown!(CatalogClient => CatalogRequest);
