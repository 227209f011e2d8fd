use std::collections::HashMap;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use super::send_error;
use crate::clients::CatalogClient;
use crate::domain::{
    builtin_menu, AdminUser, Category, ItemOverride, MenuItem, MenuItemCreate, MenuItemPatch,
    Section,
};
use crate::error::CatalogError;
use crate::messages::{CatalogRequest, ServiceResponse};
use crate::storage::{self, KeyValueStore};

const CUSTOM_ITEMS_KEY: &str = "custom_menu_items";
const OVERRIDES_KEY: &str = "product_overrides";

/// Catalog actor: built-in menu definitions, admin-created custom items and
/// field-level overrides for built-ins.
///
/// Built-in definitions are never mutated. Edits to them are stored as
/// [`ItemOverride`] records keyed by item id and merged over the base on
/// every read, so removing an override restores the original item.
pub struct CatalogService {
    receiver: mpsc::Receiver<CatalogRequest>,
    built_ins: Vec<MenuItem>,
    custom_items: Vec<MenuItem>,
    overrides: HashMap<u32, ItemOverride>,
    next_custom_id: u32,
    store: Box<dyn KeyValueStore>,
}

impl CatalogService {
    pub fn new(buffer_size: usize, store: Box<dyn KeyValueStore>) -> (Self, CatalogClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let built_ins = builtin_menu();
        let custom_items: Vec<MenuItem> = storage::load(store.as_ref(), CUSTOM_ITEMS_KEY)
            .unwrap_or_default();
        let overrides: HashMap<u32, ItemOverride> = storage::load(store.as_ref(), OVERRIDES_KEY)
            .unwrap_or_default();

        let max_builtin = built_ins.iter().map(|i| i.id).max().unwrap_or(0);
        let next_custom_id = custom_items
            .iter()
            .map(|i| i.id)
            .max()
            .unwrap_or(max_builtin)
            .max(max_builtin)
            + 1;

        let service = Self {
            receiver,
            built_ins,
            custom_items,
            overrides,
            next_custom_id,
            store,
        };
        let client = CatalogClient::new(sender);
        (service, client)
    }

    #[instrument(name = "catalog_service", skip(self))]
    pub async fn run(mut self) {
        info!("CatalogService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CatalogRequest::ResolveItem { id, respond_to } => {
                    self.handle_resolve_item(id, respond_to);
                }
                CatalogRequest::ListItems { category, respond_to } => {
                    self.handle_list_items(category, respond_to);
                }
                CatalogRequest::AddCustomItem { actor, payload, respond_to } => {
                    self.handle_add_custom_item(actor, payload, respond_to);
                }
                CatalogRequest::UpdateItem { actor, id, patch, respond_to } => {
                    self.handle_update_item(actor, id, patch, respond_to);
                }
                CatalogRequest::DeleteItem { actor, id, respond_to } => {
                    self.handle_delete_item(actor, id, respond_to);
                }
                CatalogRequest::Shutdown => {
                    info!("CatalogService shutting down");
                    break;
                }
            }
        }

        info!("CatalogService stopped");
    }

    /// The built-in item with its override (if any) merged on top.
    fn merged_builtin(&self, item: &MenuItem) -> MenuItem {
        let mut merged = item.clone();
        if let Some(over) = self.overrides.get(&item.id) {
            over.apply_to(&mut merged);
        }
        merged
    }

    fn find(&self, id: u32) -> Option<MenuItem> {
        if let Some(item) = self.built_ins.iter().find(|i| i.id == id) {
            return Some(self.merged_builtin(item));
        }
        self.custom_items.iter().find(|i| i.id == id).cloned()
    }

    #[instrument(fields(item_id = %id), skip(self, respond_to))]
    fn handle_resolve_item(&self, id: u32, respond_to: ServiceResponse<MenuItem, CatalogError>) {
        debug!("Processing resolve_item request");
        match self.find(id) {
            Some(item) => {
                debug!(item_name = %item.name, "Item resolved");
                let _ = respond_to.send(Ok(item));
            }
            None => {
                debug!("Item not found");
                let _ = respond_to.send(Err(CatalogError::NotFound(id)));
            }
        }
    }

    #[instrument(skip(self, respond_to))]
    fn handle_list_items(
        &self,
        category: Option<Category>,
        respond_to: ServiceResponse<Vec<MenuItem>, CatalogError>,
    ) {
        debug!("Processing list_items request");
        let items: Vec<MenuItem> = self
            .built_ins
            .iter()
            .map(|i| self.merged_builtin(i))
            .chain(self.custom_items.iter().cloned())
            .filter(|i| category.map_or(true, |c| i.category == c))
            .collect();
        info!(count = items.len(), "Listed catalog items");
        let _ = respond_to.send(Ok(items));
    }

    #[instrument(fields(admin = %actor.username, item_name = %payload.name), skip(self, actor, payload, respond_to))]
    fn handle_add_custom_item(
        &mut self,
        actor: AdminUser,
        payload: MenuItemCreate,
        respond_to: ServiceResponse<MenuItem, CatalogError>,
    ) {
        debug!("Processing add_custom_item request");

        if !actor.has_permission(Section::Produtos) {
            error!("Permission denied");
            send_error!(
                respond_to,
                CatalogError::PermissionDenied(format!(
                    "{} cannot manage products",
                    actor.username
                ))
            );
        }
        if payload.name.trim().is_empty() {
            send_error!(
                respond_to,
                CatalogError::ValidationError("item name must not be empty".to_string())
            );
        }
        if payload.unit_price < Decimal::ZERO {
            send_error!(
                respond_to,
                CatalogError::ValidationError("item price must not be negative".to_string())
            );
        }

        let item = MenuItem {
            id: self.next_custom_id,
            name: payload.name.trim().to_string(),
            unit_price: payload.unit_price,
            category: payload.category,
            is_portioned: payload.is_portioned,
            is_custom: true,
            description: payload.description,
        };
        self.next_custom_id += 1;
        self.custom_items.push(item.clone());
        storage::persist(self.store.as_mut(), CUSTOM_ITEMS_KEY, &self.custom_items);

        info!(item_id = item.id, "Custom item added");
        let _ = respond_to.send(Ok(item));
    }

    #[instrument(fields(admin = %actor.username, item_id = %id), skip(self, actor, patch, respond_to))]
    fn handle_update_item(
        &mut self,
        actor: AdminUser,
        id: u32,
        patch: MenuItemPatch,
        respond_to: ServiceResponse<MenuItem, CatalogError>,
    ) {
        debug!("Processing update_item request");

        if !actor.has_permission(Section::Produtos) {
            error!("Permission denied");
            send_error!(
                respond_to,
                CatalogError::PermissionDenied(format!(
                    "{} cannot manage products",
                    actor.username
                ))
            );
        }
        if patch.is_empty() {
            send_error!(
                respond_to,
                CatalogError::ValidationError("update contains no fields".to_string())
            );
        }
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                send_error!(
                    respond_to,
                    CatalogError::ValidationError("item name must not be empty".to_string())
                );
            }
        }
        if let Some(price) = patch.unit_price {
            if price < Decimal::ZERO {
                send_error!(
                    respond_to,
                    CatalogError::ValidationError("item price must not be negative".to_string())
                );
            }
        }

        if let Some(item) = self.custom_items.iter_mut().find(|i| i.id == id) {
            patch.apply_to(item);
            let updated = item.clone();
            storage::persist(self.store.as_mut(), CUSTOM_ITEMS_KEY, &self.custom_items);
            info!("Custom item updated");
            let _ = respond_to.send(Ok(updated));
            return;
        }

        if let Some(base) = self.built_ins.iter().find(|i| i.id == id).cloned() {
            // Built-ins are edited through the override layer, never in place.
            self.overrides.entry(id).or_default().merge(patch);
            storage::persist(self.store.as_mut(), OVERRIDES_KEY, &self.overrides);
            let merged = self.merged_builtin(&base);
            info!("Built-in item override stored");
            let _ = respond_to.send(Ok(merged));
            return;
        }

        debug!("Item not found");
        let _ = respond_to.send(Err(CatalogError::NotFound(id)));
    }

    #[instrument(fields(admin = %actor.username, item_id = %id), skip(self, actor, respond_to))]
    fn handle_delete_item(
        &mut self,
        actor: AdminUser,
        id: u32,
        respond_to: ServiceResponse<(), CatalogError>,
    ) {
        debug!("Processing delete_item request");

        if !actor.has_permission(Section::Produtos) {
            error!("Permission denied");
            send_error!(
                respond_to,
                CatalogError::PermissionDenied(format!(
                    "{} cannot manage products",
                    actor.username
                ))
            );
        }

        if self.built_ins.iter().any(|i| i.id == id) {
            error!("Attempted to delete a built-in item");
            send_error!(
                respond_to,
                CatalogError::PermissionDenied("built-in items cannot be deleted".to_string())
            );
        }

        let before = self.custom_items.len();
        self.custom_items.retain(|i| i.id != id);
        if self.custom_items.len() == before {
            debug!("Item not found");
            send_error!(respond_to, CatalogError::NotFound(id));
        }

        storage::persist(self.store.as_mut(), CUSTOM_ITEMS_KEY, &self.custom_items);
        info!("Custom item deleted");
        let _ = respond_to.send(Ok(()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AdminRole;
    use crate::storage::MemoryStore;

    fn gerente() -> AdminUser {
        AdminUser {
            id: "admin_1".into(),
            username: "sara".into(),
            password: "123".into(),
            role: AdminRole::Gerente,
        }
    }

    fn funcionario() -> AdminUser {
        AdminUser {
            id: "admin_2".into(),
            username: "joao".into(),
            password: "123".into(),
            role: AdminRole::Funcionario,
        }
    }

    fn spawn_catalog() -> CatalogClient {
        let (service, client) = CatalogService::new(16, Box::new(MemoryStore::new()));
        tokio::spawn(service.run());
        client
    }

    fn custom_payload(name: &str) -> MenuItemCreate {
        MenuItemCreate {
            name: name.into(),
            unit_price: Decimal::new(9000, 2),
            category: Category::Salgados,
            is_portioned: false,
            description: None,
        }
    }

    #[tokio::test]
    async fn resolves_builtin_items() {
        let catalog = spawn_catalog();
        let item = catalog.resolve_item(1).await.unwrap();
        assert_eq!(item.name, "Bolinha de queijo");
        assert!(!item.is_custom);

        let err = catalog.resolve_item(999).await.unwrap_err();
        assert_eq!(err, CatalogError::NotFound(999));
    }

    #[tokio::test]
    async fn custom_items_get_fresh_ids_and_resolve() {
        let catalog = spawn_catalog();
        let created = catalog
            .add_custom_item(gerente(), custom_payload("Quibe"))
            .await
            .unwrap();
        assert!(created.is_custom);
        assert!(created.id > 26);

        let resolved = catalog.resolve_item(created.id).await.unwrap();
        assert_eq!(resolved, created);
    }

    #[tokio::test]
    async fn builtin_updates_are_overrides_not_mutations() {
        let catalog = spawn_catalog();
        let patch = MenuItemPatch {
            unit_price: Some(Decimal::new(13000, 2)),
            ..MenuItemPatch::default()
        };
        let updated = catalog.update_item(gerente(), 1, patch).await.unwrap();
        assert_eq!(updated.unit_price, Decimal::new(13000, 2));
        assert_eq!(updated.name, "Bolinha de queijo");

        // Later reads keep seeing the override merged over the base.
        let resolved = catalog.resolve_item(1).await.unwrap();
        assert_eq!(resolved.unit_price, Decimal::new(13000, 2));
    }

    #[tokio::test]
    async fn overrides_accumulate_per_field() {
        let catalog = spawn_catalog();
        let price_patch = MenuItemPatch {
            unit_price: Some(Decimal::new(13000, 2)),
            ..MenuItemPatch::default()
        };
        catalog.update_item(gerente(), 2, price_patch).await.unwrap();
        let name_patch = MenuItemPatch {
            name: Some("Coxinha da casa".into()),
            ..MenuItemPatch::default()
        };
        let item = catalog.update_item(gerente(), 2, name_patch).await.unwrap();
        assert_eq!(item.name, "Coxinha da casa");
        assert_eq!(item.unit_price, Decimal::new(13000, 2));
    }

    #[tokio::test]
    async fn deleting_builtin_is_denied_and_custom_succeeds() {
        let catalog = spawn_catalog();
        let err = catalog.delete_item(gerente(), 1).await.unwrap_err();
        assert!(matches!(err, CatalogError::PermissionDenied(_)));

        let created = catalog
            .add_custom_item(gerente(), custom_payload("Quibe"))
            .await
            .unwrap();
        catalog.delete_item(gerente(), created.id).await.unwrap();
        let err = catalog.resolve_item(created.id).await.unwrap_err();
        assert_eq!(err, CatalogError::NotFound(created.id));
    }

    #[tokio::test]
    async fn funcionario_cannot_manage_products() {
        let catalog = spawn_catalog();
        let err = catalog
            .add_custom_item(funcionario(), custom_payload("Quibe"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::PermissionDenied(_)));

        let err = catalog
            .update_item(funcionario(), 1, MenuItemPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn rejects_invalid_custom_items() {
        let catalog = spawn_catalog();
        let mut payload = custom_payload("   ");
        let err = catalog
            .add_custom_item(gerente(), payload.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::ValidationError(_)));

        payload.name = "Quibe".into();
        payload.unit_price = Decimal::new(-100, 2);
        let err = catalog.add_custom_item(gerente(), payload).await.unwrap_err();
        assert!(matches!(err, CatalogError::ValidationError(_)));
    }

    #[tokio::test]
    async fn custom_items_and_overrides_survive_restart() {
        use crate::storage::SharedStore;

        let store = SharedStore::new();
        let custom_id = {
            let (service, client) = CatalogService::new(16, Box::new(store.clone()));
            let handle = tokio::spawn(service.run());
            let created = client
                .add_custom_item(gerente(), custom_payload("Quibe"))
                .await
                .unwrap();
            let patch = MenuItemPatch {
                unit_price: Some(Decimal::new(13000, 2)),
                ..MenuItemPatch::default()
            };
            client.update_item(gerente(), 3, patch).await.unwrap();
            client.shutdown().await.unwrap();
            handle.await.unwrap();
            created.id
        };

        let (service, client) = CatalogService::new(16, Box::new(store));
        tokio::spawn(service.run());
        let restored = client.resolve_item(custom_id).await.unwrap();
        assert_eq!(restored.name, "Quibe");
        let overridden = client.resolve_item(3).await.unwrap();
        assert_eq!(overridden.unit_price, Decimal::new(13000, 2));
    }
}
