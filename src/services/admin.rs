use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use super::send_error;
use crate::clients::AdminClient;
use crate::domain::{AdminCreate, AdminRole, AdminUser, AppConfig, Section, PRINCIPAL_ADMIN};
use crate::error::AdminError;
use crate::messages::{AdminRequest, ServiceResponse};
use crate::storage::{self, KeyValueStore};

const ADMINS_KEY: &str = "admin_users";
const CONFIG_KEY: &str = "app_config";

/// Admin actor: staff accounts, the admin session and store-wide settings.
///
/// The principal gerente account is seeded on first start and can never be
/// deleted, so the panel always has at least one full-access login.
pub struct AdminService {
    receiver: mpsc::Receiver<AdminRequest>,
    admins: Vec<AdminUser>,
    session: Option<String>,
    config: AppConfig,
    next_admin_id: u64,
    store: Box<dyn KeyValueStore>,
}

impl AdminService {
    pub fn new(buffer_size: usize, store: Box<dyn KeyValueStore>) -> (Self, AdminClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);

        let mut admins: Vec<AdminUser> =
            storage::load(store.as_ref(), ADMINS_KEY).unwrap_or_default();
        if admins.is_empty() {
            admins.push(AdminUser {
                id: "admin_1".to_string(),
                username: PRINCIPAL_ADMIN.to_string(),
                password: "123".to_string(),
                role: AdminRole::Gerente,
            });
        }
        let config: AppConfig = storage::load(store.as_ref(), CONFIG_KEY).unwrap_or_default();
        // Deleted accounts leave gaps, so the counter continues from the
        // highest id ever minted, not from the current count.
        let next_admin_id = admins
            .iter()
            .filter_map(|a| a.id.strip_prefix("admin_").and_then(|n| n.parse::<u64>().ok()))
            .max()
            .unwrap_or(0)
            + 1;

        let service = Self {
            receiver,
            admins,
            session: None,
            config,
            next_admin_id,
            store,
        };
        (service, AdminClient::new(sender))
    }

    #[instrument(name = "admin_service", skip(self))]
    pub async fn run(mut self) {
        info!("AdminService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                AdminRequest::Login { username, password, respond_to } => {
                    self.handle_login(username, password, respond_to);
                }
                AdminRequest::Logout { respond_to } => {
                    self.handle_logout(respond_to);
                }
                AdminRequest::CurrentAdmin { respond_to } => {
                    self.handle_current_admin(respond_to);
                }
                AdminRequest::ListAdmins { actor, respond_to } => {
                    self.handle_list_admins(actor, respond_to);
                }
                AdminRequest::AddAdmin { actor, payload, respond_to } => {
                    self.handle_add_admin(actor, payload, respond_to);
                }
                AdminRequest::DeleteAdmin { actor, id, respond_to } => {
                    self.handle_delete_admin(actor, id, respond_to);
                }
                AdminRequest::GetConfig { respond_to } => {
                    self.handle_get_config(respond_to);
                }
                AdminRequest::SetDeliveryFee { actor, fee, respond_to } => {
                    self.handle_set_delivery_fee(actor, fee, respond_to);
                }
                AdminRequest::Shutdown => {
                    info!("AdminService shutting down");
                    break;
                }
            }
        }

        info!("AdminService stopped");
    }

    fn persist_admins(&mut self) {
        let admins = self.admins.clone();
        storage::persist(self.store.as_mut(), ADMINS_KEY, &admins);
    }

    fn persist_config(&mut self) {
        let config = self.config.clone();
        storage::persist(self.store.as_mut(), CONFIG_KEY, &config);
    }

    #[instrument(fields(%username), skip(self, username, password, respond_to))]
    fn handle_login(
        &mut self,
        username: String,
        password: String,
        respond_to: ServiceResponse<AdminUser, AdminError>,
    ) {
        debug!("Processing admin login request");

        let found = self
            .admins
            .iter()
            .find(|admin| admin.username == username && admin.password == password)
            .cloned();

        match found {
            Some(admin) => {
                self.session = Some(admin.id.clone());
                info!(admin = %admin.username, role = %admin.role, "Admin logged in");
                let _ = respond_to.send(Ok(admin));
            }
            None => {
                error!("Invalid admin credentials");
                let _ = respond_to.send(Err(AdminError::InvalidCredentials));
            }
        }
    }

    #[instrument(skip(self, respond_to))]
    fn handle_logout(&mut self, respond_to: ServiceResponse<(), AdminError>) {
        debug!("Processing admin logout request");
        self.session = None;
        let _ = respond_to.send(Ok(()));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_current_admin(&self, respond_to: ServiceResponse<Option<AdminUser>, AdminError>) {
        debug!("Processing current_admin request");
        let admin = self
            .session
            .as_ref()
            .and_then(|id| self.admins.iter().find(|admin| &admin.id == id))
            .cloned();
        let _ = respond_to.send(Ok(admin));
    }

    #[instrument(fields(admin = %actor.username), skip(self, actor, respond_to))]
    fn handle_list_admins(
        &self,
        actor: AdminUser,
        respond_to: ServiceResponse<Vec<AdminUser>, AdminError>,
    ) {
        debug!("Processing list_admins request");

        if !actor.has_permission(Section::Administradores) {
            error!("Permission denied");
            send_error!(
                respond_to,
                AdminError::PermissionDenied(format!(
                    "{} cannot manage administrators",
                    actor.username
                ))
            );
        }

        let _ = respond_to.send(Ok(self.admins.clone()));
    }

    #[instrument(fields(admin = %actor.username, new_admin = %payload.username), skip(self, actor, payload, respond_to))]
    fn handle_add_admin(
        &mut self,
        actor: AdminUser,
        payload: AdminCreate,
        respond_to: ServiceResponse<AdminUser, AdminError>,
    ) {
        debug!("Processing add_admin request");

        if !actor.has_permission(Section::Administradores) {
            error!("Permission denied");
            send_error!(
                respond_to,
                AdminError::PermissionDenied(format!(
                    "{} cannot manage administrators",
                    actor.username
                ))
            );
        }

        let username = payload.username.trim().to_string();
        if username.is_empty() || payload.password.is_empty() {
            error!("Missing username or password");
            send_error!(
                respond_to,
                AdminError::ValidationError("username and password are required".to_string())
            );
        }
        if self.admins.iter().any(|admin| admin.username == username) {
            error!("Username already taken");
            send_error!(respond_to, AdminError::DuplicateUsername(username));
        }

        let admin = AdminUser {
            id: format!("admin_{}", self.next_admin_id),
            username,
            password: payload.password,
            role: payload.role,
        };
        self.next_admin_id += 1;
        self.admins.push(admin.clone());
        self.persist_admins();

        info!(new_admin = %admin.username, role = %admin.role, "Admin account created");
        let _ = respond_to.send(Ok(admin));
    }

    #[instrument(fields(admin = %actor.username, target = %id), skip(self, actor, id, respond_to))]
    fn handle_delete_admin(
        &mut self,
        actor: AdminUser,
        id: String,
        respond_to: ServiceResponse<(), AdminError>,
    ) {
        debug!("Processing delete_admin request");

        if !actor.has_permission(Section::Administradores) {
            error!("Permission denied");
            send_error!(
                respond_to,
                AdminError::PermissionDenied(format!(
                    "{} cannot manage administrators",
                    actor.username
                ))
            );
        }

        let Some(target) = self.admins.iter().find(|admin| admin.id == id) else {
            debug!("Admin not found");
            send_error!(respond_to, AdminError::NotFound(id));
        };

        if target.is_principal() {
            error!("Attempt to delete the principal admin");
            send_error!(
                respond_to,
                AdminError::PermissionDenied(
                    "the principal administrator cannot be deleted".to_string()
                )
            );
        }

        self.admins.retain(|admin| admin.id != id);
        self.persist_admins();

        info!("Admin account deleted");
        let _ = respond_to.send(Ok(()));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_get_config(&self, respond_to: ServiceResponse<AppConfig, AdminError>) {
        debug!("Processing get_config request");
        let _ = respond_to.send(Ok(self.config.clone()));
    }

    #[instrument(fields(admin = %actor.username, %fee), skip(self, actor, respond_to))]
    fn handle_set_delivery_fee(
        &mut self,
        actor: AdminUser,
        fee: Decimal,
        respond_to: ServiceResponse<AppConfig, AdminError>,
    ) {
        debug!("Processing set_delivery_fee request");

        if !actor.has_permission(Section::Configuracoes) {
            error!("Permission denied");
            send_error!(
                respond_to,
                AdminError::PermissionDenied(format!(
                    "{} cannot change settings",
                    actor.username
                ))
            );
        }
        if fee < Decimal::ZERO {
            error!("Negative delivery fee");
            send_error!(
                respond_to,
                AdminError::ValidationError("delivery fee cannot be negative".to_string())
            );
        }

        self.config.delivery_fee = fee;
        self.persist_config();

        info!("Delivery fee updated");
        let _ = respond_to.send(Ok(self.config.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SharedStore};

    fn spawn_admin() -> AdminClient {
        let (service, client) = AdminService::new(16, Box::new(MemoryStore::new()));
        tokio::spawn(service.run());
        client
    }

    async fn login_principal(client: &AdminClient) -> AdminUser {
        client
            .login(PRINCIPAL_ADMIN.to_string(), "123".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn principal_account_is_seeded() {
        let client = spawn_admin();
        let admin = login_principal(&client).await;
        assert_eq!(admin.username, PRINCIPAL_ADMIN);
        assert_eq!(admin.role, AdminRole::Gerente);

        let current = client.current_admin().await.unwrap();
        assert_eq!(current.map(|a| a.id), Some(admin.id));
    }

    #[tokio::test]
    async fn wrong_credentials_are_refused() {
        let client = spawn_admin();
        let err = client
            .login(PRINCIPAL_ADMIN.to_string(), "wrong".to_string())
            .await
            .unwrap_err();
        assert_eq!(err, AdminError::InvalidCredentials);
        assert!(client.current_admin().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_clears_the_session() {
        let client = spawn_admin();
        login_principal(&client).await;
        client.logout().await.unwrap();
        assert!(client.current_admin().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn gerente_manages_staff_accounts() {
        let client = spawn_admin();
        let sara = login_principal(&client).await;

        let joao = client
            .add_admin(
                sara.clone(),
                AdminCreate {
                    username: "joao".to_string(),
                    password: "abc".to_string(),
                    role: AdminRole::Funcionario,
                },
            )
            .await
            .unwrap();
        assert_eq!(joao.role, AdminRole::Funcionario);

        let listed = client.list_admins(sara.clone()).await.unwrap();
        assert_eq!(listed.len(), 2);

        client.delete_admin(sara.clone(), joao.id).await.unwrap();
        let listed = client.list_admins(sara).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let client = spawn_admin();
        let sara = login_principal(&client).await;

        let err = client
            .add_admin(
                sara,
                AdminCreate {
                    username: PRINCIPAL_ADMIN.to_string(),
                    password: "abc".to_string(),
                    role: AdminRole::Funcionario,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, AdminError::DuplicateUsername(PRINCIPAL_ADMIN.to_string()));
    }

    #[tokio::test]
    async fn principal_admin_cannot_be_deleted() {
        let client = spawn_admin();
        let sara = login_principal(&client).await;

        let err = client
            .delete_admin(sara.clone(), sara.id.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::PermissionDenied(_)));

        let listed = client.list_admins(sara).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn funcionario_cannot_touch_staff_or_settings() {
        let client = spawn_admin();
        let sara = login_principal(&client).await;
        let joao = client
            .add_admin(
                sara,
                AdminCreate {
                    username: "joao".to_string(),
                    password: "abc".to_string(),
                    role: AdminRole::Funcionario,
                },
            )
            .await
            .unwrap();

        let err = client.list_admins(joao.clone()).await.unwrap_err();
        assert!(matches!(err, AdminError::PermissionDenied(_)));

        let err = client
            .set_delivery_fee(joao, Decimal::new(500, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn delivery_fee_defaults_and_updates() {
        let client = spawn_admin();
        let config = client.get_config().await.unwrap();
        assert_eq!(config.delivery_fee, Decimal::new(1000, 2));

        let sara = login_principal(&client).await;
        let config = client
            .set_delivery_fee(sara.clone(), Decimal::new(1250, 2))
            .await
            .unwrap();
        assert_eq!(config.delivery_fee, Decimal::new(1250, 2));

        let err = client
            .set_delivery_fee(sara, Decimal::new(-100, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::ValidationError(_)));
    }

    #[tokio::test]
    async fn ids_stay_unique_after_a_deletion_and_restart() {
        let store = SharedStore::new();

        let (service, client) = AdminService::new(16, Box::new(store.clone()));
        tokio::spawn(service.run());
        let sara = login_principal(&client).await;
        let joao = client
            .add_admin(
                sara.clone(),
                AdminCreate {
                    username: "joao".to_string(),
                    password: "abc".to_string(),
                    role: AdminRole::Funcionario,
                },
            )
            .await
            .unwrap();
        let maria = client
            .add_admin(
                sara.clone(),
                AdminCreate {
                    username: "maria".to_string(),
                    password: "abc".to_string(),
                    role: AdminRole::Funcionario,
                },
            )
            .await
            .unwrap();
        client.delete_admin(sara, joao.id).await.unwrap();
        client.shutdown().await.unwrap();

        // After a restart the counter must continue past maria's id, not
        // re-mint it from the shrunken account count.
        let (service, client) = AdminService::new(16, Box::new(store));
        tokio::spawn(service.run());
        let sara = login_principal(&client).await;
        let pedro = client
            .add_admin(
                sara.clone(),
                AdminCreate {
                    username: "pedro".to_string(),
                    password: "abc".to_string(),
                    role: AdminRole::Funcionario,
                },
            )
            .await
            .unwrap();
        assert_ne!(pedro.id, maria.id);

        client.delete_admin(sara.clone(), pedro.id).await.unwrap();
        let listed = client.list_admins(sara).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|a| a.username == "maria"));
    }

    #[tokio::test]
    async fn accounts_and_config_survive_a_restart() {
        let store = SharedStore::new();

        let (service, client) = AdminService::new(16, Box::new(store.clone()));
        tokio::spawn(service.run());
        let sara = login_principal(&client).await;
        client
            .add_admin(
                sara.clone(),
                AdminCreate {
                    username: "joao".to_string(),
                    password: "abc".to_string(),
                    role: AdminRole::Funcionario,
                },
            )
            .await
            .unwrap();
        client
            .set_delivery_fee(sara.clone(), Decimal::new(1500, 2))
            .await
            .unwrap();
        client.shutdown().await.unwrap();

        let (service, client) = AdminService::new(16, Box::new(store));
        tokio::spawn(service.run());
        let sara = login_principal(&client).await;
        let listed = client.list_admins(sara).await.unwrap();
        assert_eq!(listed.len(), 2);
        let config = client.get_config().await.unwrap();
        assert_eq!(config.delivery_fee, Decimal::new(1500, 2));
    }
}
