use rust_decimal::Decimal;
use tokio::sync::mpsc;

use super::{client_method, client_shutdown};
use crate::domain::{AdminCreate, AdminUser, AppConfig};
use crate::error::AdminError;
use crate::messages::AdminRequest;

/// Client for the admin actor: admin accounts, the admin session and the
/// application configuration.
#[derive(Clone)]
pub struct AdminClient {
    sender: mpsc::Sender<AdminRequest>,
}

impl AdminClient {
    pub fn new(sender: mpsc::Sender<AdminRequest>) -> Self {
        Self { sender }
    }
}

client_method!(AdminClient => fn login(username: String, password: String) -> AdminUser as AdminRequest::Login, Error = AdminError);
client_method!(AdminClient => fn logout() -> () as AdminRequest::Logout, Error = AdminError);
client_method!(AdminClient => fn current_admin() -> Option<AdminUser> as AdminRequest::CurrentAdmin, Error = AdminError);
client_method!(AdminClient => fn list_admins(actor: AdminUser) -> Vec<AdminUser> as AdminRequest::ListAdmins, Error = AdminError);
client_method!(AdminClient => fn add_admin(actor: AdminUser, payload: AdminCreate) -> AdminUser as AdminRequest::AddAdmin, Error = AdminError);
client_method!(AdminClient => fn delete_admin(actor: AdminUser, id: String) -> () as AdminRequest::DeleteAdmin, Error = AdminError);
client_method!(AdminClient => fn get_config() -> AppConfig as AdminRequest::GetConfig, Error = AdminError);
client_method!(AdminClient => fn set_delivery_fee(actor: AdminUser, fee: Decimal) -> AppConfig as AdminRequest::SetDeliveryFee, Error = AdminError);
client_shutdown!(AdminClient => AdminRequest);
