use tokio::sync::mpsc;

use super::{client_method, client_shutdown};
use crate::domain::{Address, Customer, CustomerRegistration};
use crate::error::AuthError;
use crate::messages::AuthRequest;

/// Client for the customer account/session actor.
#[derive(Clone)]
pub struct AuthClient {
    sender: mpsc::Sender<AuthRequest>,
}

impl AuthClient {
    pub fn new(sender: mpsc::Sender<AuthRequest>) -> Self {
        Self { sender }
    }
}

client_method!(AuthClient => fn register(registration: CustomerRegistration) -> Customer as AuthRequest::Register, Error = AuthError);
client_method!(AuthClient => fn login(phone: String, password: String) -> Customer as AuthRequest::Login, Error = AuthError);
client_method!(AuthClient => fn logout() -> () as AuthRequest::Logout, Error = AuthError);
client_method!(AuthClient => fn current_customer() -> Option<Customer> as AuthRequest::CurrentCustomer, Error = AuthError);
client_method!(AuthClient => fn add_address(customer_id: String, address: Address) -> Customer as AuthRequest::AddAddress, Error = AuthError);
client_shutdown!(AuthClient => AuthRequest);
