use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use super::send_error;
use crate::clients::AuthClient;
use crate::domain::{Address, Customer, CustomerRegistration};
use crate::error::AuthError;
use crate::messages::{AuthRequest, ServiceResponse};
use crate::storage::{self, KeyValueStore};

const CUSTOMERS_KEY: &str = "customers";

const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 15;

/// Auth actor: customer accounts and the customer session.
pub struct AuthService {
    receiver: mpsc::Receiver<AuthRequest>,
    customers: Vec<Customer>,
    session: Option<String>,
    next_customer_id: u64,
    store: Box<dyn KeyValueStore>,
}

impl AuthService {
    pub fn new(buffer_size: usize, store: Box<dyn KeyValueStore>) -> (Self, AuthClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let customers: Vec<Customer> =
            storage::load(store.as_ref(), CUSTOMERS_KEY).unwrap_or_default();
        let next_customer_id = customers.len() as u64 + 1;
        let service = Self {
            receiver,
            customers,
            session: None,
            next_customer_id,
            store,
        };
        (service, AuthClient::new(sender))
    }

    #[instrument(name = "auth_service", skip(self))]
    pub async fn run(mut self) {
        info!("AuthService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                AuthRequest::Register { registration, respond_to } => {
                    self.handle_register(registration, respond_to);
                }
                AuthRequest::Login { phone, password, respond_to } => {
                    self.handle_login(phone, password, respond_to);
                }
                AuthRequest::Logout { respond_to } => {
                    self.handle_logout(respond_to);
                }
                AuthRequest::CurrentCustomer { respond_to } => {
                    self.handle_current_customer(respond_to);
                }
                AuthRequest::AddAddress { customer_id, address, respond_to } => {
                    self.handle_add_address(customer_id, address, respond_to);
                }
                AuthRequest::Shutdown => {
                    info!("AuthService shutting down");
                    break;
                }
            }
        }

        info!("AuthService stopped");
    }

    fn persist(&mut self) {
        let customers = self.customers.clone();
        storage::persist(self.store.as_mut(), CUSTOMERS_KEY, &customers);
    }

    #[instrument(fields(name = %registration.name), skip(self, registration, respond_to))]
    fn handle_register(
        &mut self,
        registration: CustomerRegistration,
        respond_to: ServiceResponse<Customer, AuthError>,
    ) {
        debug!("Processing register request");

        if let Err(e) = validate_registration(&registration) {
            error!(error = %e, "Registration rejected");
            send_error!(respond_to, e);
        }

        let phone = registration.phone.trim().to_string();
        let email = registration.email.trim().to_lowercase();
        if self
            .customers
            .iter()
            .any(|c| c.phone == phone || c.email == email)
        {
            error!("Phone or email already registered");
            send_error!(respond_to, AuthError::AlreadyExists(phone));
        }

        let customer = Customer {
            id: format!("customer_{}", self.next_customer_id),
            name: registration.name.trim().to_string(),
            phone,
            email,
            address: registration.address,
            password: registration.password,
            saved_addresses: Vec::new(),
        };
        self.next_customer_id += 1;
        self.customers.push(customer.clone());
        // Registration logs the customer straight in.
        self.session = Some(customer.id.clone());
        self.persist();

        info!(customer = %customer.name, "Customer registered");
        let _ = respond_to.send(Ok(customer));
    }

    #[instrument(fields(%phone), skip(self, phone, password, respond_to))]
    fn handle_login(
        &mut self,
        phone: String,
        password: String,
        respond_to: ServiceResponse<Customer, AuthError>,
    ) {
        debug!("Processing login request");

        let found = self
            .customers
            .iter()
            .find(|c| c.phone == phone.trim() && c.password == password)
            .cloned();

        match found {
            Some(customer) => {
                self.session = Some(customer.id.clone());
                info!(customer = %customer.name, "Customer logged in");
                let _ = respond_to.send(Ok(customer));
            }
            None => {
                error!("Invalid customer credentials");
                let _ = respond_to.send(Err(AuthError::InvalidCredentials));
            }
        }
    }

    #[instrument(skip(self, respond_to))]
    fn handle_logout(&mut self, respond_to: ServiceResponse<(), AuthError>) {
        debug!("Processing logout request");
        self.session = None;
        let _ = respond_to.send(Ok(()));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_current_customer(&self, respond_to: ServiceResponse<Option<Customer>, AuthError>) {
        debug!("Processing current_customer request");
        let customer = self
            .session
            .as_ref()
            .and_then(|id| self.customers.iter().find(|c| &c.id == id))
            .cloned();
        let _ = respond_to.send(Ok(customer));
    }

    #[instrument(fields(%customer_id), skip(self, customer_id, address, respond_to))]
    fn handle_add_address(
        &mut self,
        customer_id: String,
        address: Address,
        respond_to: ServiceResponse<Customer, AuthError>,
    ) {
        debug!("Processing add_address request");

        if address.street.trim().is_empty()
            || address.number.trim().is_empty()
            || address.city.trim().is_empty()
        {
            error!("Incomplete address");
            send_error!(
                respond_to,
                AuthError::ValidationError(
                    "street, number and city are required".to_string()
                )
            );
        }

        let Some(customer) = self.customers.iter_mut().find(|c| c.id == customer_id) else {
            debug!("Customer not found");
            send_error!(respond_to, AuthError::NotFound(customer_id));
        };

        customer.saved_addresses.push(address);
        let updated = customer.clone();
        self.persist();

        info!(customer = %updated.name, "Address saved");
        let _ = respond_to.send(Ok(updated));
    }
}

fn validate_registration(registration: &CustomerRegistration) -> Result<(), AuthError> {
    let required = [
        ("name", registration.name.as_str()),
        ("phone", registration.phone.as_str()),
        ("email", registration.email.as_str()),
        ("street", registration.address.street.as_str()),
        ("number", registration.address.number.as_str()),
        ("city", registration.address.city.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AuthError::ValidationError(format!("{field} is required")));
        }
    }

    let email = registration.email.trim();
    let plausible_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !plausible_email {
        return Err(AuthError::ValidationError("invalid email address".to_string()));
    }

    validate_password(&registration.password)?;
    if registration.password != registration.confirm_password {
        return Err(AuthError::ValidationError("passwords do not match".to_string()));
    }

    Ok(())
}

/// 6 to 15 characters with at least one uppercase letter, one digit and one
/// special character.
fn validate_password(password: &str) -> Result<(), AuthError> {
    let length = password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
        return Err(AuthError::ValidationError(format!(
            "password must have {PASSWORD_MIN} to {PASSWORD_MAX} characters"
        )));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(AuthError::ValidationError(
            "password needs an uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::ValidationError(
            "password needs a digit".to_string(),
        ));
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Err(AuthError::ValidationError(
            "password needs a special character".to_string(),
        ));
    }
    Ok(())
}
