use serde::{Deserialize, Serialize};

/// A delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub city: String,
}

/// A registered storefront customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: Address,
    pub password: String,
    /// Alternate delivery addresses saved by the customer.
    #[serde(default)]
    pub saved_addresses: Vec<Address>,
}

/// Registration payload. The confirmation field is checked against the
/// password and then discarded.
#[derive(Debug, Clone)]
pub struct CustomerRegistration {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: Address,
    pub password: String,
    pub confirm_password: String,
}

/// The customer fields frozen into an order at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: Address,
}

impl CustomerSnapshot {
    /// Snapshot with the delivery address resolved: the explicitly selected
    /// address when one was chosen, the profile address otherwise.
    pub fn from_customer(customer: &Customer, delivery_address: Option<Address>) -> Self {
        Self {
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
            address: delivery_address.unwrap_or_else(|| customer.address.clone()),
        }
    }
}
