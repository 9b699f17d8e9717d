//! Customers Data

/// New Address Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    /// Free-form label such as `home` or `work`
    pub label: String,
    pub street_address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,

    /// Make this the customer's default, clearing any previous default
    pub is_default: bool,
}
