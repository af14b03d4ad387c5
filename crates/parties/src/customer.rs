//! Customers and their price ladders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use werkorder_core::CustomerId;
use werkorder_pricing::{PriceRule, PriceType};

/// Contact and address information for a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub contact: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub zipcode: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// A named contact person at a customer, used for quotation/order mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    pub is_primary: bool,
}

/// A customer of the workshop.
///
/// Exclusively owns its price-rule ladder and named contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub contact: ContactInfo,
    /// Default tier when no price rule is satisfied.
    pub default_price_type: Option<PriceType>,
    pub price_rules: Vec<PriceRule>,
    pub contacts: Vec<CustomerContact>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            contact: ContactInfo::default(),
            default_price_type: None,
            price_rules: Vec::new(),
            contacts: Vec::new(),
            is_active: true,
            created_at,
        }
    }

    /// Inactive customers cannot be attached to new orders.
    pub fn can_transact(&self) -> bool {
        self.is_active
    }

    /// The primary mail contact, falling back to the first listed.
    pub fn primary_contact(&self) -> Option<&CustomerContact> {
        self.contacts
            .iter()
            .find(|c| c.is_primary)
            .or_else(|| self.contacts.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_customer() -> Customer {
        Customer::new(CustomerId::new(), "Jansen BV", Utc::now())
    }

    #[test]
    fn new_customers_are_active_with_an_empty_ladder() {
        let customer = test_customer();
        assert!(customer.can_transact());
        assert!(customer.price_rules.is_empty());
        assert!(customer.default_price_type.is_none());
    }

    #[test]
    fn primary_contact_prefers_the_flagged_entry() {
        let mut customer = test_customer();
        customer.contacts = vec![
            CustomerContact {
                name: "Balie".to_string(),
                email: "balie@jansen.nl".to_string(),
                is_primary: false,
            },
            CustomerContact {
                name: "Inkoop".to_string(),
                email: "inkoop@jansen.nl".to_string(),
                is_primary: true,
            },
        ];
        assert_eq!(customer.primary_contact().unwrap().name, "Inkoop");

        customer.contacts[1].is_primary = false;
        assert_eq!(customer.primary_contact().unwrap().name, "Balie");
    }

    #[test]
    fn ladder_is_plain_owned_data() {
        let mut customer = test_customer();
        customer.price_rules.push(PriceRule {
            min_amount: dec!(1000),
            price_type: PriceType::Wvk,
        });
        assert_eq!(customer.price_rules.len(), 1);
    }
}
