//! Suppliers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use werkorder_core::SupplierId;

/// A parts supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(id: SupplierId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            contact: None,
            email: None,
            is_active: true,
            created_at,
        }
    }

    pub fn can_transact(&self) -> bool {
        self.is_active
    }
}
