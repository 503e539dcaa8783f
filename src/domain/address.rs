//! Child record: an email address owned by exactly one user.

use crate::domain::{AddressId, UserId};
use serde::{Deserialize, Serialize};

/// A persisted `address` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub email_address: String,
    /// Owning user; resolves to an existing `user_account` row.
    pub user_id: UserId,
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Address(id={}, email_address='{}')",
            self.id, self.email_address
        )
    }
}

/// An address not yet persisted. Its owner is assigned when the parent user is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub email_address: String,
}

impl NewAddress {
    pub fn new(email_address: impl Into<String>) -> Self {
        NewAddress {
            email_address: email_address.into(),
        }
    }
}
