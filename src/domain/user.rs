//! Parent record: a user account owning zero or more addresses.

use crate::domain::{Address, NewAddress, UserId};
use serde::{Deserialize, Serialize};

/// Maximum length of `User::name`, matching the `VARCHAR(30)` column.
pub const MAX_NAME_LEN: usize = 30;

/// A persisted `user_account` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Short display name used for lookups.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User(id={}, name='{}', fullname=", self.id, self.name)?;
        match &self.fullname {
            Some(fullname) => write!(f, "'{}')", fullname),
            None => write!(f, "None)"),
        }
    }
}

/// A user that exists only in memory until its session commits.
///
/// Addresses are owned by the user and persisted alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub fullname: Option<String>,
    #[serde(default)]
    pub addresses: Vec<NewAddress>,
}

impl NewUser {
    /// Create a user with a name and no fullname or addresses.
    pub fn new(name: impl Into<String>) -> Self {
        NewUser {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the fullname.
    pub fn with_fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = Some(fullname.into());
        self
    }

    /// Append an owned address.
    pub fn with_address(mut self, email_address: impl Into<String>) -> Self {
        self.addresses.push(NewAddress::new(email_address));
        self
    }
}

/// A persisted user together with its resolved address collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWithAddresses {
    #[serde(flatten)]
    pub user: User,
    pub addresses: Vec<Address>,
}
