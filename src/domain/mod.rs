//! Domain types for the account book.
//!
//! This module provides:
//! - Identity newtypes: UserId, AddressId
//! - Persisted records: User (parent) and Address (child)
//! - In-memory records awaiting a session commit: NewUser, NewAddress

pub mod address;
pub mod primitives;
pub mod user;

pub use address::{Address, NewAddress};
pub use primitives::{AddressId, UserId};
pub use user::{NewUser, User, UserWithAddresses, MAX_NAME_LEN};
