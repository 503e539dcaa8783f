//! Scoped unit of work over a single SQLite transaction.

use crate::db::repo::{addresses, users, RepoError};
use crate::domain::{Address, AddressId, NewUser, User, UserId, UserWithAddresses};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info};

/// A transaction-backed session.
///
/// Writes are visible inside the session immediately and become durable only
/// when `commit` is called. Dropping a session without committing rolls the
/// transaction back and returns its connection to the pool.
pub struct Session {
    tx: Transaction<'static, Sqlite>,
}

impl Session {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        debug!("BEGIN");
        Session { tx }
    }

    /// Persist users together with their nested addresses.
    ///
    /// Returns the persisted records in input order with their assigned ids.
    pub async fn add_all(
        &mut self,
        new_users: &[NewUser],
    ) -> Result<Vec<UserWithAddresses>, RepoError> {
        let mut persisted = Vec::with_capacity(new_users.len());
        for new_user in new_users {
            persisted.push(users::insert_user(&mut self.tx, new_user).await?);
        }
        Ok(persisted)
    }

    /// Make every write in this session durable.
    pub async fn commit(self) -> Result<(), RepoError> {
        self.tx.commit().await?;
        info!("Session committed");
        Ok(())
    }

    /// Discard every write in this session.
    pub async fn rollback(self) -> Result<(), RepoError> {
        self.tx.rollback().await?;
        info!("Session rolled back");
        Ok(())
    }

    /// Attach a new address to an existing user.
    pub async fn add_address(
        &mut self,
        user_id: UserId,
        email_address: &str,
    ) -> Result<Address, RepoError> {
        addresses::insert_address(&mut self.tx, user_id, email_address).await
    }

    /// Change an address's email. Returns false if the address does not exist.
    pub async fn update_email_address(
        &mut self,
        id: AddressId,
        email_address: &str,
    ) -> Result<bool, RepoError> {
        addresses::update_email_address(&mut self.tx, id, email_address).await
    }

    /// Detach an address from its owner, deleting it.
    pub async fn remove_address(&mut self, id: AddressId) -> Result<bool, RepoError> {
        addresses::delete_address(&mut self.tx, id).await
    }

    /// Delete a user together with its addresses.
    pub async fn delete_user(&mut self, id: UserId) -> Result<bool, RepoError> {
        users::delete_user(&mut self.tx, id).await
    }

    /// Delete every address and user.
    pub async fn clear_all(&mut self) -> Result<(), RepoError> {
        users::delete_all(&mut self.tx).await
    }

    pub async fn get_user(&mut self, id: UserId) -> Result<Option<User>, RepoError> {
        users::get_user(&mut self.tx, id).await
    }

    /// See `Repository::find_user_by_name`.
    pub async fn find_user_by_name(&mut self, name: &str) -> Result<User, RepoError> {
        users::find_user_by_name(&mut self.tx, name).await
    }

    pub async fn find_users_by_names(&mut self, names: &[&str]) -> Result<Vec<User>, RepoError> {
        users::find_users_by_names(&mut self.tx, names).await
    }

    pub async fn addresses_for_user(&mut self, user_id: UserId) -> Result<Vec<Address>, RepoError> {
        addresses::addresses_for_user(&mut self.tx, user_id).await
    }

    /// See `Repository::user_address_pairs`.
    pub async fn user_address_pairs(&mut self) -> Result<Vec<(User, Address)>, RepoError> {
        addresses::user_address_pairs(&mut self.tx).await
    }

    pub async fn find_address(
        &mut self,
        user_name: &str,
        email_address: &str,
    ) -> Result<Address, RepoError> {
        addresses::find_address(&mut self.tx, user_name, email_address).await
    }
}
