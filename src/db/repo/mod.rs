//! Repository layer for database operations.
//!
//! `Repository` runs each call on a pooled connection with autocommit.
//! `Session` groups calls into one transaction (see `db::session`).
//!
//! Queries are organized across submodules by record kind:
//! - `users.rs` - user_account lookups, inserts and deletes
//! - `addresses.rs` - address lookups, joins and mutations
//!
//! Both submodules expose connection-level functions so the same SQL serves
//! the repository and an open session.

pub(crate) mod addresses;
pub(crate) mod users;

use crate::db::session::Session;
use crate::domain::{Address, AddressId, NewUser, User, UserId, UserWithAddresses};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use thiserror::Error;
use tracing::info;

/// Errors returned by repository and session operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("No {0} found")]
    NotFound(String),
    #[error("Multiple {0} rows found where one was expected")]
    MultipleResults(String),
}

/// Reduce a result set to exactly one row.
pub(crate) fn exactly_one<T>(mut rows: Vec<T>, what: &str) -> Result<T, RepoError> {
    match rows.len() {
        0 => Err(RepoError::NotFound(what.to_string())),
        1 => Ok(rows.remove(0)),
        _ => Err(RepoError::MultipleResults(what.to_string())),
    }
}

pub(crate) fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: UserId::new(row.get::<i64, _>("user_id")),
        name: row.get::<String, _>("name"),
        fullname: row.get::<Option<String>, _>("fullname"),
    }
}

pub(crate) fn address_from_row(row: &SqliteRow) -> Address {
    Address {
        id: AddressId::new(row.get::<i64, _>("address_id")),
        email_address: row.get::<String, _>("email_address"),
        user_id: UserId::new(row.get::<i64, _>("user_id")),
    }
}

/// Repository for database operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Open a scoped unit of work.
    ///
    /// Writes made through the session become durable only on `Session::commit`;
    /// dropping the session rolls them back.
    pub async fn begin(&self) -> Result<Session, RepoError> {
        Ok(Session::new(self.pool.begin().await?))
    }

    // =========================================================================
    // User operations
    // =========================================================================

    /// Insert users and their addresses atomically.
    pub async fn insert_users(
        &self,
        users: &[NewUser],
    ) -> Result<Vec<UserWithAddresses>, RepoError> {
        let mut session = self.begin().await?;
        let inserted = session.add_all(users).await?;
        session.commit().await?;
        Ok(inserted)
    }

    /// Fetch a user by id.
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let mut conn = self.pool.acquire().await?;
        users::get_user(&mut conn, id).await
    }

    /// Fetch a user by id together with its addresses.
    pub async fn get_user_with_addresses(
        &self,
        id: UserId,
    ) -> Result<Option<UserWithAddresses>, RepoError> {
        let mut conn = self.pool.acquire().await?;
        let Some(user) = users::get_user(&mut conn, id).await? else {
            return Ok(None);
        };
        let addresses = addresses::addresses_for_user(&mut conn, id).await?;
        Ok(Some(UserWithAddresses { user, addresses }))
    }

    /// Return the single user whose name equals `name`.
    ///
    /// # Errors
    /// `RepoError::NotFound` when no user matches, `RepoError::MultipleResults`
    /// when several do.
    pub async fn find_user_by_name(&self, name: &str) -> Result<User, RepoError> {
        let mut conn = self.pool.acquire().await?;
        users::find_user_by_name(&mut conn, name).await
    }

    /// Return every user whose name is in `names`, ordered by id.
    pub async fn find_users_by_names(&self, names: &[&str]) -> Result<Vec<User>, RepoError> {
        let mut conn = self.pool.acquire().await?;
        users::find_users_by_names(&mut conn, names).await
    }

    /// Delete a user. Its addresses are removed by the cascading foreign key.
    ///
    /// Returns false if no such user existed.
    pub async fn delete_user(&self, id: UserId) -> Result<bool, RepoError> {
        let mut conn = self.pool.acquire().await?;
        users::delete_user(&mut conn, id).await
    }

    pub async fn count_users(&self) -> Result<i64, RepoError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM user_account")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n"))
    }

    // =========================================================================
    // Address operations
    // =========================================================================

    /// Addresses owned by a user, ordered by id.
    pub async fn addresses_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepoError> {
        let mut conn = self.pool.acquire().await?;
        addresses::addresses_for_user(&mut conn, user_id).await
    }

    /// Every (user, address) pair, one per address, ordered by address id.
    pub async fn user_address_pairs(&self) -> Result<Vec<(User, Address)>, RepoError> {
        let mut conn = self.pool.acquire().await?;
        addresses::user_address_pairs(&mut conn).await
    }

    /// The single address with the given email owned by the user named `user_name`.
    pub async fn find_address(
        &self,
        user_name: &str,
        email_address: &str,
    ) -> Result<Address, RepoError> {
        let mut conn = self.pool.acquire().await?;
        addresses::find_address(&mut conn, user_name, email_address).await
    }

    /// Attach a new address to an existing user.
    pub async fn add_address(
        &self,
        user_id: UserId,
        email_address: &str,
    ) -> Result<Address, RepoError> {
        let mut conn = self.pool.acquire().await?;
        addresses::insert_address(&mut conn, user_id, email_address).await
    }

    /// Change an address's email. Returns false if the address does not exist.
    pub async fn update_email_address(
        &self,
        id: AddressId,
        email_address: &str,
    ) -> Result<bool, RepoError> {
        let mut conn = self.pool.acquire().await?;
        addresses::update_email_address(&mut conn, id, email_address).await
    }

    /// Detach an address from its owner. Detached addresses are deleted.
    pub async fn remove_address(&self, id: AddressId) -> Result<bool, RepoError> {
        let mut conn = self.pool.acquire().await?;
        addresses::delete_address(&mut conn, id).await
    }

    pub async fn count_addresses(&self) -> Result<i64, RepoError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM address")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n"))
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Remove every address and user in one transaction.
    pub async fn clear_all(&self) -> Result<(), RepoError> {
        let mut session = self.begin().await?;
        session.clear_all().await?;
        session.commit().await?;
        info!("Cleared user_account and address tables");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn squarepants() -> Vec<NewUser> {
        vec![
            NewUser::new("spongebob")
                .with_fullname("Spongebob Squarepants")
                .with_address("spongebob@bikinibottom.net"),
            NewUser::new("sandy")
                .with_fullname("Sandy Cheeks")
                .with_address("sandy@bikinibottom.net")
                .with_address("sandy@squirrelpower.org"),
            NewUser::new("patrick").with_fullname("Patrick Star"),
        ]
    }

    #[test]
    fn test_exactly_one() {
        assert_eq!(exactly_one(vec![5], "n").unwrap(), 5);
        assert!(matches!(
            exactly_one(Vec::<i32>::new(), "n"),
            Err(RepoError::NotFound(_))
        ));
        assert!(matches!(
            exactly_one(vec![1, 2], "n"),
            Err(RepoError::MultipleResults(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_users_assigns_ids_and_owners() {
        let (repo, _temp) = setup_test_db().await;

        let inserted = repo.insert_users(&squarepants()).await.unwrap();
        assert_eq!(inserted.len(), 3);

        let sandy = &inserted[1];
        assert_eq!(sandy.user.name, "sandy");
        assert_eq!(sandy.addresses.len(), 2);
        assert!(sandy.addresses.iter().all(|a| a.user_id == sandy.user.id));
        assert!(inserted[2].addresses.is_empty());

        assert_eq!(repo.count_users().await.unwrap(), 3);
        assert_eq!(repo.count_addresses().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_find_user_by_name() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_users(&squarepants()).await.unwrap();

        let user = repo.find_user_by_name("sandy").await.unwrap();
        assert_eq!(user.name, "sandy");
        assert_eq!(user.fullname.as_deref(), Some("Sandy Cheeks"));
    }

    #[tokio::test]
    async fn test_find_user_by_name_missing() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_users(&squarepants()).await.unwrap();

        let err = repo.find_user_by_name("squidward").await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_user_by_name_ambiguous() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_users(&squarepants()).await.unwrap();
        repo.insert_users(&squarepants()).await.unwrap();

        let err = repo.find_user_by_name("patrick").await.unwrap_err();
        assert!(matches!(err, RepoError::MultipleResults(_)));
    }

    #[tokio::test]
    async fn test_find_users_by_names() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_users(&squarepants()).await.unwrap();

        let users = repo
            .find_users_by_names(&["spongebob", "sandy"])
            .await
            .unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["spongebob", "sandy"]);

        assert!(repo.find_users_by_names(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_address_pairs_one_per_address() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_users(&squarepants()).await.unwrap();

        let pairs = repo.user_address_pairs().await.unwrap();
        let flat: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(u, a)| (u.name.as_str(), a.email_address.as_str()))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("spongebob", "spongebob@bikinibottom.net"),
                ("sandy", "sandy@bikinibottom.net"),
                ("sandy", "sandy@squirrelpower.org"),
            ]
        );
        assert!(pairs.iter().all(|(u, a)| a.user_id == u.id));
    }

    #[tokio::test]
    async fn test_find_address_through_join() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_users(&squarepants()).await.unwrap();

        let address = repo
            .find_address("sandy", "sandy@bikinibottom.net")
            .await
            .unwrap();
        let sandy = repo.find_user_by_name("sandy").await.unwrap();
        assert_eq!(address.user_id, sandy.id);

        let err = repo
            .find_address("spongebob", "sandy@bikinibottom.net")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_update_and_remove_address() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_users(&squarepants()).await.unwrap();

        let patrick = repo.find_user_by_name("patrick").await.unwrap();
        let added = repo
            .add_address(patrick.id, "patrickstar@bikinibottom.net")
            .await
            .unwrap();
        assert_eq!(added.user_id, patrick.id);
        assert_eq!(repo.addresses_for_user(patrick.id).await.unwrap(), vec![added]);

        let sandy_address = repo
            .find_address("sandy", "sandy@bikinibottom.net")
            .await
            .unwrap();
        assert!(repo
            .update_email_address(sandy_address.id, "sandy_cheeks@bikinibottom.net")
            .await
            .unwrap());
        let renamed = repo
            .find_address("sandy", "sandy_cheeks@bikinibottom.net")
            .await
            .unwrap();
        assert_eq!(renamed.id, sandy_address.id);

        assert!(repo.remove_address(sandy_address.id).await.unwrap());
        assert!(!repo.remove_address(sandy_address.id).await.unwrap());
        let sandy = repo.find_user_by_name("sandy").await.unwrap();
        let remaining = repo.addresses_for_user(sandy.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].email_address, "sandy@squirrelpower.org");
    }

    #[tokio::test]
    async fn test_add_address_to_missing_user_fails() {
        let (repo, _temp) = setup_test_db().await;

        let result = repo.add_address(UserId::new(99), "ghost@nowhere.net").await;
        assert!(matches!(result, Err(RepoError::Database(_))));
    }

    #[tokio::test]
    async fn test_delete_user_cascades_to_addresses() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_users(&squarepants()).await.unwrap();

        let sandy = repo.find_user_by_name("sandy").await.unwrap();
        assert!(repo.delete_user(sandy.id).await.unwrap());

        assert_eq!(repo.get_user(sandy.id).await.unwrap(), None);
        assert!(repo.addresses_for_user(sandy.id).await.unwrap().is_empty());
        assert_eq!(repo.count_users().await.unwrap(), 2);
        assert_eq!(repo.count_addresses().await.unwrap(), 1);
        assert!(!repo.delete_user(sandy.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_user_with_addresses() {
        let (repo, _temp) = setup_test_db().await;
        let inserted = repo.insert_users(&squarepants()).await.unwrap();

        let sandy_id = inserted[1].user.id;
        let loaded = repo.get_user_with_addresses(sandy_id).await.unwrap();
        assert_eq!(loaded.as_ref(), Some(&inserted[1]));

        assert_eq!(
            repo.get_user_with_addresses(UserId::new(1000)).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_name_longer_than_column_rejected() {
        let (repo, _temp) = setup_test_db().await;

        let long_name = "x".repeat(crate::domain::MAX_NAME_LEN + 1);
        let result = repo.insert_users(&[NewUser::new(long_name)]).await;
        assert!(matches!(result, Err(RepoError::Database(_))));
        assert_eq!(repo.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_users(&squarepants()).await.unwrap();

        repo.clear_all().await.unwrap();
        assert_eq!(repo.count_users().await.unwrap(), 0);
        assert_eq!(repo.count_addresses().await.unwrap(), 0);
    }
}
