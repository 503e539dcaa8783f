//! address queries, including the joins back to user_account.

use crate::domain::{Address, AddressId, User, UserId};
use sqlx::sqlite::SqliteConnection;
use tracing::debug;

use super::{address_from_row, exactly_one, user_from_row, RepoError};

const JOINED_COLUMNS: &str = r#"
    SELECT a.id AS address_id, a.email_address, a.user_id AS user_id, u.name, u.fullname
    FROM address a
    JOIN user_account u ON a.user_id = u.id
"#;

pub(crate) async fn insert_address(
    conn: &mut SqliteConnection,
    user_id: UserId,
    email_address: &str,
) -> Result<Address, RepoError> {
    let result = sqlx::query("INSERT INTO address (email_address, user_id) VALUES (?, ?)")
        .bind(email_address)
        .bind(user_id.as_i64())
        .execute(&mut *conn)
        .await?;

    let address = Address {
        id: AddressId::new(result.last_insert_rowid()),
        email_address: email_address.to_string(),
        user_id,
    };
    debug!(address_id = %address.id, user_id = %user_id, "INSERT address");
    Ok(address)
}

pub(crate) async fn addresses_for_user(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Vec<Address>, RepoError> {
    let rows = sqlx::query(
        r#"
        SELECT id AS address_id, email_address, user_id
        FROM address
        WHERE user_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(user_id.as_i64())
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.iter().map(address_from_row).collect())
}

pub(crate) async fn user_address_pairs(
    conn: &mut SqliteConnection,
) -> Result<Vec<(User, Address)>, RepoError> {
    debug!("SELECT address JOIN user_account");
    let rows = sqlx::query(&format!("{JOINED_COLUMNS} ORDER BY a.id ASC"))
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows
        .iter()
        .map(|row| (user_from_row(row), address_from_row(row)))
        .collect())
}

pub(crate) async fn find_address(
    conn: &mut SqliteConnection,
    user_name: &str,
    email_address: &str,
) -> Result<Address, RepoError> {
    let rows = sqlx::query(&format!(
        "{JOINED_COLUMNS} WHERE u.name = ? AND a.email_address = ? ORDER BY a.id LIMIT 2"
    ))
    .bind(user_name)
    .bind(email_address)
    .fetch_all(&mut *conn)
    .await?;
    let found: Vec<Address> = rows.iter().map(address_from_row).collect();
    exactly_one(
        found,
        &format!("address '{}' for user '{}'", email_address, user_name),
    )
}

pub(crate) async fn update_email_address(
    conn: &mut SqliteConnection,
    id: AddressId,
    email_address: &str,
) -> Result<bool, RepoError> {
    let result = sqlx::query("UPDATE address SET email_address = ? WHERE id = ?")
        .bind(email_address)
        .bind(id.as_i64())
        .execute(&mut *conn)
        .await?;
    debug!(address_id = %id, "UPDATE address");
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete_address(
    conn: &mut SqliteConnection,
    id: AddressId,
) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM address WHERE id = ?")
        .bind(id.as_i64())
        .execute(&mut *conn)
        .await?;
    debug!(address_id = %id, rows = result.rows_affected(), "DELETE address");
    Ok(result.rows_affected() > 0)
}
