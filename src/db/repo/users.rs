//! user_account queries.

use crate::domain::{NewUser, User, UserId, UserWithAddresses};
use sqlx::sqlite::SqliteConnection;
use tracing::debug;

use super::{addresses, exactly_one, user_from_row, RepoError};

const USER_COLUMNS: &str = "SELECT id AS user_id, name, fullname FROM user_account";

/// Insert one user and every address it owns.
pub(crate) async fn insert_user(
    conn: &mut SqliteConnection,
    new_user: &NewUser,
) -> Result<UserWithAddresses, RepoError> {
    let result = sqlx::query(
        r#"
        INSERT INTO user_account (name, fullname)
        VALUES (?, ?)
        "#,
    )
    .bind(new_user.name.as_str())
    .bind(new_user.fullname.as_deref())
    .execute(&mut *conn)
    .await?;

    let user = User {
        id: UserId::new(result.last_insert_rowid()),
        name: new_user.name.clone(),
        fullname: new_user.fullname.clone(),
    };
    debug!(user_id = %user.id, name = %user.name, "INSERT user_account");

    let mut owned = Vec::with_capacity(new_user.addresses.len());
    for address in &new_user.addresses {
        owned.push(addresses::insert_address(&mut *conn, user.id, &address.email_address).await?);
    }

    Ok(UserWithAddresses {
        user,
        addresses: owned,
    })
}

pub(crate) async fn get_user(
    conn: &mut SqliteConnection,
    id: UserId,
) -> Result<Option<User>, RepoError> {
    let row = sqlx::query(&format!("{USER_COLUMNS} WHERE id = ?"))
        .bind(id.as_i64())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.as_ref().map(user_from_row))
}

pub(crate) async fn find_user_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<User, RepoError> {
    debug!(name = %name, "SELECT user_account by name");
    // two rows are enough to tell "one" from "many"
    let rows = sqlx::query(&format!("{USER_COLUMNS} WHERE name = ? ORDER BY id LIMIT 2"))
        .bind(name)
        .fetch_all(&mut *conn)
        .await?;
    let users: Vec<User> = rows.iter().map(user_from_row).collect();
    exactly_one(users, &format!("user named '{}'", name))
}

pub(crate) async fn find_users_by_names(
    conn: &mut SqliteConnection,
    names: &[&str],
) -> Result<Vec<User>, RepoError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; names.len()].join(", ");
    let sql = format!("{USER_COLUMNS} WHERE name IN ({placeholders}) ORDER BY id");
    debug!(count = names.len(), "SELECT user_account by name set");

    let mut query = sqlx::query(&sql);
    for name in names {
        query = query.bind(*name);
    }
    let rows = query.fetch_all(&mut *conn).await?;
    Ok(rows.iter().map(user_from_row).collect())
}

pub(crate) async fn delete_user(
    conn: &mut SqliteConnection,
    id: UserId,
) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM user_account WHERE id = ?")
        .bind(id.as_i64())
        .execute(&mut *conn)
        .await?;
    debug!(user_id = %id, rows = result.rows_affected(), "DELETE user_account");
    Ok(result.rows_affected() > 0)
}

/// Delete every address, then every user.
pub(crate) async fn delete_all(conn: &mut SqliteConnection) -> Result<(), RepoError> {
    let addresses = sqlx::query("DELETE FROM address")
        .execute(&mut *conn)
        .await?;
    let users = sqlx::query("DELETE FROM user_account")
        .execute(&mut *conn)
        .await?;
    debug!(
        users = users.rows_affected(),
        addresses = addresses.rows_affected(),
        "DELETE all rows"
    );
    Ok(())
}
