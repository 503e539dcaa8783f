//! The seed-then-read walkthrough run by the binary.
//!
//! 1. Seed: one session inserts the sample users with their addresses and commits.
//! 2. Read: a second session runs the exact-match lookup and the user/address join.

use crate::config::Config;
use crate::db::{RepoError, Repository};
use crate::domain::{Address, NewUser, User, UserWithAddresses};
use crate::error::AppError;
use tracing::info;

/// The literal sample data inserted by the seed step.
pub fn sample_users() -> Vec<NewUser> {
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

/// Insert the sample users in one session.
///
/// Not idempotent: running it twice against the same store duplicates every row.
pub async fn seed(repo: &Repository) -> Result<Vec<UserWithAddresses>, RepoError> {
    seed_users(repo, &sample_users(), false).await
}

/// Insert `users` in one session, first clearing both tables when `reset` is set.
///
/// The clear and the inserts commit together, so a failed insert keeps the
/// previous rows.
pub async fn seed_users(
    repo: &Repository,
    users: &[NewUser],
    reset: bool,
) -> Result<Vec<UserWithAddresses>, RepoError> {
    let mut session = repo.begin().await?;
    if reset {
        session.clear_all().await?;
    }
    let inserted = session.add_all(users).await?;
    session.commit().await?;

    info!(
        reset,
        users = inserted.len(),
        addresses = inserted.iter().map(|u| u.addresses.len()).sum::<usize>(),
        "Seeded sample data"
    );
    Ok(inserted)
}

/// Results of the read step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub user: User,
    pub pairs: Vec<(User, Address)>,
}

impl Report {
    /// The two lines printed by the binary.
    pub fn lines(&self) -> [String; 2] {
        let pairs = self
            .pairs
            .iter()
            .map(|(user, address)| format!("({}, {})", user, address))
            .collect::<Vec<_>>()
            .join(", ");
        [self.user.to_string(), format!("[{}]", pairs)]
    }
}

/// Run the read step in its own session.
pub async fn read(repo: &Repository, lookup_name: &str) -> Result<Report, RepoError> {
    let mut session = repo.begin().await?;
    let user = session.find_user_by_name(lookup_name).await?;
    let pairs = session.user_address_pairs().await?;
    session.commit().await?;

    info!(user_id = %user.id, pairs = pairs.len(), "Read step complete");
    Ok(Report { user, pairs })
}

/// Seed, then read.
pub async fn run(repo: &Repository, config: &Config) -> Result<Report, AppError> {
    seed_users(repo, &sample_users(), config.reset_database).await?;
    Ok(read(repo, &config.lookup_name).await?)
}
