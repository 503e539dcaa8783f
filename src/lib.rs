pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod workflow;

pub use config::Config;
pub use db::{init_db, RepoError, Repository, Session};
pub use domain::{Address, AddressId, NewAddress, NewUser, User, UserId, UserWithAddresses};
pub use error::AppError;
pub use workflow::Report;
