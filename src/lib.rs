//! Data-access layer for the Cinelog movie platform.
//!
//! Three MongoDB-backed repositories (users, sessions, comments) behind a
//! shared connection manager. Controllers, request validation and token
//! issuance live upstream; this crate only talks to the store.

pub mod database;
pub mod models;
pub mod repositories;
pub mod utils;

pub use database::MongoDB;
pub use models::{Comment, Critic, Session, User};
pub use repositories::{CommentRepository, SessionRepository, UserRepository};
pub use utils::error::RepoError;
