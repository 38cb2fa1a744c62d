// src/store/mod.rs

//! Append-only persistence over the SQLite pool.

pub mod question_log;
pub mod session;
pub mod user;

pub use question_log::QuestionLogStore;
pub use session::SessionStore;
pub use user::CredentialStore;
