// src/models/mod.rs

pub mod analysis;
pub mod question;
pub mod question_log;
pub mod session;
pub mod user;
