// src/handlers/mod.rs

pub mod auth;
pub mod history;
pub mod insights;
pub mod quiz;
