// src/lib.rs

pub mod analysis;
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod history;
pub mod models;
pub mod quiz;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

pub use routes::create_router;
