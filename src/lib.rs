#![warn(clippy::all)]

pub mod cli;
pub mod client;
pub mod config;
pub mod filter;
pub mod render;
pub mod types;
pub mod views;

pub use client::ApiClient;
pub use handle_errors::Error;
