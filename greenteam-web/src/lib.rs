//! Web form, CLI support and configuration for the Green Team assistant.
//!
//! The library half of the `greenteam` binary: configuration loading, the
//! axum router serving the form and the HTML renderer. The agents themselves
//! live in the `greenteam` crate.

pub mod config;
pub mod error;
pub mod form;
pub mod markdown;
pub mod page;
pub mod server;

pub use error::{AppError, AppResult};
pub use server::{AppState, create_router, serve};
