pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
pub mod web;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, Command};

pub use adapters::{memory::MemoryStore, sqlite::SqliteStore};
pub use config::{roster::RosterFile, AppConfig};
pub use core::enrollment::EnrollmentService;
pub use utils::error::{EnrollError, Result};
