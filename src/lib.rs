// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod capture;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod file;
pub mod markdown;
pub mod page;
pub mod progress;
pub mod runner;
pub mod session;
pub mod specs;
pub mod store;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};
pub use page::PageSnapshot;
pub use session::Session;
