//! Command-line interface for Velocity.
//!
//! Loads [`VelocityConfig`], builds the keyword and vector indexes from the
//! contractor corpus, and either serves the HTTP API or runs one search from
//! the terminal.
//!
//! # Modules
//!
//! - [`cli`]: clap argument definitions
//! - [`config`]: layered configuration (file, environment, defaults)
//! - [`config_handlers`]: `velocity config ...` subcommands
//! - [`app`]: [`VelocityCli`], engine construction and command dispatch

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;

pub use app::{IndexReport, VelocityCli};
pub use cli::{CliArgs, Command, ConfigAction, ConfigCommand, EmbeddingArgs};
pub use config::{AuthConfig, DataConfig, ServerConfig, VelocityConfig, JWT_SECRET_ENV};
