//! HTTP API for Velocity.
//!
//! Exposes the search engine over axum with JWT bearer authentication.
//!
//! # Usage
//!
//! ```rust,ignore
//! use velocity_api::{serve, AppState, TokenVerifier};
//!
//! let state = AppState::new(engine, TokenVerifier::new(&secret));
//! serve("127.0.0.1:3001".parse()?, state).await?;
//! ```

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{AuthError, Claims, TokenVerifier};
pub use error::{ApiError, ErrorResponse};
pub use routes::{create_router, HealthResponse, SearchResponse};
pub use server::serve;
pub use state::AppState;
