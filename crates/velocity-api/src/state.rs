//! Shared application state.

use std::sync::Arc;

use velocity_search::SearchEngine;

use crate::auth::TokenVerifier;

/// State shared by every handler.
///
/// Cloning is cheap; the engine and verifier are behind `Arc`s.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(engine: SearchEngine, verifier: TokenVerifier) -> Self {
        Self {
            engine: Arc::new(engine),
            verifier: Arc::new(verifier),
        }
    }
}
