//! The `velocity` application: wires config, corpus, backends, and commands.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing_subscriber::EnvFilter;
use velocity_api::{AppState, SearchResponse, TokenVerifier};
use velocity_core::{Corpus, Error, Result, SearchMethod};
use velocity_fts::TantivyKeywordBackend;
use velocity_search::{HybridOutcome, HybridQuery, SearchEngine, SemanticQuery};
use velocity_vector::SimpleVectorBackend;

use crate::cli::{CliArgs, Command, EmbeddingArgs};
use crate::config::VelocityConfig;
use crate::config_handlers;

// ============================================================================
// Index report
// ============================================================================

/// What was loaded and indexed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Records in the corpus file, including inactive ones.
    pub records: usize,
    /// Active records.
    pub active: usize,
    /// Documents in the keyword index.
    pub keyword_docs: u64,
    /// Entries in the vector index.
    pub vector_entries: usize,
    /// Embedding dimension, if any record is embedded.
    pub dimension: Option<usize>,
}

impl std::fmt::Display for IndexReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} contractors ({} active), keyword index {} docs, vector index {} entries",
            self.records, self.active, self.keyword_docs, self.vector_entries
        )?;
        match self.dimension {
            Some(d) => write!(f, ", dimension {d}"),
            None => write!(f, ", no embeddings"),
        }
    }
}

// ============================================================================
// VelocityCli
// ============================================================================

/// The command-line application.
pub struct VelocityCli {
    name: String,
    config: Arc<VelocityConfig>,
    version: String,
}

impl VelocityCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = VelocityConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    pub fn new(name: impl Into<String>, config: VelocityConfig) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn config(&self) -> &VelocityConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` if set, otherwise defaults based on verbosity flags.
    /// `log` records from the library crates are forwarded to the same
    /// subscriber.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // A subscriber may already be installed (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Load the corpus and build both indexes.
    pub fn build_engine(&self) -> Result<(SearchEngine, IndexReport)> {
        let corpus = Corpus::load(
            &self.config.data.contractors_path,
            self.config.expected_dimension(),
        )?;
        let keyword = TantivyKeywordBackend::build(&corpus, &self.config.fts)?;
        let vector = SimpleVectorBackend::build(&corpus);

        let report = IndexReport {
            records: corpus.len(),
            active: corpus.active().count(),
            keyword_docs: keyword.num_docs(),
            vector_entries: vector.len(),
            dimension: corpus.embedding_dimension(),
        };
        log::info!("indexes ready: {report}");

        let engine = SearchEngine::new(
            Arc::new(keyword),
            Arc::new(vector),
            Arc::new(corpus),
            self.config.search.clone(),
        )?;
        Ok((engine, report))
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(Command::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(Command::Health) => {
                let (_, report) = self.build_engine()?;
                println!("{}: healthy ({report})", self.name);
                Ok(())
            }
            Some(Command::Status) => {
                let (engine, _) = self.build_engine()?;
                print_json(&engine.status().await?)
            }
            Some(Command::Search {
                query,
                limit,
                embedding,
            }) => self.cmd_search(query, limit, &embedding).await,
            Some(Command::Semantic { limit, embedding }) => {
                self.cmd_semantic(limit, &embedding).await
            }
            Some(Command::Serve { host, port }) => self.cmd_serve(host, port).await,
            Some(Command::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {} - use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Command handlers
    // ------------------------------------------------------------------------

    async fn cmd_search(
        &self,
        query: String,
        limit: Option<usize>,
        embedding: &EmbeddingArgs,
    ) -> Result<()> {
        let request = HybridQuery {
            query: Some(query),
            limit,
            embedding: read_embedding(embedding)?,
        };
        let (engine, _) = self.build_engine()?;
        let outcome = engine.hybrid(&request).await?;
        let method = outcome.method();
        match outcome {
            HybridOutcome::Fused(results) => print_json(&SearchResponse { results, method }),
            HybridOutcome::KeywordOnly(results) => {
                print_json(&SearchResponse { results, method })
            }
        }
    }

    async fn cmd_semantic(&self, limit: Option<usize>, embedding: &EmbeddingArgs) -> Result<()> {
        let embedding = read_embedding(embedding)?.ok_or_else(|| {
            Error::invalid_input("an embedding is required (--embedding or --embedding-file)")
        })?;
        let request = SemanticQuery {
            embedding: Some(embedding),
            limit,
        };
        let (engine, _) = self.build_engine()?;
        let results = engine.semantic(&request).await?;
        print_json(&SearchResponse {
            results,
            method: SearchMethod::Semantic,
        })
    }

    async fn cmd_serve(&self, host: Option<String>, port: Option<u16>) -> Result<()> {
        let secret = self.config.jwt_secret()?;
        let host = host.unwrap_or_else(|| self.config.server.host.clone());
        let port = port.unwrap_or(self.config.server.port);
        let addr = resolve_addr(&host, port).await?;

        let (engine, _) = self.build_engine()?;
        let state = AppState::new(engine, TokenVerifier::new(&secret));
        velocity_api::serve(addr, state).await
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read a query embedding from the inline flag or a file.
fn read_embedding(args: &EmbeddingArgs) -> Result<Option<Vec<f32>>> {
    let (json, source) = match (&args.embedding, &args.embedding_file) {
        (Some(inline), _) => (inline.clone(), "--embedding".to_string()),
        (None, Some(path)) => (read_file(path)?, path.display().to_string()),
        (None, None) => return Ok(None),
    };
    serde_json::from_str::<Vec<f32>>(&json)
        .map(Some)
        .map_err(|e| {
            Error::invalid_input(format!("{source}: expected a JSON array of numbers: {e}"))
        })
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))
}

async fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| Error::config(format!("cannot resolve {host}:{port}: {e}")))?
        .next()
        .ok_or_else(|| Error::config(format!("{host}:{port} resolved to no addresses")))
}

// ============================================================================
// Tests
// ============================================================================
