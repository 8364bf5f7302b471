//! Podium - Presentation Content Assistant
//!
//! A content library server for live presentations: presenters issue
//! free-text commands and Podium resolves them to the most relevant video
//! in the library, either through a hosted language model or a keyword
//! fallback when no model credential is configured.
//!
//! # Overview
//!
//! Podium allows you to:
//! - Manage a library of keyword-tagged video content
//! - Resolve presenter commands to content via AI or keyword matching
//! - Keep an append-only history of every command and its outcome
//! - Ingest knowledge documents (text extraction, chunking, embeddings)
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `store` - Content store abstraction (SQLite, in-memory)
//! - `resolver` - Command-to-content resolution strategies
//! - `chunking` - Word-budget document chunking
//! - `embedding` - Embedding generation
//! - `storage` - Object storage abstraction for uploaded files
//! - `ingest` - Document ingestion pipeline
//! - `auth` - Bearer-token identity verification
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use podium::resolver::{create_strategy, CommandResolver};
//! use podium::config::Settings;
//! use podium::store::SqliteStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let store = Arc::new(SqliteStore::new(&settings.sqlite_path())?);
//!     let strategy = create_strategy(&settings);
//!     let resolver = CommandResolver::new(store, strategy);
//!
//!     let outcome = resolver.handle("show the expansion video", None).await?;
//!     println!("{}", outcome.ai_response);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod openai;
pub mod resolver;
pub mod storage;
pub mod store;

pub use error::{PodiumError, Result};
