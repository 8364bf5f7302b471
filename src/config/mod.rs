//! Configuration module for Podium.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, ResolverPrompts};
pub use settings::{
    AuthSettings, EmbeddingSettings, GeneralSettings, IngestionSettings, PromptSettings,
    ResolverSettings, ServerSettings, Settings, StorageSettings, StoreSettings,
};
