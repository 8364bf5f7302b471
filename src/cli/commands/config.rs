//! Config command - show configuration.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use crate::error::PodiumError;

/// Run a config action.
pub fn run_config(action: &ConfigAction, settings: Settings) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let rendered = toml::to_string_pretty(&settings)
                .map_err(|e| PodiumError::Config(e.to_string()))?;
            Output::header("Current Configuration");
            println!();
            println!("{}", rendered);
        }

        ConfigAction::Path => {
            println!("{}", Settings::default_config_path().display());
        }
    }

    Ok(())
}
