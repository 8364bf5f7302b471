//! Doctor command - check configuration and local state.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::SqliteStore;
use console::style;

/// Run the doctor command.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Podium Doctor");
    println!();

    let mut problems = 0;

    // Model credential
    if crate::openai::has_api_key() {
        check_ok("OPENAI_API_KEY is set (model-backed resolution)");
    } else {
        check_warn(
            "OPENAI_API_KEY is not set",
            "Commands fall back to keyword matching; ingestion cannot embed",
        );
    }

    // Config file
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        check_ok(&format!("Config file: {}", config_path.display()));
    } else {
        check_warn(
            "No config file found",
            "Using defaults; run 'podium init' to create one",
        );
    }

    // Data directory
    let data_dir = settings.data_dir();
    if data_dir.exists() {
        check_ok(&format!("Data directory: {}", data_dir.display()));
    } else {
        check_warn(
            &format!("Data directory missing: {}", data_dir.display()),
            "Run 'podium init' to create it",
        );
    }

    // Document storage
    let storage_root = settings.storage_root();
    if storage_root.exists() {
        check_ok(&format!("Document storage: {}", storage_root.display()));
    } else {
        check_warn(
            &format!("Document storage missing: {}", storage_root.display()),
            "Created automatically on first use",
        );
    }

    // Database
    match settings.store.provider.as_str() {
        "memory" => check_ok("Store provider: memory (nothing persists)"),
        _ => match SqliteStore::new(&settings.sqlite_path()) {
            Ok(_) => check_ok(&format!("SQLite database: {}", settings.sqlite_path().display())),
            Err(e) => {
                problems += 1;
                check_fail(&format!("SQLite database unusable: {}", e));
            }
        },
    }

    // Ingestion auth tokens
    if settings.auth.tokens.is_empty() {
        check_warn(
            "No bearer tokens configured",
            "The document processing endpoint will reject every request",
        );
    } else {
        check_ok(&format!(
            "{} bearer token(s) configured",
            settings.auth.tokens.len()
        ));
    }

    println!();
    if problems == 0 {
        Output::success("Everything looks good.");
    } else {
        Output::error(&format!("{} problem(s) found.", problems));
    }

    Ok(())
}

fn check_ok(msg: &str) {
    println!("  {} {}", style("✓").green(), msg);
}

fn check_warn(msg: &str, hint: &str) {
    println!("  {} {}", style("!").yellow(), msg);
    println!("    {} {}", style("→").dim(), style(hint).dim());
}

fn check_fail(msg: &str) {
    println!("  {} {}", style("✗").red(), msg);
}
