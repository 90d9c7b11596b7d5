mod cli;
mod jboss_cli;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::{Value as Json, json};

use cli::{ApplyArgs, Cli, Command};
use dmr::{RetryPolicy, Session};
use jboss_cli::{CliConnector, CliOptions};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Command::Apply(args) => apply(&args),
        Command::Validate { file } => validate(&file),
    }
}

/// Load a configuration document, YAML or JSON by extension.
fn load_document(path: &Path) -> Result<Json> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let document = if is_json {
        serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON in {}", path.display()))?
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML in {}", path.display()))?
    };
    Ok(document)
}

fn apply(args: &ApplyArgs) -> Result<()> {
    let document = load_document(&args.file)?;

    let mut session = Session::with_retry(RetryPolicy {
        max_attempts: args.retry_attempts,
        ..RetryPolicy::default()
    });
    let mut connector = CliConnector::new(CliOptions {
        command: args.cli_command.clone(),
        controller: args.controller.clone(),
        user: args.user.clone(),
        password: args.password.clone(),
        timeout_ms: args.timeout,
    });
    session.connect(&mut connector)?;

    let outcome = reconcile::standard_dispatcher().dispatch(session.client()?, &document);
    session.disconnect()?;

    // Changes already applied are reported even when a later section
    // failed; there is no rollback.
    let tree = match outcome {
        Ok(tree) => tree,
        Err(failure) => {
            let envelope = json!({
                "changed": !failure.applied.is_empty(),
                "changes": failure.applied,
            });
            eprintln!("{}", serde_json::to_string_pretty(&envelope)?);
            return Err(failure.error.into());
        }
    };
    let envelope = json!({
        "changed": !tree.is_empty(),
        "changes": tree,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn validate(file: &Path) -> Result<()> {
    let document = load_document(file)?;
    let Some(sections) = document.as_object() else {
        bail!("configuration document must be a mapping");
    };
    let keys: Vec<&str> = sections.keys().map(String::as_str).collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({"valid": true, "sections": keys}))?
    );
    Ok(())
}
