//! Command-line interface.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value as JsonValue;

use triage_core::{build_prompt, label_record, records_from_json, Record};
use triage_runtime::{load_reference_rules, validate_data, KeyResolver, ValidatorConfig};

use crate::report::{render_text, Report};

/// Triage warehouse exception records with an LLM.
#[derive(Parser, Debug)]
#[command(name = "triage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify every record in a JSON array file.
    Validate {
        /// JSON file holding an array of record objects
        records: PathBuf,

        /// Inject the reference rules document into every prompt
        #[arg(long)]
        rules: bool,

        /// Caller hint used to pick the API key (e.g. "react")
        #[arg(long, default_value = "")]
        source: String,

        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Secrets file (YAML or JSON object holding GROQ_API_KEY)
        #[arg(long)]
        secrets: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Print the prompt that would be sent for one record.
    Prompt {
        /// JSON file holding an array of record objects
        records: PathBuf,

        /// Index of the record in the file
        #[arg(short, long, default_value_t = 0)]
        index: usize,

        /// Include the reference rules document
        #[arg(long)]
        rules: bool,

        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Run the CLI.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Validate {
            records,
            rules,
            source,
            config,
            secrets,
            format,
        } => validate_command(
            &records,
            rules,
            &source,
            config.as_deref(),
            secrets.as_deref(),
            format,
        ),
        Commands::Prompt {
            records,
            index,
            rules,
            config,
        } => prompt_command(&records, index, rules, config.as_deref()),
    }
}

fn validate_command(
    records_path: &Path,
    use_rules: bool,
    source: &str,
    config_path: Option<&Path>,
    secrets_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let records = read_records(records_path)?;
    let config = load_config(config_path)?;

    let mut resolver = KeyResolver::new();
    if let Some(path) = secrets_path {
        resolver = resolver.with_secrets(load_secrets(path)?);
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let outcome = runtime.block_on(validate_data(
        &records,
        use_rules,
        source,
        &resolver,
        &config,
    ))?;

    let report = Report::new(outcome);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }

    Ok(())
}

fn prompt_command(
    records_path: &Path,
    index: usize,
    use_rules: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let records = read_records(records_path)?;
    let Some(record) = records.get(index) else {
        bail!(
            "Record index {} out of range: {} has {} records",
            index,
            records_path.display(),
            records.len()
        );
    };

    let config = load_config(config_path)?;
    let rules = use_rules.then(|| load_reference_rules(&config.rules_path));

    println!("{}", build_prompt(index, &label_record(record), rules.as_deref()));
    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file {}", path.display()))?;
    let records = records_from_json(&content)
        .with_context(|| format!("Invalid records file {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = records.len(), "Loaded records");
    Ok(records)
}

fn load_config(path: Option<&Path>) -> Result<ValidatorConfig> {
    match path {
        Some(path) => ValidatorConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ValidatorConfig::default()),
    }
}

/// Secrets files are YAML; JSON is accepted because it is valid YAML.
fn load_secrets(path: &Path) -> Result<JsonValue> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read secrets file {}", path.display()))?;
    let secrets: JsonValue = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse secrets file {}", path.display()))?;
    if !secrets.is_object() {
        bail!("Secrets file {} must contain a mapping", path.display());
    }
    Ok(secrets)
}
