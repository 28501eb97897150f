//! # Validate Subcommand
//!
//! Validates one data file against one schema document.
//!
//! Exit codes: 0 when the data is valid (the normalized data is printed),
//! 1 when it is invalid (the failures are printed), 2 when the schema does
//! not compile or a file cannot be read.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use sift_core::{reporter_factory, ApiReporter, JsonApiReporter, ReporterFactory, VanillaReporter};
use sift_engine::{ValidateOptions, Validator};
use sift_schema::SchemaDocument;

use crate::input;

/// Arguments for the `sift validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema document (YAML or JSON).
    #[arg(long, short = 's', value_name = "FILE")]
    pub schema: PathBuf,

    /// Data to validate (YAML or JSON).
    #[arg(long, short = 'd', value_name = "FILE")]
    pub data: PathBuf,

    /// Custom messages: a flat mapping such as `phone.mobile: "..."`.
    #[arg(long, value_name = "FILE")]
    pub messages: Option<PathBuf>,

    /// Stop at the first failure.
    #[arg(long)]
    pub bail: bool,

    /// Count empty strings as present.
    #[arg(long)]
    pub strict: bool,

    /// Shape of the error body.
    #[arg(long, value_enum, default_value_t = ReporterKind::Vanilla)]
    pub reporter: ReporterKind,

    /// Print the error body as JSON instead of one line per failure.
    #[arg(long)]
    pub json: bool,

    /// Cache the compiled schema under this key.
    #[arg(long, value_name = "KEY")]
    pub cache_key: Option<String>,
}

/// Built-in reporter selectable from the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReporterKind {
    /// Messages grouped by pointer.
    Vanilla,
    /// Flat list of `{rule, field, message}`.
    Api,
    /// JSON:API error objects.
    Jsonapi,
}

impl ReporterKind {
    fn factory(self) -> ReporterFactory {
        match self {
            Self::Vanilla => reporter_factory::<VanillaReporter>(),
            Self::Api => reporter_factory::<ApiReporter>(),
            Self::Jsonapi => reporter_factory::<JsonApiReporter>(),
        }
    }
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    run_validate_with(&Validator::new(), args)
}

/// Execute the validate subcommand on an existing validator, sharing its
/// types and routine cache.
pub fn run_validate_with(validator: &Validator, args: &ValidateArgs) -> Result<u8> {
    let document = SchemaDocument::load(&args.schema)
        .with_context(|| format!("failed to load schema {}", args.schema.display()))?;
    let data = input::load_data(&args.data)
        .with_context(|| format!("failed to load data {}", args.data.display()))?;
    let messages = match &args.messages {
        Some(path) => Some(
            input::load_messages(path)
                .with_context(|| format!("failed to load messages {}", path.display()))?,
        ),
        None => None,
    };

    let schema = match validator.schema_from_document(&document) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("schema error: {e}");
            return Ok(2);
        }
    };
    tracing::info!(fields = schema.len(), schema = %args.schema.display(), "schema loaded");

    let mut options = ValidateOptions::new(schema, data)
        .bail(args.bail)
        .exists_strict(args.strict)
        .reporter(args.reporter.factory());
    if let Some(messages) = messages {
        options = options.messages(messages);
    }
    if let Some(key) = &args.cache_key {
        options = options.cache_key(key.clone());
    }

    let pending = match validator.validate(options) {
        Ok(pending) => pending,
        Err(e) => {
            eprintln!("schema error: {e}");
            return Ok(2);
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    match runtime.block_on(pending) {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(0)
        }
        Err(failure) => {
            tracing::info!(errors = failure.len(), "data rejected");
            if args.json {
                println!("{}", serde_json::to_string_pretty(failure.body())?);
            } else {
                println!("FAIL: {} error(s)", failure.len());
                println!("{failure}");
            }
            Ok(1)
        }
    }
}
