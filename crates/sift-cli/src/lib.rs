//! # sift-cli — Command-Line Interface for the Sift Validator
//!
//! ## Subcommands
//!
//! - `sift validate` — validate a data file against a schema document.
//! - `sift rules` — list the built-in rules (and mobile locales).
//!
//! ```bash
//! sift validate --schema signup.yaml --data payload.json
//! sift validate -s signup.yaml -d payload.yaml --bail --reporter api --json
//! sift validate -s signup.yaml -d payload.json --cache-key signup
//! sift rules --locales
//! ```

pub mod input;
pub mod rules;
pub mod validate;
