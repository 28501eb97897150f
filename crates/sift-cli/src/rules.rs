//! # Rules Subcommand
//!
//! Lists the rules a schema document may reference.

use anyhow::Result;
use clap::Args;
use sift_rules::builtin::MOBILE_LOCALES;
use sift_rules::RuleLibrary;

/// Arguments for the `sift rules` subcommand.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Also list the locales accepted by the `mobile` rule.
    #[arg(long)]
    pub locales: bool,
}

/// Execute the rules subcommand.
pub fn run_rules(args: &RulesArgs) -> Result<u8> {
    let library = RuleLibrary::builtin();
    for name in library.names() {
        println!("{name}");
    }
    if args.locales {
        println!();
        println!("mobile locales:");
        for (tag, _) in MOBILE_LOCALES {
            println!("  {tag}");
        }
    }
    Ok(0)
}
