//! PixelPipe CLI - Boundary Bridge
//!
//! Commands: actions, validate, apply
//! Outputs JSON to stdout
//! Returns non-zero on rejected input
//!
//! This is the external-collaborator role: it hands the core two
//! already-parsed values (image wire string, action list) and forwards
//! the result, collapsing every core failure into one generic
//! rejection with no kind detail.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use pixelpipe_core::{
    codec::{OutputFormat, DEFAULT_QUALITY},
    pipeline, validation, Registry, ENGINE_VERSION,
};

#[derive(Parser)]
#[command(name = "pixelpipe-cli")]
#[command(about = "PixelPipe CLI - Image Action Pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered action names
    Actions,

    /// Structurally validate an action list
    Validate {
        /// JSON action list
        #[arg(short, long)]
        payload: String,
    },

    /// Apply an action list to an encoded image
    Apply {
        /// JSON payload: {"data": "<wire string>", "actions": [...]}
        #[arg(short, long)]
        payload: String,

        /// Output container format
        #[arg(short, long, default_value = "png")]
        format: OutputFormat,

        /// Output quality (lossy containers only)
        #[arg(short, long, default_value_t = DEFAULT_QUALITY)]
        quality: u8,
    },
}

/// The undifferentiated client rejection. Which kind of failure
/// occurred is logged but never surfaced.
fn bad_request() -> ExitCode {
    println!(r#"{{"error": "bad request"}}"#);
    ExitCode::from(2)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let registry = Registry::built_in();

    match cli.command {
        Commands::Actions => {
            let listing = serde_json::json!({
                "engine": ENGINE_VERSION,
                "actions": registry.names(),
            });
            println!("{}", serde_json::to_string_pretty(&listing).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Validate { payload } => {
            let value: serde_json::Value = match serde_json::from_str(&payload) {
                Ok(v) => v,
                Err(err) => {
                    log::warn!("payload is not JSON: {err}");
                    return bad_request();
                }
            };
            match validation::check_actions(&value) {
                Ok(()) => {
                    println!(r#"{{"valid": true}}"#);
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    log::warn!("invalid action list: {err}");
                    println!(r#"{{"valid": false}}"#);
                    ExitCode::from(2)
                }
            }
        }

        Commands::Apply {
            payload,
            format,
            quality,
        } => {
            let value: serde_json::Value = match serde_json::from_str(&payload) {
                Ok(v) => v,
                Err(err) => {
                    log::warn!("payload is not JSON: {err}");
                    return bad_request();
                }
            };
            let (Some(data), Some(actions)) = (
                value.get("data").and_then(|d| d.as_str()),
                value.get("actions"),
            ) else {
                log::warn!("payload is missing `data` or `actions`");
                return bad_request();
            };

            match pipeline::process_as(&registry, data, actions, format, quality) {
                Ok(wire) => {
                    let body = serde_json::json!({ "data": wire });
                    println!("{}", serde_json::to_string(&body).unwrap());
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    log::warn!("pipeline rejected request: {err}");
                    bad_request()
                }
            }
        }
    }
}
