//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `dragonscroll_core` linkage and the configured data directory.
//! - Keep output deterministic for quick local sanity checks.

use dragonscroll_core::{init_logging_from_config, Config, CoreContext};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("dragonscroll_core ping={}", dragonscroll_core::ping());
    println!("dragonscroll_core version={}", dragonscroll_core::core_version());

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let context = match CoreContext::open(&config) {
        Ok(context) => context,
        Err(err) => {
            eprintln!("open failed ({}): {err}", err.kind());
            return ExitCode::FAILURE;
        }
    };

    println!("data_dir={}", config.data_dir.display());
    match context.catalog().len() {
        Ok(count) => println!("books={count}"),
        Err(err) => {
            eprintln!("catalog error ({}): {err}", err.kind());
            return ExitCode::FAILURE;
        }
    }
    println!("profile_name={}", context.profile().name());

    ExitCode::SUCCESS
}
