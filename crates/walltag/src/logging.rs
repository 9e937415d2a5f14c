//! Logging setup for the walltag binary.
//!
//! All log output goes to stderr; stdout is reserved for command output
//! such as `config show` and `models path`. The default filter scopes the
//! requested level to the walltag crates and keeps ONNX Runtime's session
//! chatter down. Setting `RUST_LOG` overrides the whole filter.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use walltag_core::Config;

/// Levels accepted from `[logging] level`; anything else means "info".
const KNOWN_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Build the default filter directives for a requested level.
///
/// The level applies to `walltag` and `walltag_core` only. `ort` stays at
/// warn so execution provider fallbacks are still visible, and is raised to
/// info when the run itself is at debug level.
fn scoped_directives(level: &str) -> String {
    let level = if KNOWN_LEVELS.contains(&level) {
        level
    } else {
        "info"
    };
    let ort_level = match level {
        "trace" | "debug" => "info",
        _ => "warn",
    };
    format!("walltag={level},walltag_core={level},ort={ort_level}")
}

/// Level to run at: `-v` wins, otherwise `[logging] level` from config.
fn effective_level(config: &Config, verbose: bool) -> &str {
    if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    }
}

/// Install the global subscriber at the given level.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(scoped_directives(level)));

    let base = tracing_subscriber::registry().with(filter);
    if json_format {
        base.with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        base.with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

/// Install the subscriber from the loaded config plus the global CLI flags.
pub fn init_from_config(config: &Config, verbose: bool, json_logs: bool) {
    let json_format = json_logs || config.logging.format == "json";
    init(effective_level(config, verbose), json_format);
}
