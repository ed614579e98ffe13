// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging initialization for the exchange
//!
//! # Configuration
//!
//! - `RUST_LOG`: Log level filter (default: `info`)
//!   - Can be set per target: `RUST_LOG=engine=debug,custody=info`
//!
//! - `LOG_DIR`: Root directory for log files (default: `{project_root}/logs`)
//!   - Log files are created in `{LOG_DIR}/exchange/`
//!
//! - `LOG_TO_CONSOLE`: Also write to stderr with ANSI colors (default: `false`)
//!   - `true`, `1` or `yes` enable it
//!
//! # Log File Format
//!
//! - Rotation: one file per day (UTC), e.g. `exchange.2026-01-03.log`
//! - Format: UTC timestamp, thread ID, log level, target, message

use std::{
	env,
	path::{Path, PathBuf},
	sync::OnceLock,
};

use anyhow::{Context, Result};
use tracing::{Subscriber, info};
use tracing_appender::{
	non_blocking,
	rolling::{self, Rotation},
};
use tracing_subscriber::{
	EnvFilter, Layer,
	fmt::{self, MakeWriter},
	layer::SubscriberExt,
	registry::{LookupSpan, Registry},
	util::SubscriberInitExt,
};

use crate::config::{DEFAULT_LOG_LEVEL, DEFAULT_LOG_TO_CONSOLE, LOG_COMPONENT_NAME};

// Keeps the non-blocking writer flushing until the process exits
static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

/// Workspace root: the nearest ancestor whose manifest declares `[workspace]`
fn find_project_root() -> PathBuf {
	let start = env::var("CARGO_MANIFEST_DIR")
		.map(PathBuf::from)
		.or_else(|_| env::current_dir())
		.unwrap_or_else(|_| PathBuf::from("."));

	start
		.ancestors()
		.find(|dir| {
			std::fs::read_to_string(dir.join("Cargo.toml"))
				.is_ok_and(|manifest| manifest.contains("[workspace]"))
		})
		.unwrap_or(start.as_path())
		.to_path_buf()
}

/// `{root}/exchange`, where root is `LOG_DIR` or `{project_root}/logs`
fn resolve_log_dir(log_dir_override: Option<String>) -> PathBuf {
	log_dir_override
		.map(PathBuf::from)
		.unwrap_or_else(|| find_project_root().join("logs"))
		.join(LOG_COMPONENT_NAME)
}

fn parse_console_flag(value: Option<&str>) -> bool {
	value.map_or(DEFAULT_LOG_TO_CONSOLE, |v| {
		matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
	})
}

/// Daily-rolling `{component}.{date}.log` appender behind a non-blocking writer
fn setup_file_logging(log_dir: &Path) -> Result<non_blocking::NonBlocking> {
	let file_appender = rolling::RollingFileAppender::builder()
		.rotation(Rotation::DAILY)
		.filename_prefix(LOG_COMPONENT_NAME.to_string())
		.filename_suffix(".log")
		.build(log_dir)
		.with_context(|| {
			format!(
				"Failed to create rolling file appender in {}",
				log_dir.display()
			)
		})?;

	let (file_writer, guard) = non_blocking(file_appender);
	LOG_GUARD.set(guard).ok();

	Ok(file_writer)
}

/// Shared line format for every sink; only the writer and colouring differ
fn fmt_layer<S, W>(writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
	S: Subscriber + for<'span> LookupSpan<'span> + 'static,
	W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
	fmt::layer()
		.with_writer(writer)
		.with_timer(fmt::time::UtcTime::rfc_3339())
		.with_thread_ids(true)
		.with_thread_names(false)
		.with_target(true)
		.with_ansi(ansi)
		.boxed()
}

/// Initialize logging with file output and optional console output
///
/// See module-level documentation for environment variable configuration.
pub fn init_logging() -> Result<()> {
	dotenv::dotenv().ok();

	let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
	let log_dir = resolve_log_dir(env::var("LOG_DIR").ok());
	let log_to_console = parse_console_flag(env::var("LOG_TO_CONSOLE").ok().as_deref());

	std::fs::create_dir_all(&log_dir)
		.with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
	let file_writer = setup_file_logging(&log_dir)?;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

	Registry::default()
		.with(filter)
		.with(fmt_layer(file_writer, false))
		.with(log_to_console.then(|| fmt_layer(std::io::stderr, true)))
		.try_init()
		.context("Failed to install tracing subscriber")?;

	info!(
		target: "server",
		"Logging at {} to {}/{}.YYYY-MM-DD.log (daily rolling), console {}",
		log_level,
		log_dir.display(),
		LOG_COMPONENT_NAME,
		if log_to_console { "on" } else { "off" }
	);

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_console_flag() {
		assert!(parse_console_flag(Some("true")));
		assert!(parse_console_flag(Some("1")));
		assert!(parse_console_flag(Some(" YES ")));
		assert!(!parse_console_flag(Some("no")));
		assert!(!parse_console_flag(Some("")));
		assert_eq!(parse_console_flag(None), DEFAULT_LOG_TO_CONSOLE);
	}

	#[test]
	fn test_log_dir_override() {
		let dir = resolve_log_dir(Some("/var/log/bourse".to_string()));
		assert_eq!(dir, Path::new("/var/log/bourse").join(LOG_COMPONENT_NAME));
	}

	#[test]
	fn test_log_dir_defaults_under_workspace_root() {
		let dir = resolve_log_dir(None);
		let root = dir
			.parent()
			.and_then(Path::parent)
			.map(Path::to_path_buf)
			.unwrap_or_default();
		assert!(dir.ends_with(Path::new("logs").join(LOG_COMPONENT_NAME)));
		assert!(root.join("crates").join("matching").exists());
	}
}
