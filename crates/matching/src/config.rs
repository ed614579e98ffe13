// Copyright 2025 chenjjiaa
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

use std::path::PathBuf;

use bourse_sdk::types::{AccountId, Symbol};
use serde::{Deserialize, Serialize};

use crate::engine::{DEFAULT_CUSTODY_ACCOUNT, DEFAULT_QUOTE_SYMBOL, EngineConfig};

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "exchange";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

/// Environment variable prefix, e.g. `EXCHANGE_QUOTE_SYMBOL=USDC`
pub const ENV_PREFIX: &str = "EXCHANGE";

/// Exchange service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConfig {
	/// Settlement currency
	pub quote_symbol: Symbol,
	/// Account holding deposited tokens on the token collaborators
	pub custody_account: AccountId,
	/// Log book insertions and removals
	pub verbose_logging: bool,
	/// Where snapshots are written; none disables snapshots
	#[serde(default)]
	pub snapshot_dir: Option<PathBuf>,
}

impl Default for ExchangeConfig {
	fn default() -> Self {
		Self {
			quote_symbol: DEFAULT_QUOTE_SYMBOL,
			custody_account: AccountId::from(DEFAULT_CUSTODY_ACCOUNT),
			verbose_logging: false,
			snapshot_dir: None,
		}
	}
}

impl ExchangeConfig {
	/// Load configuration from environment variables
	pub fn from_env() -> Result<Self, config::ConfigError> {
		let cfg = Self::builder()?
			.add_source(Self::environment())
			.build()?;

		cfg.try_deserialize()
	}

	/// Load configuration from file
	pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
		let cfg = Self::builder()?
			.add_source(config::File::with_name(path))
			.add_source(Self::environment())
			.build()?;

		cfg.try_deserialize()
	}

	pub fn engine_config(&self) -> EngineConfig {
		EngineConfig {
			quote_symbol: self.quote_symbol,
			custody_account: self.custody_account.clone(),
			verbose_logging: self.verbose_logging,
		}
	}

	fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
	{
		config::Config::builder()
			.set_default("quote_symbol", DEFAULT_QUOTE_SYMBOL.as_str())?
			.set_default("custody_account", DEFAULT_CUSTODY_ACCOUNT)?
			.set_default("verbose_logging", false)
	}

	fn environment() -> config::Environment {
		config::Environment::with_prefix(ENV_PREFIX).try_parsing(true)
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use super::*;

	#[test]
	fn test_defaults_match_engine_defaults() {
		let config = ExchangeConfig::default();
		let engine = config.engine_config();
		assert_eq!(engine.quote_symbol, Symbol::new("DAI").unwrap());
		assert_eq!(engine.custody_account, AccountId::from("exchange"));
		assert!(!engine.verbose_logging);
		assert!(config.snapshot_dir.is_none());
	}

	#[test]
	fn test_from_file_overrides_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("exchange.toml");
		fs::write(
			&path,
			"quote_symbol = \"USDC\"\nverbose_logging = true\nsnapshot_dir = \"/var/lib/bourse\"\n",
		)
		.unwrap();

		let config = ExchangeConfig::from_file(path.to_str().unwrap()).unwrap();
		assert_eq!(config.quote_symbol, Symbol::new("USDC").unwrap());
		assert_eq!(config.custody_account, AccountId::from("exchange"));
		assert!(config.verbose_logging);
		assert_eq!(config.snapshot_dir, Some(PathBuf::from("/var/lib/bourse")));
	}

	#[test]
	fn test_from_file_rejects_invalid_symbol() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("exchange.toml");
		fs::write(&path, "quote_symbol = \"\"\n").unwrap();

		assert!(ExchangeConfig::from_file(path.to_str().unwrap()).is_err());
	}
}
