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

//! Exchange demo entry point
//!
//! Builds an exchange backed by mock tokens and replays a seeding session:
//! - Register the quote currency and three tradable tokens
//! - Fund four traders and deposit everything into custody
//! - Run a series of limit BUYs each crossed by a market SELL
//! - Leave a set of resting orders on every book
//! - Optionally persist a snapshot and restore from it

use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use tracing::info;

use bourse_custody::{MockToken, TokenRef};
use bourse_matching::{
	Exchange, ExchangeConfig, FileSnapshotStorage, SnapshotStorage, config::ENV_PREFIX,
};
use bourse_sdk::types::{AccountId, Amount, Price, Side, Symbol};

/// 1000 whole tokens at 18 decimals
const SEED_AMOUNT: Amount = 1_000 * 10u128.pow(18);

const BAT: Symbol = Symbol::from_static("BAT");
const REP: Symbol = Symbol::from_static("REP");
const ZRX: Symbol = Symbol::from_static("ZRX");

/// (symbol, amount, price) of each limit BUY immediately hit by a market SELL
const CROSSED_TRADES: &[(Symbol, Amount, Price)] = &[
	(BAT, 1_000, 10),
	(BAT, 1_200, 11),
	(BAT, 1_200, 15),
	(BAT, 1_500, 14),
	(BAT, 2_000, 12),
	(REP, 1_000, 2),
	(REP, 500, 4),
	(REP, 800, 2),
	(REP, 1_200, 6),
];

/// (trader index, symbol, amount, price, side) of the orders left on the books
const RESTING_ORDERS: &[(usize, Symbol, Amount, Price, Side)] = &[
	(0, BAT, 1_400, 10, Side::Buy),
	(1, BAT, 1_200, 11, Side::Buy),
	(1, BAT, 1_000, 12, Side::Buy),
	(0, REP, 3_000, 4, Side::Buy),
	(0, REP, 2_000, 5, Side::Buy),
	(1, REP, 500, 6, Side::Buy),
	(0, ZRX, 4_000, 12, Side::Buy),
	(0, ZRX, 3_000, 13, Side::Buy),
	(1, ZRX, 500, 14, Side::Buy),
	(2, BAT, 2_000, 16, Side::Sell),
	(3, BAT, 3_000, 15, Side::Sell),
	(3, BAT, 500, 14, Side::Sell),
	(2, REP, 4_000, 10, Side::Sell),
	(2, REP, 2_000, 9, Side::Sell),
	(3, REP, 800, 8, Side::Sell),
	(2, ZRX, 1_500, 23, Side::Sell),
	(2, ZRX, 1_200, 22, Side::Sell),
	(3, ZRX, 900, 21, Side::Sell),
];

fn main() -> Result<()> {
	bourse_matching::logging::init_logging()?;

	let config = ExchangeConfig::from_env().unwrap_or_else(|e| {
		info!(
			target: "server",
			"Using default configuration ({}_* not usable: {})", ENV_PREFIX, e
		);
		ExchangeConfig::default()
	});

	info!(target: "server", "Starting Bourse exchange demo");
	info!(target: "server", "Quote currency: {}", config.quote_symbol);
	info!(target: "server", "Custody account: {}", config.custody_account);

	let mut exchange = Exchange::new(config.engine_config());

	// Phase 1: register tokens
	let mut tokens: Vec<(Symbol, Arc<MockToken>)> = Vec::new();
	for symbol in [config.quote_symbol, BAT, REP, ZRX] {
		if tokens.iter().any(|(s, _)| *s == symbol) {
			continue;
		}
		let token = MockToken::shared(symbol);
		exchange.add_token(symbol, token.clone())?;
		tokens.push((symbol, token));
	}

	// Phase 2: fund traders
	let traders: Vec<AccountId> = (1..=4)
		.map(|i| AccountId::new(format!("trader{i}")))
		.collect();
	for trader in &traders {
		for (symbol, token) in &tokens {
			token
				.faucet(trader, SEED_AMOUNT)
				.with_context(|| format!("Failed to mint {symbol} for {trader}"))?;
			token.approve(trader, exchange.custodian(), SEED_AMOUNT);
			exchange
				.deposit(trader, symbol, SEED_AMOUNT)
				.with_context(|| format!("Failed to deposit {symbol} for {trader}"))?;
		}
	}
	info!(target: "server", "Seeded {} traders with {} tokens each", traders.len(), tokens.len());

	// Phase 3: crossed trades
	for &(symbol, amount, price) in CROSSED_TRADES {
		exchange.create_limit_order(&traders[0], &symbol, amount, price, Side::Buy)?;
		let result = exchange.create_market_order(&traders[1], &symbol, amount, Side::Sell)?;
		ensure!(
			result.fully_filled(),
			"Market sell of {amount} {symbol} filled only {}",
			result.filled
		);
	}

	// Phase 4: resting orders
	for &(trader, symbol, amount, price, side) in RESTING_ORDERS {
		exchange.create_limit_order(&traders[trader], &symbol, amount, price, side)?;
	}

	for symbol in exchange.tokens().to_vec() {
		if symbol == exchange.quote_symbol() {
			continue;
		}
		for side in [Side::Buy, Side::Sell] {
			for order in exchange.get_orders(&symbol, side) {
				info!(
					target: "server",
					"{} {} book: #{} {} @ {} ({})",
					symbol, side, order.id, order.remaining(), order.price, order.trader
				);
			}
		}
		let audit = exchange.custody_audit(&symbol)?;
		ensure!(audit.is_balanced(), "Custody mismatch for {symbol}: {audit:?}");
	}

	// Phase 5: snapshot round trip
	if let Some(dir) = &config.snapshot_dir {
		let mut storage = FileSnapshotStorage::new(dir)
			.with_context(|| format!("Failed to open snapshot directory {}", dir.display()))?;
		storage.save(&exchange.snapshot())?;

		let refs = tokens
			.iter()
			.map(|(symbol, token)| (*symbol, token.clone() as TokenRef));
		let restored = Exchange::restore(config.engine_config(), refs, storage.load_latest()?)?;
		ensure!(
			restored.open_order_count() == exchange.open_order_count(),
			"Restored exchange lost orders"
		);
		info!(
			target: "server",
			"Snapshot restored with {} open orders",
			restored.open_order_count()
		);
	}

	info!(target: "server", "Demo complete: {} open orders", exchange.open_order_count());
	Ok(())
}
