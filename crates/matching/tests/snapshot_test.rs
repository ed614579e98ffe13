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

use bourse_custody::{MockToken, TokenRef};
use bourse_matching::{
	EngineConfig, Exchange, FileSnapshotStorage, MemorySnapshotStorage, SnapshotError,
	SnapshotStorage,
};
use bourse_sdk::types::{AccountId, Side, Symbol};

const DAI: Symbol = Symbol::from_static("DAI");
const REP: Symbol = Symbol::from_static("REP");

fn build_exchange() -> (Exchange, Vec<(Symbol, TokenRef)>) {
	let mut exchange = Exchange::new(EngineConfig::default());
	let mut refs: Vec<(Symbol, TokenRef)> = Vec::new();
	let maker = AccountId::from("maker");
	let taker = AccountId::from("taker");

	for symbol in [DAI, REP] {
		let token = MockToken::shared(symbol);
		exchange.add_token(symbol, token.clone()).unwrap();
		for trader in [&maker, &taker] {
			token.faucet(trader, 1_000).unwrap();
			token.approve(trader, exchange.custodian(), 1_000);
			exchange.deposit(trader, &symbol, 500).unwrap();
		}
		refs.push((symbol, token as TokenRef));
	}

	exchange
		.create_limit_order(&maker, &REP, 10, 5, Side::Sell)
		.unwrap();
	exchange
		.create_limit_order(&maker, &REP, 20, 6, Side::Sell)
		.unwrap();
	exchange
		.create_limit_order(&maker, &REP, 10, 4, Side::Buy)
		.unwrap();
	exchange
		.create_market_order(&taker, &REP, 15, Side::Buy)
		.unwrap();

	(exchange, refs)
}

#[test]
fn test_file_snapshot_round_trip() {
	let (exchange, refs) = build_exchange();
	let dir = tempfile::tempdir().unwrap();
	let mut storage = FileSnapshotStorage::new(dir.path()).unwrap();

	let snapshot = exchange.snapshot();
	storage.save(&snapshot).unwrap();
	let loaded = storage.load_latest().unwrap();
	assert_eq!(loaded, snapshot);

	let mut restored = Exchange::restore(EngineConfig::default(), refs, loaded).unwrap();
	let maker = AccountId::from("maker");
	let taker = AccountId::from("taker");

	assert_eq!(restored.tokens(), exchange.tokens());
	for symbol in [DAI, REP] {
		for trader in [&maker, &taker] {
			assert_eq!(
				restored.balance_of(trader, &symbol),
				exchange.balance_of(trader, &symbol)
			);
		}
		assert!(restored.custody_audit(&symbol).unwrap().is_balanced());
	}
	for side in [Side::Buy, Side::Sell] {
		assert_eq!(restored.get_orders(&REP, side), exchange.get_orders(&REP, side));
	}

	// The partially filled sell order keeps its place and fill state
	let sells = restored.get_orders(&REP, Side::Sell);
	assert_eq!(sells.len(), 1);
	assert_eq!(sells[0].filled, 5);

	// Counters continue from where the snapshot left off
	let next = restored
		.create_limit_order(&maker, &REP, 1, 7, Side::Sell)
		.unwrap();
	assert!(exchange.order(next).is_none());
	assert!(next > sells[0].id);
	let result = restored
		.create_market_order(&taker, &REP, 16, Side::Buy)
		.unwrap();
	assert_eq!(result.filled, 16);
	assert_eq!(result.trades[0].maker_order_id, sells[0].id);
}

#[test]
fn test_restore_rejects_corrupted_books() {
	let (exchange, refs) = build_exchange();
	let mut storage = MemorySnapshotStorage::new();

	let mut snapshot = exchange.snapshot();
	let book = snapshot
		.books
		.iter_mut()
		.find(|b| b.side == Side::Sell)
		.unwrap();
	let duplicate = book.orders[0].clone();
	book.orders.push(duplicate);
	storage.save(&snapshot).unwrap();

	let result = Exchange::restore(EngineConfig::default(), refs, storage.load_latest().unwrap());
	assert!(matches!(result, Err(SnapshotError::Corrupted(_))));
}

#[test]
fn test_restore_rejects_filled_orders() {
	let (exchange, refs) = build_exchange();
	let mut snapshot = exchange.snapshot();
	for book in &mut snapshot.books {
		for order in &mut book.orders {
			order.filled = order.amount;
		}
	}

	let result = Exchange::restore(EngineConfig::default(), refs, snapshot);
	assert!(matches!(result, Err(SnapshotError::Corrupted(_))));
}
