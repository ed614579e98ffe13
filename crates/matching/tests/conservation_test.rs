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

//! Property tests: random operation sequences never create or destroy value,
//! rejected operations leave no trace, and books stay in priority order.

use std::sync::Arc;

use bourse_custody::{MockToken, TokenContract};
use bourse_matching::{EngineConfig, Exchange};
use bourse_sdk::types::{AccountId, Amount, Price, Side, Symbol};
use proptest::prelude::*;

const DAI: Symbol = Symbol::from_static("DAI");
const BAT: Symbol = Symbol::from_static("BAT");
const REP: Symbol = Symbol::from_static("REP");

const SYMBOLS: [Symbol; 3] = [DAI, BAT, REP];
const TRADERS: [&str; 3] = ["alice", "bob", "carol"];
const WALLET: Amount = 10_000;

#[derive(Debug, Clone)]
enum Op {
	Deposit(usize, usize, Amount),
	Withdraw(usize, usize, Amount),
	Limit(usize, usize, Amount, Price, Side),
	Market(usize, usize, Amount, Side),
}

fn side() -> impl Strategy<Value = Side> {
	prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		(0..3usize, 0..3usize, 0..3_000u128).prop_map(|(t, s, a)| Op::Deposit(t, s, a)),
		(0..3usize, 0..3usize, 0..1_000u128).prop_map(|(t, s, a)| Op::Withdraw(t, s, a)),
		(0..3usize, 0..3usize, 0..200u128, 0..20u128, side())
			.prop_map(|(t, s, a, p, side)| Op::Limit(t, s, a, p, side)),
		(0..3usize, 0..3usize, 0..400u128, side()).prop_map(|(t, s, a, side)| Op::Market(t, s, a, side)),
	]
}

struct World {
	exchange: Exchange,
	tokens: Vec<(Symbol, Arc<MockToken>)>,
	traders: Vec<AccountId>,
}

impl World {
	fn new() -> Self {
		let mut exchange = Exchange::new(EngineConfig::default());
		let traders: Vec<_> = TRADERS.iter().map(|t| AccountId::from(*t)).collect();
		let mut tokens = Vec::new();
		for symbol in SYMBOLS {
			let token = MockToken::shared(symbol);
			exchange.add_token(symbol, token.clone()).unwrap();
			for trader in &traders {
				token.faucet(trader, WALLET).unwrap();
				token.approve(trader, exchange.custodian(), Amount::MAX);
			}
			tokens.push((symbol, token));
		}
		Self {
			exchange,
			tokens,
			traders,
		}
	}

	fn apply(&mut self, op: &Op) -> bool {
		let symbol = |s: usize| SYMBOLS[s];
		match *op {
			Op::Deposit(t, s, amount) => self
				.exchange
				.deposit(&self.traders[t], &symbol(s), amount)
				.is_ok(),
			Op::Withdraw(t, s, amount) => self
				.exchange
				.withdraw(&self.traders[t], &symbol(s), amount)
				.is_ok(),
			Op::Limit(t, s, amount, price, side) => self
				.exchange
				.create_limit_order(&self.traders[t], &symbol(s), amount, price, side)
				.is_ok(),
			Op::Market(t, s, amount, side) => self
				.exchange
				.create_market_order(&self.traders[t], &symbol(s), amount, side)
				.is_ok(),
		}
	}

	fn check_invariants(&self) {
		for (symbol, token) in &self.tokens {
			let audit = self.exchange.custody_audit(symbol).unwrap();
			assert!(audit.is_balanced(), "{audit:?}");

			let wallets: Amount = self.traders.iter().map(|t| token.balance_of(t)).sum();
			assert_eq!(
				wallets + audit.custody_balance,
				WALLET * self.traders.len() as Amount,
				"{symbol} supply changed"
			);

			for side in [Side::Buy, Side::Sell] {
				let orders = self.exchange.get_orders(symbol, side);
				for pair in orders.windows(2) {
					let (a, b) = (&pair[0], &pair[1]);
					let better = match side {
						Side::Buy => a.price > b.price,
						Side::Sell => a.price < b.price,
					};
					assert!(better || (a.price == b.price && a.sequence < b.sequence));
				}
				assert!(orders.iter().all(|o| o.filled < o.amount && o.price > 0));
			}
		}
	}
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn value_is_conserved(ops in proptest::collection::vec(op(), 1..60)) {
		let mut world = World::new();
		for op in &ops {
			world.apply(op);
			world.check_invariants();
		}
	}

	#[test]
	fn rejected_operations_leave_no_trace(ops in proptest::collection::vec(op(), 1..60)) {
		let mut world = World::new();
		for op in &ops {
			let before = world.exchange.snapshot();
			if !world.apply(op) {
				let after = world.exchange.snapshot();
				prop_assert_eq!(&before.balances, &after.balances);
				prop_assert_eq!(&before.books, &after.books);
				prop_assert_eq!(before.next_order_id, after.next_order_id);
				prop_assert_eq!(before.next_trade_id, after.next_trade_id);
			}
		}
	}
}
