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

use bourse_custody::{BalanceLedger, TokenRegistry};
use bourse_sdk::types::{OrderId, SequenceNumber, Symbol, TradeId};

use crate::orderbook::OrderBookStore;

/// Exchange state
///
/// This structure holds the complete state of the exchange:
/// - Token registry
/// - Balance ledger
/// - Order books (all resting limit orders)
/// - ID and sequence counters
///
/// The state is exclusively owned by the [`Exchange`](super::Exchange) and
/// can be snapshotted.
pub struct ExchangeState {
	pub registry: TokenRegistry,
	pub ledger: BalanceLedger,
	pub books: OrderBookStore,
	/// Next order ID to assign
	pub next_order_id: OrderId,
	/// Next trade ID to assign
	pub next_trade_id: TradeId,
	/// Next operation sequence number to assign
	pub next_sequence: SequenceNumber,
}

impl ExchangeState {
	pub fn new(quote: Symbol) -> Self {
		Self {
			registry: TokenRegistry::new(quote),
			ledger: BalanceLedger::new(),
			books: OrderBookStore::new(),
			next_order_id: 1,
			next_trade_id: 1,
			next_sequence: 1,
		}
	}

	pub fn take_sequence(&mut self) -> SequenceNumber {
		let seq = self.next_sequence;
		self.next_sequence += 1;
		seq
	}

	pub fn take_order_id(&mut self) -> OrderId {
		let id = self.next_order_id;
		self.next_order_id += 1;
		id
	}

	pub fn take_trade_id(&mut self) -> TradeId {
		let id = self.next_trade_id;
		self.next_trade_id += 1;
		id
	}
}
