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

mod storage;

use bourse_sdk::types::{AccountId, Amount, Order, OrderId, SequenceNumber, Side, Symbol, TradeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use storage::{FileSnapshotStorage, MemorySnapshotStorage, SnapshotStorage};

/// Error types for snapshot operations
#[derive(Debug, Error)]
pub enum SnapshotError {
	#[error("Snapshot references a token with no reference supplied: {0}")]
	MissingToken(Symbol),
	#[error("Quote currency mismatch: engine uses {expected}, snapshot has {found}")]
	QuoteMismatch { expected: Symbol, found: Symbol },
	#[error("Snapshot corrupted: {0}")]
	Corrupted(String),
	#[error("No snapshot available")]
	NotFound,
	#[error("Snapshot I/O error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Snapshot serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Metadata about a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
	/// When the snapshot was created (unix timestamp)
	pub created_at: u64,
	/// Next operation sequence at the time of capture
	pub sequence: SequenceNumber,
	/// Number of resting orders captured
	pub order_count: usize,
	/// Number of balance records captured
	pub balance_count: usize,
}

/// One (trader, symbol) balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
	pub trader: AccountId,
	pub symbol: Symbol,
	pub amount: Amount,
}

/// One (symbol, side) book in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
	pub symbol: Symbol,
	pub side: Side,
	pub orders: Vec<Order>,
}

/// Complete, serializable exchange state
///
/// Mirrors the logical persisted layout: the token registry table, the
/// balance table keyed by (trader, symbol), and one ordered order list per
/// (symbol, side). Token references themselves are live objects and are
/// not captured; they are supplied again on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSnapshot {
	pub metadata: SnapshotMetadata,
	pub quote_symbol: Symbol,
	/// Registered symbols in registration order
	pub tokens: Vec<Symbol>,
	pub balances: Vec<BalanceRecord>,
	pub books: Vec<BookSnapshot>,
	pub next_order_id: OrderId,
	pub next_trade_id: TradeId,
	pub next_sequence: SequenceNumber,
}
