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

//! Bourse exchange engine
//!
//! Custodial exchange ledger: traders deposit registered tokens, place limit
//! orders that rest in per-(symbol, side) books, and execute market orders
//! that sweep those books in price-time priority. All trades settle against
//! the single quote currency.
//!
//! Architecture:
//! - Synchronous, single-owner engine (`&mut self` for every mutation)
//! - Plan-then-commit matching so rejected orders leave no trace
//! - Token registry and balance ledger live in `bourse-custody`
//! - Serializable snapshots with pluggable storage

pub mod config;
pub mod engine;
pub mod logging;
pub mod matcher;
pub mod orderbook;
pub mod snapshot;
pub mod types;

pub use config::ExchangeConfig;
pub use engine::{EngineConfig, Exchange, ExchangeState};
pub use matcher::{Fill, FillPlan, MarketOrder, plan_market_order};
pub use orderbook::OrderBookStore;
pub use snapshot::{
	ExchangeSnapshot, FileSnapshotStorage, MemorySnapshotStorage, SnapshotError, SnapshotStorage,
};
pub use types::*;
