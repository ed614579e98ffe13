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

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token amount in the token's smallest denomination
pub type Amount = u128;

/// Price in quote-currency units per base-token unit
pub type Price = u128;

/// Order identifier, assigned monotonically by the engine
pub type OrderId = u64;

/// Trade identifier, assigned monotonically by the engine
pub type TradeId = u64;

/// Engine-wide operation sequence number (time priority key)
pub type SequenceNumber = u64;

/// Maximum encoded length of a symbol in bytes
pub const SYMBOL_CAPACITY: usize = 32;

/// Error types for symbol parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
	#[error("Symbol must not be empty")]
	Empty,
	#[error("Symbol exceeds 32 bytes: {0}")]
	TooLong(String),
	#[error("Symbol contains a NUL byte")]
	NulByte,
}

/// Fixed-width token symbol (e.g. "DAI", "REP")
///
/// Symbols are stored inline in a 32-byte buffer so they are `Copy` and
/// cheap to use as map keys. Comparison is byte-wise and case-sensitive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol {
	bytes: [u8; SYMBOL_CAPACITY],
	len: u8,
}

impl Symbol {
	/// Create a symbol from a string slice
	pub fn new(symbol: &str) -> Result<Self, SymbolError> {
		if symbol.is_empty() {
			return Err(SymbolError::Empty);
		}
		if symbol.len() > SYMBOL_CAPACITY {
			return Err(SymbolError::TooLong(symbol.to_string()));
		}
		if symbol.as_bytes().contains(&0) {
			return Err(SymbolError::NulByte);
		}

		let mut bytes = [0u8; SYMBOL_CAPACITY];
		bytes[..symbol.len()].copy_from_slice(symbol.as_bytes());
		Ok(Self {
			bytes,
			len: symbol.len() as u8,
		})
	}

	/// Create a symbol from a literal; invalid input fails const evaluation
	pub const fn from_static(symbol: &'static str) -> Self {
		let src = symbol.as_bytes();
		assert!(!src.is_empty() && src.len() <= SYMBOL_CAPACITY, "invalid symbol length");

		let mut bytes = [0u8; SYMBOL_CAPACITY];
		let mut i = 0;
		while i < src.len() {
			assert!(src[i] != 0, "symbol contains a NUL byte");
			bytes[i] = src[i];
			i += 1;
		}
		Self {
			bytes,
			len: src.len() as u8,
		}
	}

	pub fn as_str(&self) -> &str {
		// Constructed from a &str and never truncated, so always valid UTF-8
		std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
	}
}

impl fmt::Display for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl fmt::Debug for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Symbol({:?})", self.as_str())
	}
}

impl FromStr for Symbol {
	type Err = SymbolError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

impl TryFrom<&str> for Symbol {
	type Error = SymbolError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl TryFrom<String> for Symbol {
	type Error = SymbolError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(&value)
	}
}

impl From<Symbol> for String {
	fn from(symbol: Symbol) -> Self {
		symbol.as_str().to_string()
	}
}

/// Opaque account identifier
///
/// Traders, the exchange custodian and any other token holder are all
/// identified by an `AccountId`. The engine never interprets its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for AccountId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for AccountId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for AccountId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
	Buy,
	Sell,
}

impl Side {
	/// The side an order of this side matches against
	pub fn opposite(self) -> Self {
		match self {
			Side::Buy => Side::Sell,
			Side::Sell => Side::Buy,
		}
	}
}

impl fmt::Display for Side {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Side::Buy => f.write_str("BUY"),
			Side::Sell => f.write_str("SELL"),
		}
	}
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
	Limit,
	Market,
}

/// Order status, derived from the fill state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	Open,
	PartiallyFilled,
	Filled,
}

/// Resting limit order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Order ID
	pub id: OrderId,
	/// Owner of the order
	pub trader: AccountId,
	/// Traded token
	pub symbol: Symbol,
	/// Order side
	pub side: Side,
	/// Limit price
	pub price: Price,
	/// Original amount
	pub amount: Amount,
	/// Amount filled so far
	pub filled: Amount,
	/// Creation sequence number (time priority)
	pub sequence: SequenceNumber,
}

impl Order {
	/// Amount still open on the book
	pub fn remaining(&self) -> Amount {
		self.amount - self.filled
	}

	pub fn is_filled(&self) -> bool {
		self.filled == self.amount
	}

	pub fn status(&self) -> OrderStatus {
		if self.filled == 0 {
			OrderStatus::Open
		} else if self.filled < self.amount {
			OrderStatus::PartiallyFilled
		} else {
			OrderStatus::Filled
		}
	}
}

/// Trade execution result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
	/// Trade ID
	pub trade_id: TradeId,
	/// Traded token
	pub symbol: Symbol,
	/// Price at which trade executed (the resting order's price)
	pub price: Price,
	/// Base-token amount executed
	pub amount: Amount,
	/// Side of the trade (from taker's perspective)
	pub side: Side,
	/// Resting order that provided liquidity
	pub maker_order_id: OrderId,
	/// Owner of the resting order
	pub maker: AccountId,
	/// Owner of the incoming market order
	pub taker: AccountId,
	/// Operation sequence that produced the trade
	pub sequence: SequenceNumber,
}
