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

use bourse_custody::{CustodyError, TransferError};
use bourse_sdk::types::{AccountId, Amount, OrderId, Side, Symbol, Trade};
use serde::{Deserialize, Serialize};

/// Result of executing a market order
///
/// A market order is never stored. Whatever the opposite book could not
/// absorb is simply dropped, so `filled` may be lower than `requested`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
	/// Traded token
	pub symbol: Symbol,
	/// Side of the incoming order
	pub side: Side,
	/// Amount requested by the caller
	pub requested: Amount,
	/// Amount actually executed
	pub filled: Amount,
	/// Trades generated, in execution order
	pub trades: Vec<Trade>,
}

impl MatchResult {
	pub fn fully_filled(&self) -> bool {
		self.filled == self.requested
	}

	/// Amount that found no liquidity
	pub fn unfilled(&self) -> Amount {
		self.requested - self.filled
	}
}

/// Ledger total versus what the custodian actually holds on the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyAudit {
	pub symbol: Symbol,
	/// Sum of all trader balances in the ledger
	pub ledger_total: Amount,
	/// Custodian balance reported by the token collaborator
	pub custody_balance: Amount,
}

impl CustodyAudit {
	pub fn is_balanced(&self) -> bool {
		self.ledger_total == self.custody_balance
	}
}

/// Error types for exchange operations
///
/// Every variant is a definitive rejection: the operation that returned it
/// made no change to balances or books.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
	#[error("Unknown token: {0}")]
	UnknownToken(Symbol),
	#[error("Token already registered: {0}")]
	DuplicateToken(Symbol),
	#[error("Cannot trade quote currency {0}")]
	CannotTradeQuoteCurrency(Symbol),
	#[error("Amount must be greater than zero")]
	InvalidAmount,
	#[error("Limit price must be greater than zero")]
	InvalidPrice,
	#[error("{symbol} balance too low: required {required}, available {available}")]
	InsufficientTokenBalance {
		symbol: Symbol,
		required: Amount,
		available: Amount,
	},
	#[error("{symbol} balance too low: required {required}, available {available}")]
	InsufficientQuoteBalance {
		symbol: Symbol,
		required: Amount,
		available: Amount,
	},
	#[error("Insufficient {symbol} balance: required {required}, available {available}")]
	InsufficientBalance {
		symbol: Symbol,
		required: Amount,
		available: Amount,
	},
	#[error("Token transfer failed for {symbol}: {source}")]
	TransferFailed {
		symbol: Symbol,
		#[source]
		source: TransferError,
	},
	#[error("Owner of resting order {order_id} can no longer settle it")]
	CounterpartyInsufficientBalance { order_id: OrderId },
	#[error("Arithmetic overflow")]
	ArithmeticOverflow,
	#[error("Account {0} is the custody account and cannot trade or move funds")]
	ReservedAccount(AccountId),
}

impl From<CustodyError> for ExchangeError {
	fn from(err: CustodyError) -> Self {
		match err {
			CustodyError::UnknownToken(symbol) => ExchangeError::UnknownToken(symbol),
			CustodyError::DuplicateToken(symbol) => ExchangeError::DuplicateToken(symbol),
			CustodyError::InvalidAmount => ExchangeError::InvalidAmount,
			CustodyError::InsufficientBalance {
				symbol,
				required,
				available,
				..
			} => ExchangeError::InsufficientBalance {
				symbol,
				required,
				available,
			},
			CustodyError::TransferFailed { symbol, source } => {
				ExchangeError::TransferFailed { symbol, source }
			}
			CustodyError::Overflow { .. } => ExchangeError::ArithmeticOverflow,
			CustodyError::ReservedAccount(account) => ExchangeError::ReservedAccount(account),
		}
	}
}
