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

use bourse_sdk::types::{AccountId, Amount, Symbol};
use thiserror::Error;

use crate::token::TransferError;

/// Error types for registry and ledger operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
	#[error("Unknown token: {0}")]
	UnknownToken(Symbol),
	#[error("Token already registered: {0}")]
	DuplicateToken(Symbol),
	#[error("Amount must be greater than zero")]
	InvalidAmount,
	#[error("Insufficient {symbol} balance for {trader}: required {required}, available {available}")]
	InsufficientBalance {
		trader: AccountId,
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
	#[error("Arithmetic overflow in {symbol} balance")]
	Overflow { symbol: Symbol },
	#[error("Account {0} is the custody account and cannot hold a ledger balance")]
	ReservedAccount(AccountId),
}
