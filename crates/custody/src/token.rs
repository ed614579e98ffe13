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

//! Token collaborator interface

use std::{
	collections::HashMap,
	sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use bourse_sdk::types::{AccountId, Amount, Symbol};
use thiserror::Error;

/// Error types reported by a token collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
	#[error("Insufficient token balance: required {required}, available {available}")]
	InsufficientBalance { required: Amount, available: Amount },
	#[error("Insufficient allowance: required {required}, approved {approved}")]
	InsufficientAllowance { required: Amount, approved: Amount },
	#[error("Arithmetic overflow")]
	Overflow,
	#[error("Transfer rejected: {0}")]
	Rejected(String),
}

/// Fungible token capability consumed by the custody layer
///
/// The exchange never depends on a concrete token type. Any implementation
/// that can move units between accounts satisfies the contract:
/// - `transfer` moves units owned by `sender`
/// - `transfer_from` moves units owned by `from` on behalf of `spender`,
///   consuming an allowance previously granted by `from`
///
/// Methods take `&self` so that a token can be shared between the exchange
/// and other holders; implementations provide their own interior mutability.
/// A failed transfer must not change any balance.
pub trait TokenContract: Send + Sync {
	/// Token identity
	fn symbol(&self) -> Symbol;

	/// Balance held by `owner`
	fn balance_of(&self, owner: &AccountId) -> Amount;

	/// Move `amount` from `sender` to `to`
	fn transfer(&self, sender: &AccountId, to: &AccountId, amount: Amount)
	-> Result<(), TransferError>;

	/// Move `amount` from `from` to `to` using the allowance granted to `spender`
	fn transfer_from(
		&self,
		spender: &AccountId,
		from: &AccountId,
		to: &AccountId,
		amount: Amount,
	) -> Result<(), TransferError>;
}

/// Shared reference to a token collaborator
pub type TokenRef = Arc<dyn TokenContract>;

#[derive(Debug, Default)]
struct MockTokenState {
	balances: HashMap<AccountId, Amount>,
	/// (owner, spender) -> approved amount
	allowances: HashMap<(AccountId, AccountId), Amount>,
	total_supply: Amount,
	frozen: bool,
}

impl MockTokenState {
	fn balance(&self, owner: &AccountId) -> Amount {
		self.balances.get(owner).copied().unwrap_or(0)
	}

	fn move_units(
		&mut self,
		from: &AccountId,
		to: &AccountId,
		amount: Amount,
	) -> Result<(), TransferError> {
		if self.frozen {
			return Err(TransferError::Rejected("token is frozen".to_string()));
		}

		let available = self.balance(from);
		if available < amount {
			return Err(TransferError::InsufficientBalance {
				required: amount,
				available,
			});
		}
		if from != to {
			self.balance(to)
				.checked_add(amount)
				.ok_or(TransferError::Overflow)?;
		}

		*self.balances.entry(from.clone()).or_insert(0) -= amount;
		*self.balances.entry(to.clone()).or_insert(0) += amount;
		Ok(())
	}
}

/// In-memory ERC20-style token
///
/// Used by tests, the demo binary and benchmarks as the token collaborator.
/// Supports minting through `faucet`, allowances through `approve`, and a
/// `frozen` switch that makes every transfer fail.
#[derive(Debug)]
pub struct MockToken {
	symbol: Symbol,
	state: Mutex<MockTokenState>,
}

impl MockToken {
	pub fn new(symbol: Symbol) -> Self {
		Self {
			symbol,
			state: Mutex::new(MockTokenState::default()),
		}
	}

	/// Create a shared token handle
	pub fn shared(symbol: Symbol) -> Arc<Self> {
		Arc::new(Self::new(symbol))
	}

	fn state(&self) -> MutexGuard<'_, MockTokenState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Mint `amount` new units to `to`
	pub fn faucet(&self, to: &AccountId, amount: Amount) -> Result<(), TransferError> {
		let mut state = self.state();
		let total_supply = state
			.total_supply
			.checked_add(amount)
			.ok_or(TransferError::Overflow)?;
		let balance = state
			.balance(to)
			.checked_add(amount)
			.ok_or(TransferError::Overflow)?;

		state.total_supply = total_supply;
		state.balances.insert(to.clone(), balance);
		Ok(())
	}

	/// Allow `spender` to move up to `amount` of `owner`'s units
	pub fn approve(&self, owner: &AccountId, spender: &AccountId, amount: Amount) {
		self.state()
			.allowances
			.insert((owner.clone(), spender.clone()), amount);
	}

	pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
		self.state()
			.allowances
			.get(&(owner.clone(), spender.clone()))
			.copied()
			.unwrap_or(0)
	}

	pub fn total_supply(&self) -> Amount {
		self.state().total_supply
	}

	/// Make every subsequent transfer fail (or succeed again)
	pub fn set_frozen(&self, frozen: bool) {
		self.state().frozen = frozen;
	}
}

impl TokenContract for MockToken {
	fn symbol(&self) -> Symbol {
		self.symbol
	}

	fn balance_of(&self, owner: &AccountId) -> Amount {
		self.state().balance(owner)
	}

	fn transfer(
		&self,
		sender: &AccountId,
		to: &AccountId,
		amount: Amount,
	) -> Result<(), TransferError> {
		self.state().move_units(sender, to, amount)
	}

	fn transfer_from(
		&self,
		spender: &AccountId,
		from: &AccountId,
		to: &AccountId,
		amount: Amount,
	) -> Result<(), TransferError> {
		let mut state = self.state();
		let key = (from.clone(), spender.clone());
		let approved = state.allowances.get(&key).copied().unwrap_or(0);
		if approved < amount {
			return Err(TransferError::InsufficientAllowance {
				required: amount,
				approved,
			});
		}

		state.move_units(from, to, amount)?;
		state.allowances.insert(key, approved - amount);
		Ok(())
	}
}
