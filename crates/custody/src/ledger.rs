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

use std::collections::HashMap;

use bourse_sdk::types::{AccountId, Amount, Symbol};
use tracing::{error, info, warn};

use crate::{error::CustodyError, registry::TokenRegistry};

/// Balance ledger
///
/// Tracks the available balance of every (trader, symbol) pair held in
/// custody by the exchange. Balances are stored as
/// `HashMap<AccountId, HashMap<Symbol, Amount>>`; a missing entry reads as
/// zero.
///
/// Invariant: for every symbol, the sum of ledger balances equals the
/// amount the custodian account holds on the token collaborator.
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
	balances: HashMap<AccountId, HashMap<Symbol, Amount>>,
}

impl BalanceLedger {
	pub fn new() -> Self {
		Self::default()
	}

	/// Available balance of `trader` in `symbol`
	pub fn balance_of(&self, trader: &AccountId, symbol: &Symbol) -> Amount {
		self.balances
			.get(trader)
			.and_then(|assets| assets.get(symbol))
			.copied()
			.unwrap_or(0)
	}

	/// Sum of every trader's balance in `symbol`, saturating at `Amount::MAX`
	pub fn total(&self, symbol: &Symbol) -> Amount {
		self.balances
			.values()
			.filter_map(|assets| assets.get(symbol))
			.fold(0, |total: Amount, balance| total.saturating_add(*balance))
	}

	/// Pull `amount` of `symbol` from `trader` into custody
	///
	/// The custodian must have been approved by the trader on the token
	/// collaborator. The ledger is credited only after the transfer succeeds.
	/// The custodian itself can never deposit: its transfer to itself moves
	/// nothing.
	pub fn deposit(
		&mut self,
		registry: &TokenRegistry,
		custodian: &AccountId,
		trader: &AccountId,
		symbol: &Symbol,
		amount: Amount,
	) -> Result<(), CustodyError> {
		if trader == custodian {
			return Err(CustodyError::ReservedAccount(trader.clone()));
		}
		if amount == 0 {
			return Err(CustodyError::InvalidAmount);
		}
		let token = registry.resolve(symbol)?;

		let new_balance = self
			.balance_of(trader, symbol)
			.checked_add(amount)
			.ok_or(CustodyError::Overflow { symbol: *symbol })?;

		token
			.transfer_from(custodian, trader, custodian, amount)
			.map_err(|source| {
				warn!(target: "custody", "Deposit of {} {} by {} failed: {}", amount, symbol, trader, source);
				CustodyError::TransferFailed {
					symbol: *symbol,
					source,
				}
			})?;

		self.set_balance(trader, symbol, new_balance);
		info!(target: "custody", "Deposit: {} {} by {}", amount, symbol, trader);
		Ok(())
	}

	/// Release `amount` of `symbol` from custody back to `trader`
	///
	/// The ledger is debited before the transfer; a failed transfer restores
	/// the previous balance.
	pub fn withdraw(
		&mut self,
		registry: &TokenRegistry,
		custodian: &AccountId,
		trader: &AccountId,
		symbol: &Symbol,
		amount: Amount,
	) -> Result<(), CustodyError> {
		if trader == custodian {
			return Err(CustodyError::ReservedAccount(trader.clone()));
		}
		if amount == 0 {
			return Err(CustodyError::InvalidAmount);
		}
		let token = registry.resolve(symbol)?;

		let previous = self.balance_of(trader, symbol);
		self.debit(trader, symbol, amount)?;

		if let Err(source) = token.transfer(custodian, trader, amount) {
			self.set_balance(trader, symbol, previous);
			error!(
				target: "custody",
				"Withdrawal of {} {} to {} failed, ledger restored: {}",
				amount, symbol, trader, source
			);
			return Err(CustodyError::TransferFailed {
				symbol: *symbol,
				source,
			});
		}

		info!(target: "custody", "Withdrawal: {} {} to {}", amount, symbol, trader);
		Ok(())
	}

	/// Increase a balance, checking for overflow
	pub fn credit(
		&mut self,
		trader: &AccountId,
		symbol: &Symbol,
		amount: Amount,
	) -> Result<(), CustodyError> {
		let new_balance = self
			.balance_of(trader, symbol)
			.checked_add(amount)
			.ok_or(CustodyError::Overflow { symbol: *symbol })?;
		self.set_balance(trader, symbol, new_balance);
		Ok(())
	}

	/// Decrease a balance; never goes below zero
	pub fn debit(
		&mut self,
		trader: &AccountId,
		symbol: &Symbol,
		amount: Amount,
	) -> Result<(), CustodyError> {
		let available = self.balance_of(trader, symbol);
		if available < amount {
			return Err(CustodyError::InsufficientBalance {
				trader: trader.clone(),
				symbol: *symbol,
				required: amount,
				available,
			});
		}
		self.set_balance(trader, symbol, available - amount);
		Ok(())
	}

	/// Overwrite a balance
	///
	/// Used by settlement to commit balances that were computed and checked
	/// against a scratch copy, and by snapshot restore.
	pub fn set_balance(&mut self, trader: &AccountId, symbol: &Symbol, amount: Amount) {
		self.balances
			.entry(trader.clone())
			.or_default()
			.insert(*symbol, amount);
	}

	/// All balance records, sorted by trader then symbol
	pub fn records(&self) -> Vec<(AccountId, Symbol, Amount)> {
		let mut records: Vec<_> = self
			.balances
			.iter()
			.flat_map(|(trader, assets)| {
				assets
					.iter()
					.map(move |(symbol, amount)| (trader.clone(), *symbol, *amount))
			})
			.collect();
		records.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));
		records
	}
}
