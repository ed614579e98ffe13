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

use std::collections::BTreeMap;

use bourse_custody::BalanceLedger;
use bourse_sdk::types::{AccountId, Amount, OrderId, Price, Side, Symbol};

use crate::{orderbook::OrderBookStore, types::ExchangeError};

/// One fill of an incoming market order against a resting order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
	pub order_id: OrderId,
	pub maker: AccountId,
	pub price: Price,
	pub amount: Amount,
}

/// Incoming market order as seen by the planner
#[derive(Debug, Clone, Copy)]
pub struct MarketOrder<'a> {
	pub taker: &'a AccountId,
	pub symbol: Symbol,
	pub side: Side,
	pub amount: Amount,
	pub quote: Symbol,
}

/// Fills and resulting balances of a market order, not yet applied
///
/// Produced by [`plan_market_order`] without touching the ledger or the
/// books. Every balance in `balances` has already been checked to stay
/// non-negative, so committing the plan cannot fail.
#[derive(Debug, Clone, Default)]
pub struct FillPlan {
	pub fills: Vec<Fill>,
	pub filled: Amount,
	/// Final value of every balance touched by the plan
	pub balances: BTreeMap<(AccountId, Symbol), Amount>,
}

/// Scratch copy of the balances touched while planning
struct BalanceOverlay<'a> {
	ledger: &'a BalanceLedger,
	changes: BTreeMap<(AccountId, Symbol), Amount>,
}

impl<'a> BalanceOverlay<'a> {
	fn new(ledger: &'a BalanceLedger) -> Self {
		Self {
			ledger,
			changes: BTreeMap::new(),
		}
	}

	fn get(&self, trader: &AccountId, symbol: Symbol) -> Amount {
		self.changes
			.get(&(trader.clone(), symbol))
			.copied()
			.unwrap_or_else(|| self.ledger.balance_of(trader, &symbol))
	}

	fn credit(&mut self, trader: &AccountId, symbol: Symbol, amount: Amount) -> Result<(), ExchangeError> {
		let balance = self
			.get(trader, symbol)
			.checked_add(amount)
			.ok_or(ExchangeError::ArithmeticOverflow)?;
		self.changes.insert((trader.clone(), symbol), balance);
		Ok(())
	}

	/// Returns the available balance as the error when it is too low
	fn debit(&mut self, trader: &AccountId, symbol: Symbol, amount: Amount) -> Result<(), Amount> {
		let available = self.get(trader, symbol);
		if available < amount {
			return Err(available);
		}
		self.changes.insert((trader.clone(), symbol), available - amount);
		Ok(())
	}
}

/// Walk the opposite book and plan the fills of a market order
///
/// Resting orders are consumed strictly in book priority order, each at its
/// own price. Every fill moves the traded token from seller to buyer and
/// `fill amount * resting price` of the quote currency from buyer to seller.
/// Planning stops when the order is complete or the book is exhausted.
///
/// Fails without side effects if:
/// - a buying taker's running quote cost exceeds their quote balance
///   (`InsufficientQuoteBalance`)
/// - a selling taker cannot deliver the tokens (`InsufficientTokenBalance`)
/// - the owner of a resting order no longer holds what the fill needs
///   (`CounterpartyInsufficientBalance`)
pub fn plan_market_order(
	books: &OrderBookStore,
	ledger: &BalanceLedger,
	order: MarketOrder<'_>,
) -> Result<FillPlan, ExchangeError> {
	let mut overlay = BalanceOverlay::new(ledger);
	let mut fills = Vec::new();
	let mut remaining = order.amount;
	let mut quote_cost: Amount = 0;

	for resting in books.iter(&order.symbol, order.side.opposite()) {
		if remaining == 0 {
			break;
		}

		let amount = remaining.min(resting.remaining());
		if amount == 0 {
			continue;
		}
		let value = amount
			.checked_mul(resting.price)
			.ok_or(ExchangeError::ArithmeticOverflow)?;
		let counterparty = ExchangeError::CounterpartyInsufficientBalance {
			order_id: resting.id,
		};

		match order.side {
			Side::Buy => {
				quote_cost = quote_cost
					.checked_add(value)
					.ok_or(ExchangeError::ArithmeticOverflow)?;
				overlay
					.debit(order.taker, order.quote, value)
					.map_err(|_| ExchangeError::InsufficientQuoteBalance {
						symbol: order.quote,
						required: quote_cost,
						available: ledger.balance_of(order.taker, &order.quote),
					})?;
				overlay.credit(order.taker, order.symbol, amount)?;
				overlay.credit(&resting.trader, order.quote, value)?;
				overlay
					.debit(&resting.trader, order.symbol, amount)
					.map_err(|_| counterparty)?;
			}
			Side::Sell => {
				overlay
					.debit(order.taker, order.symbol, amount)
					.map_err(|available| ExchangeError::InsufficientTokenBalance {
						symbol: order.symbol,
						required: amount,
						available,
					})?;
				overlay.credit(order.taker, order.quote, value)?;
				overlay.credit(&resting.trader, order.symbol, amount)?;
				overlay
					.debit(&resting.trader, order.quote, value)
					.map_err(|_| counterparty)?;
			}
		}

		fills.push(Fill {
			order_id: resting.id,
			maker: resting.trader.clone(),
			price: resting.price,
			amount,
		});
		remaining -= amount;
	}

	Ok(FillPlan {
		fills,
		filled: order.amount - remaining,
		balances: overlay.changes,
	})
}
