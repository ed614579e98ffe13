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

mod state;

pub use state::ExchangeState;

use std::{collections::HashMap, time::SystemTime};

use bourse_custody::TokenRef;
use bourse_sdk::types::{
	AccountId, Amount, Order, OrderId, OrderType, Price, SequenceNumber, Side, Symbol, Trade,
};
use tracing::{debug, info, warn};

use crate::{
	matcher::{MarketOrder, plan_market_order},
	snapshot::{BalanceRecord, BookSnapshot, ExchangeSnapshot, SnapshotError, SnapshotMetadata},
	types::{CustodyAudit, ExchangeError, MatchResult},
};

pub const DEFAULT_QUOTE_SYMBOL: Symbol = Symbol::from_static("DAI");
pub const DEFAULT_CUSTODY_ACCOUNT: &str = "exchange";

/// Configuration for the exchange engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
	/// Settlement currency; never tradable as the base instrument
	pub quote_symbol: Symbol,
	/// Account that holds all deposited tokens on the token collaborators
	pub custody_account: AccountId,
	pub verbose_logging: bool,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			quote_symbol: DEFAULT_QUOTE_SYMBOL,
			custody_account: AccountId::from(DEFAULT_CUSTODY_ACCOUNT),
			verbose_logging: false,
		}
	}
}

/// Exchange engine: token registry, balance ledger and order books
///
/// Every state-changing operation takes `&mut self` and runs to completion
/// before returning. Each one validates first and mutates last, so an `Err`
/// always means nothing changed. Callers sharing an exchange between threads
/// wrap it in a `Mutex`.
///
/// Matching model:
/// - Limit orders rest on their (symbol, side) book in price-time priority
/// - Market orders sweep the opposite book and are never stored
/// - Each fill executes at the resting order's price
pub struct Exchange {
	config: EngineConfig,
	state: ExchangeState,
}

impl Exchange {
	pub fn new(config: EngineConfig) -> Self {
		let state = ExchangeState::new(config.quote_symbol);
		info!(
			target: "engine",
			"Exchange created: quote={}, custodian={}",
			config.quote_symbol, config.custody_account
		);
		Self { config, state }
	}

	pub fn custodian(&self) -> &AccountId {
		&self.config.custody_account
	}

	pub fn quote_symbol(&self) -> Symbol {
		self.config.quote_symbol
	}

	// ------------------------------------------------------------------
	// Token registry
	// ------------------------------------------------------------------

	/// Register a token; symbols can only be registered once
	pub fn add_token(&mut self, symbol: Symbol, token: TokenRef) -> Result<(), ExchangeError> {
		self.state.registry.add_token(symbol, token)?;
		Ok(())
	}

	/// Registered symbols in registration order
	pub fn tokens(&self) -> &[Symbol] {
		self.state.registry.tokens()
	}

	// ------------------------------------------------------------------
	// Balance ledger
	// ------------------------------------------------------------------

	/// Move `amount` of `symbol` from the trader's wallet into custody
	pub fn deposit(
		&mut self,
		trader: &AccountId,
		symbol: &Symbol,
		amount: Amount,
	) -> Result<(), ExchangeError> {
		self.state
			.ledger
			.deposit(
				&self.state.registry,
				&self.config.custody_account,
				trader,
				symbol,
				amount,
			)
			.map_err(ExchangeError::from)?;
		self.state.take_sequence();
		Ok(())
	}

	/// Move `amount` of `symbol` from custody back to the trader's wallet
	pub fn withdraw(
		&mut self,
		trader: &AccountId,
		symbol: &Symbol,
		amount: Amount,
	) -> Result<(), ExchangeError> {
		self.state
			.ledger
			.withdraw(
				&self.state.registry,
				&self.config.custody_account,
				trader,
				symbol,
				amount,
			)
			.map_err(ExchangeError::from)?;
		self.state.take_sequence();
		Ok(())
	}

	pub fn balance_of(&self, trader: &AccountId, symbol: &Symbol) -> Amount {
		self.state.ledger.balance_of(trader, symbol)
	}

	/// Sum of every trader's ledger balance in `symbol`
	pub fn total_balance(&self, symbol: &Symbol) -> Amount {
		self.state.ledger.total(symbol)
	}

	/// Compare the ledger total against the custodian's token balance
	pub fn custody_audit(&self, symbol: &Symbol) -> Result<CustodyAudit, ExchangeError> {
		let token = self.state.registry.resolve(symbol)?;
		Ok(CustodyAudit {
			symbol: *symbol,
			ledger_total: self.state.ledger.total(symbol),
			custody_balance: token.balance_of(&self.config.custody_account),
		})
	}

	// ------------------------------------------------------------------
	// Orders
	// ------------------------------------------------------------------

	/// Open orders of a book in priority order
	pub fn get_orders(&self, symbol: &Symbol, side: Side) -> Vec<Order> {
		self.state.books.all_orders(symbol, side)
	}

	/// Head of a book: best price, earliest among ties
	pub fn best_order(&self, symbol: &Symbol, side: Side) -> Option<&Order> {
		self.state.books.best_order(symbol, side)
	}

	/// Unfilled amount resting on a book, saturating at `Amount::MAX`
	pub fn depth(&self, symbol: &Symbol, side: Side) -> Amount {
		self.state.books.depth(symbol, side)
	}

	/// Look up a resting order
	pub fn order(&self, order_id: OrderId) -> Option<&Order> {
		self.state.books.get(order_id)
	}

	/// Total number of resting orders across all books
	pub fn open_order_count(&self) -> usize {
		self.state.books.order_count()
	}

	/// Place a limit order on the book
	///
	/// The fund check runs against the order's own limit price (a buy needs
	/// `amount * price` of quote currency), but nothing is reserved: the
	/// balance stays available until a fill actually moves it.
	///
	/// Limit orders never match on arrival, even when they cross the opposite
	/// book; they rest until a market order consumes them. Limit-against-limit
	/// crossing would be triggered here, after the insertion.
	pub fn create_limit_order(
		&mut self,
		trader: &AccountId,
		symbol: &Symbol,
		amount: Amount,
		price: Price,
		side: Side,
	) -> Result<OrderId, ExchangeError> {
		self.check_limit_order(trader, symbol, amount, price, side)
			.inspect_err(|e| Self::log_rejection(OrderType::Limit, trader, symbol, side, e))?;

		let sequence = self.state.take_sequence();
		let order = Order {
			id: self.state.take_order_id(),
			trader: trader.clone(),
			symbol: *symbol,
			side,
			price,
			amount,
			filled: 0,
			sequence,
		};
		let order_id = order.id;
		let position = self.state.books.insert(order);

		info!(
			target: "engine",
			"Limit order {} placed: {} {} {} @ {} by {}",
			order_id, side, amount, symbol, price, trader
		);
		if self.config.verbose_logging {
			debug!(
				target: "engine",
				"Order {} resting at position {} of {} {} book",
				order_id, position, symbol, side
			);
		}

		Ok(order_id)
	}

	/// Execute a market order against the opposite book
	///
	/// Fills walk the book in price-time priority until the order is complete
	/// or the book runs dry; any unfilled remainder is discarded. The whole
	/// sweep is planned against a scratch copy of the balances first and only
	/// committed once every fill is known to settle.
	pub fn create_market_order(
		&mut self,
		trader: &AccountId,
		symbol: &Symbol,
		amount: Amount,
		side: Side,
	) -> Result<MatchResult, ExchangeError> {
		self.execute_market_order(trader, symbol, amount, side)
			.inspect_err(|e| Self::log_rejection(OrderType::Market, trader, symbol, side, e))
	}

	fn execute_market_order(
		&mut self,
		trader: &AccountId,
		symbol: &Symbol,
		amount: Amount,
		side: Side,
	) -> Result<MatchResult, ExchangeError> {
		self.check_tradable(trader, symbol, amount)?;
		if side == Side::Sell {
			self.check_token_balance(trader, symbol, amount)?;
		}

		let plan = plan_market_order(
			&self.state.books,
			&self.state.ledger,
			MarketOrder {
				taker: trader,
				symbol: *symbol,
				side,
				amount,
				quote: self.config.quote_symbol,
			},
		)?;

		// Commit: nothing below can fail
		let sequence = self.state.take_sequence();
		for ((account, asset), balance) in &plan.balances {
			self.state.ledger.set_balance(account, asset, *balance);
		}

		let maker_side = side.opposite();
		let mut trades = Vec::with_capacity(plan.fills.len());
		for fill in plan.fills {
			self.state.books.record_fill(fill.order_id, fill.amount);
			if self
				.state
				.books
				.remove_filled(symbol, maker_side, fill.order_id)
				.is_some() && self.config.verbose_logging
			{
				debug!(target: "engine", "Order {} fully filled", fill.order_id);
			}

			let trade = Trade {
				trade_id: self.state.take_trade_id(),
				symbol: *symbol,
				price: fill.price,
				amount: fill.amount,
				side,
				maker_order_id: fill.order_id,
				maker: fill.maker,
				taker: trader.clone(),
				sequence,
			};
			info!(
				target: "engine",
				"Trade {}: {} {} @ {} maker={} (order {}) taker={} ({})",
				trade.trade_id,
				trade.amount,
				symbol,
				trade.price,
				trade.maker,
				trade.maker_order_id,
				trade.taker,
				side
			);
			trades.push(trade);
		}

		if plan.filled < amount {
			info!(
				target: "engine",
				"Market order by {} filled {} of {} {}; remainder discarded",
				trader, plan.filled, amount, symbol
			);
		}

		Ok(MatchResult {
			symbol: *symbol,
			side,
			requested: amount,
			filled: plan.filled,
			trades,
		})
	}

	fn check_limit_order(
		&self,
		trader: &AccountId,
		symbol: &Symbol,
		amount: Amount,
		price: Price,
		side: Side,
	) -> Result<(), ExchangeError> {
		self.check_tradable(trader, symbol, amount)?;
		if price == 0 {
			return Err(ExchangeError::InvalidPrice);
		}

		match side {
			Side::Sell => self.check_token_balance(trader, symbol, amount),
			Side::Buy => {
				let quote = self.config.quote_symbol;
				let required = amount
					.checked_mul(price)
					.ok_or(ExchangeError::ArithmeticOverflow)?;
				let available = self.state.ledger.balance_of(trader, &quote);
				if available < required {
					return Err(ExchangeError::InsufficientQuoteBalance {
						symbol: quote,
						required,
						available,
					});
				}
				Ok(())
			}
		}
	}

	/// Checks shared by limit and market orders
	fn check_tradable(
		&self,
		trader: &AccountId,
		symbol: &Symbol,
		amount: Amount,
	) -> Result<(), ExchangeError> {
		if *trader == self.config.custody_account {
			return Err(ExchangeError::ReservedAccount(trader.clone()));
		}
		self.state.registry.resolve(symbol)?;
		if self.state.registry.is_quote_currency(symbol) {
			return Err(ExchangeError::CannotTradeQuoteCurrency(*symbol));
		}
		if amount == 0 {
			return Err(ExchangeError::InvalidAmount);
		}
		Ok(())
	}

	fn check_token_balance(
		&self,
		trader: &AccountId,
		symbol: &Symbol,
		amount: Amount,
	) -> Result<(), ExchangeError> {
		let available = self.state.ledger.balance_of(trader, symbol);
		if available < amount {
			return Err(ExchangeError::InsufficientTokenBalance {
				symbol: *symbol,
				required: amount,
				available,
			});
		}
		Ok(())
	}

	fn log_rejection(
		order_type: OrderType,
		trader: &AccountId,
		symbol: &Symbol,
		side: Side,
		err: &ExchangeError,
	) {
		warn!(
			target: "engine",
			"Rejected {:?} {} order on {} by {}: {}",
			order_type, side, symbol, trader, err
		);
	}

	// ------------------------------------------------------------------
	// Snapshots
	// ------------------------------------------------------------------

	/// Capture the complete exchange state
	pub fn snapshot(&self) -> ExchangeSnapshot {
		let balances: Vec<_> = self
			.state
			.ledger
			.records()
			.into_iter()
			.map(|(trader, symbol, amount)| BalanceRecord {
				trader,
				symbol,
				amount,
			})
			.collect();
		let books: Vec<_> = self
			.state
			.books
			.books()
			.map(|((symbol, side), orders)| BookSnapshot {
				symbol,
				side,
				orders,
			})
			.collect();

		ExchangeSnapshot {
			metadata: SnapshotMetadata {
				created_at: timestamp(),
				sequence: self.state.next_sequence,
				order_count: self.state.books.order_count(),
				balance_count: balances.len(),
			},
			quote_symbol: self.config.quote_symbol,
			tokens: self.state.registry.tokens().to_vec(),
			balances,
			books,
			next_order_id: self.state.next_order_id,
			next_trade_id: self.state.next_trade_id,
			next_sequence: self.state.next_sequence,
		}
	}

	/// Rebuild an exchange from a snapshot
	///
	/// Token references cannot be serialized, so the caller supplies them
	/// again; every symbol in the snapshot must have one.
	pub fn restore(
		config: EngineConfig,
		tokens: impl IntoIterator<Item = (Symbol, TokenRef)>,
		snapshot: ExchangeSnapshot,
	) -> Result<Self, SnapshotError> {
		if snapshot.quote_symbol != config.quote_symbol {
			return Err(SnapshotError::QuoteMismatch {
				expected: config.quote_symbol,
				found: snapshot.quote_symbol,
			});
		}

		let mut refs: HashMap<Symbol, TokenRef> = tokens.into_iter().collect();
		let mut exchange = Self::new(config);

		for symbol in &snapshot.tokens {
			let token = refs
				.remove(symbol)
				.ok_or(SnapshotError::MissingToken(*symbol))?;
			exchange
				.state
				.registry
				.add_token(*symbol, token)
				.map_err(|e| SnapshotError::Corrupted(e.to_string()))?;
		}

		for record in snapshot.balances {
			if !exchange.state.registry.contains(&record.symbol) {
				return Err(SnapshotError::Corrupted(format!(
					"balance for unregistered token {}",
					record.symbol
				)));
			}
			exchange
				.state
				.ledger
				.set_balance(&record.trader, &record.symbol, record.amount);
		}

		let counters = (snapshot.next_order_id, snapshot.next_sequence);
		for book in snapshot.books {
			for order in book.orders {
				Self::validate_restored_order(&exchange, &book.symbol, book.side, &order, counters)?;
				exchange.state.books.insert(order);
			}
		}

		exchange.state.next_order_id = snapshot.next_order_id;
		exchange.state.next_trade_id = snapshot.next_trade_id;
		exchange.state.next_sequence = snapshot.next_sequence;

		info!(
			target: "engine",
			"Restored exchange from snapshot at seq={} ({} orders)",
			snapshot.metadata.sequence,
			exchange.state.books.order_count()
		);
		Ok(exchange)
	}

	fn validate_restored_order(
		exchange: &Exchange,
		symbol: &Symbol,
		side: Side,
		order: &Order,
		(next_order_id, next_sequence): (OrderId, SequenceNumber),
	) -> Result<(), SnapshotError> {
		let problem = if order.symbol != *symbol || order.side != side {
			Some("filed under the wrong book")
		} else if !exchange.state.registry.contains(symbol) {
			Some("on an unregistered token")
		} else if order.filled >= order.amount {
			Some("has no open remainder")
		} else if order.id >= next_order_id || order.sequence >= next_sequence {
			Some("is ahead of the snapshot counters")
		} else if exchange.state.books.contains(order.id) {
			Some("is duplicated")
		} else {
			None
		};

		match problem {
			Some(problem) => Err(SnapshotError::Corrupted(format!(
				"order {} {}",
				order.id, problem
			))),
			None => Ok(()),
		}
	}
}

fn timestamp() -> u64 {
	SystemTime::now()
		.duration_since(SystemTime::UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use bourse_custody::MockToken;

	use super::*;

	const SEED: Amount = 1_000;

	fn sym(s: &str) -> Symbol {
		Symbol::new(s).unwrap()
	}

	fn setup() -> (Exchange, Arc<MockToken>, Arc<MockToken>) {
		let mut exchange = Exchange::new(EngineConfig::default());
		let dai = MockToken::shared(sym("DAI"));
		let rep = MockToken::shared(sym("REP"));
		exchange.add_token(sym("DAI"), dai.clone()).unwrap();
		exchange.add_token(sym("REP"), rep.clone()).unwrap();

		for trader in ["trader1", "trader2"] {
			let trader = AccountId::from(trader);
			for token in [&dai, &rep] {
				token.faucet(&trader, SEED).unwrap();
				token.approve(&trader, exchange.custodian(), SEED);
			}
		}
		(exchange, dai, rep)
	}

	#[test]
	fn test_limit_order_gets_fresh_ids_and_sequences() {
		let (mut exchange, _, _) = setup();
		let trader = AccountId::from("trader1");
		exchange.deposit(&trader, &sym("DAI"), 100).unwrap();

		let first = exchange
			.create_limit_order(&trader, &sym("REP"), 1, 10, Side::Buy)
			.unwrap();
		let second = exchange
			.create_limit_order(&trader, &sym("REP"), 1, 10, Side::Buy)
			.unwrap();

		assert!(second > first);
		let orders = exchange.get_orders(&sym("REP"), Side::Buy);
		assert_eq!(orders[0].id, first);
		assert!(orders[0].sequence < orders[1].sequence);
	}

	#[test]
	fn test_limit_order_validation_order() {
		let (mut exchange, _, _) = setup();
		let trader = AccountId::from("trader1");

		assert_eq!(
			exchange.create_limit_order(&trader, &sym("XYZ"), 0, 0, Side::Buy),
			Err(ExchangeError::UnknownToken(sym("XYZ")))
		);
		assert_eq!(
			exchange.create_limit_order(&trader, &sym("DAI"), 0, 0, Side::Buy),
			Err(ExchangeError::CannotTradeQuoteCurrency(sym("DAI")))
		);
		assert_eq!(
			exchange.create_limit_order(&trader, &sym("REP"), 0, 10, Side::Buy),
			Err(ExchangeError::InvalidAmount)
		);
		assert_eq!(
			exchange.create_limit_order(&trader, &sym("REP"), 1, 0, Side::Sell),
			Err(ExchangeError::InvalidPrice)
		);
		assert_eq!(
			exchange.create_limit_order(&trader, &sym("REP"), Amount::MAX, 2, Side::Buy),
			Err(ExchangeError::ArithmeticOverflow)
		);
	}

	#[test]
	fn test_crossing_limit_orders_rest() {
		let (mut exchange, _, _) = setup();
		let buyer = AccountId::from("trader1");
		let seller = AccountId::from("trader2");
		exchange.deposit(&buyer, &sym("DAI"), 100).unwrap();
		exchange.deposit(&seller, &sym("REP"), 10).unwrap();

		exchange
			.create_limit_order(&buyer, &sym("REP"), 5, 12, Side::Buy)
			.unwrap();
		exchange
			.create_limit_order(&seller, &sym("REP"), 5, 10, Side::Sell)
			.unwrap();

		assert_eq!(exchange.open_order_count(), 2);
		assert_eq!(exchange.balance_of(&buyer, &sym("DAI")), 100);
		assert_eq!(exchange.balance_of(&seller, &sym("REP")), 10);
	}

	#[test]
	fn test_market_buy_consumes_sell_book() {
		let (mut exchange, _, _) = setup();
		let seller = AccountId::from("trader1");
		let buyer = AccountId::from("trader2");
		exchange.deposit(&seller, &sym("REP"), 20).unwrap();
		exchange.deposit(&buyer, &sym("DAI"), 500).unwrap();

		let cheap = exchange
			.create_limit_order(&seller, &sym("REP"), 10, 9, Side::Sell)
			.unwrap();
		let dear = exchange
			.create_limit_order(&seller, &sym("REP"), 10, 11, Side::Sell)
			.unwrap();

		let result = exchange
			.create_market_order(&buyer, &sym("REP"), 15, Side::Buy)
			.unwrap();

		assert!(result.fully_filled());
		assert_eq!(result.trades.len(), 2);
		assert_eq!(result.trades[0].maker_order_id, cheap);
		assert_eq!(result.trades[1].maker_order_id, dear);
		assert_eq!(result.trades[1].amount, 5);
		assert!(exchange.order(cheap).is_none());
		assert_eq!(exchange.order(dear).unwrap().filled, 5);
		assert_eq!(exchange.best_order(&sym("REP"), Side::Sell).unwrap().id, dear);
		assert_eq!(exchange.depth(&sym("REP"), Side::Sell), 5);

		assert_eq!(exchange.balance_of(&buyer, &sym("DAI")), 500 - 90 - 55);
		assert_eq!(exchange.balance_of(&buyer, &sym("REP")), 15);
		assert_eq!(exchange.balance_of(&seller, &sym("DAI")), 145);
		assert_eq!(exchange.balance_of(&seller, &sym("REP")), 5);
	}

	#[test]
	fn test_rejected_market_order_changes_nothing() {
		let (mut exchange, _, _) = setup();
		let buyer = AccountId::from("trader1");
		let seller = AccountId::from("trader2");
		exchange.deposit(&buyer, &sym("DAI"), 100).unwrap();
		exchange.deposit(&seller, &sym("REP"), 10).unwrap();
		exchange
			.create_limit_order(&buyer, &sym("REP"), 10, 10, Side::Buy)
			.unwrap();
		// The buyer spends the quote currency backing the resting order
		exchange.withdraw(&buyer, &sym("DAI"), 60).unwrap();

		let before = exchange.snapshot();
		let result = exchange.create_market_order(&seller, &sym("REP"), 10, Side::Sell);
		assert_eq!(
			result,
			Err(ExchangeError::CounterpartyInsufficientBalance { order_id: 1 })
		);

		let after = exchange.snapshot();
		assert_eq!(before.balances, after.balances);
		assert_eq!(before.books, after.books);
		assert_eq!(before.next_sequence, after.next_sequence);
	}

	#[test]
	fn test_custody_audit() {
		let (mut exchange, _, _) = setup();
		let trader = AccountId::from("trader1");
		exchange.deposit(&trader, &sym("REP"), 40).unwrap();
		exchange.withdraw(&trader, &sym("REP"), 15).unwrap();

		let audit = exchange.custody_audit(&sym("REP")).unwrap();
		assert_eq!(audit.ledger_total, 25);
		assert!(audit.is_balanced());
		assert!(exchange.custody_audit(&sym("ZRX")).is_err());
	}

	#[test]
	fn test_restore_rejects_quote_mismatch_and_missing_tokens() {
		let (exchange, dai, _) = setup();
		let snapshot = exchange.snapshot();

		let config = EngineConfig {
			quote_symbol: sym("USDC"),
			..EngineConfig::default()
		};
		assert!(matches!(
			Exchange::restore(config, Vec::new(), snapshot.clone()),
			Err(SnapshotError::QuoteMismatch { .. })
		));

		let tokens: Vec<(Symbol, TokenRef)> = vec![(sym("DAI"), dai)];
		assert!(matches!(
			Exchange::restore(EngineConfig::default(), tokens, snapshot),
			Err(SnapshotError::MissingToken(s)) if s == sym("REP")
		));
	}
}
