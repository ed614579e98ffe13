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

use std::collections::{BTreeMap, HashMap};

use bourse_sdk::types::{Amount, Order, OrderId, Side, Symbol};
use tracing::debug;

/// Returns true if `incoming` must be placed ahead of `resting`
///
/// Buy side: higher price first. Sell side: lower price first.
/// Equal prices always yield to the earlier sequence.
fn has_priority(side: Side, incoming: &Order, resting: &Order) -> bool {
	let better_price = match side {
		Side::Buy => incoming.price > resting.price,
		Side::Sell => incoming.price < resting.price,
	};
	better_price || (incoming.price == resting.price && incoming.sequence < resting.sequence)
}

/// Order book store for every (symbol, side) pair (single-threaded)
///
/// Orders live in an arena keyed by order ID. Each book is an ordered
/// sequence of IDs, kept in price-time priority after every insertion and
/// removal:
/// - Buy side: descending price, then ascending sequence
/// - Sell side: ascending price, then ascending sequence
///
/// Insertion is a linear scan from the head, so it is O(n) in the number of
/// open orders on that book.
#[derive(Debug, Clone, Default)]
pub struct OrderBookStore {
	/// Order ID -> open order
	orders: HashMap<OrderId, Order>,
	/// (symbol, side) -> order IDs in priority order
	books: BTreeMap<(Symbol, Side), Vec<OrderId>>,
}

impl OrderBookStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert an order at the position dictated by price-time priority
	///
	/// Returns the index at which the order was placed.
	pub fn insert(&mut self, order: Order) -> usize {
		let book = self.books.entry((order.symbol, order.side)).or_default();

		let position = book
			.iter()
			.position(|id| {
				self.orders
					.get(id)
					.is_some_and(|resting| has_priority(order.side, &order, resting))
			})
			.unwrap_or(book.len());

		debug!(
			target: "orderbook",
			"Insert order {} into {} {} book at position {}",
			order.id, order.symbol, order.side, position
		);

		book.insert(position, order.id);
		self.orders.insert(order.id, order);
		position
	}

	/// Best order of a book (best price, earliest among ties)
	pub fn best_order(&self, symbol: &Symbol, side: Side) -> Option<&Order> {
		self.books
			.get(&(*symbol, side))
			.and_then(|book| book.first())
			.and_then(|id| self.orders.get(id))
	}

	/// Iterate a book in priority order
	pub fn iter(&self, symbol: &Symbol, side: Side) -> impl Iterator<Item = &Order> + '_ {
		self.books
			.get(&(*symbol, side))
			.into_iter()
			.flatten()
			.filter_map(|id| self.orders.get(id))
	}

	/// Snapshot of a book in priority order
	pub fn all_orders(&self, symbol: &Symbol, side: Side) -> Vec<Order> {
		self.iter(symbol, side).cloned().collect()
	}

	pub fn get(&self, order_id: OrderId) -> Option<&Order> {
		self.orders.get(&order_id)
	}

	pub fn contains(&self, order_id: OrderId) -> bool {
		self.orders.contains_key(&order_id)
	}

	/// Add `amount` to an order's filled quantity
	///
	/// Returns the updated order, or `None` if the order is unknown or the
	/// fill would exceed the order's remaining amount.
	pub fn record_fill(&mut self, order_id: OrderId, amount: Amount) -> Option<&Order> {
		let order = self.orders.get_mut(&order_id)?;
		if amount > order.remaining() {
			return None;
		}
		order.filled += amount;
		Some(order)
	}

	/// Remove an order once it is fully filled
	///
	/// Orders with an open remainder are left in place and `None` is returned.
	pub fn remove_filled(&mut self, symbol: &Symbol, side: Side, order_id: OrderId) -> Option<Order> {
		if !self.orders.get(&order_id)?.is_filled() {
			return None;
		}

		let book = self.books.get_mut(&(*symbol, side))?;
		let position = book.iter().position(|id| *id == order_id)?;
		book.remove(position);
		if book.is_empty() {
			self.books.remove(&(*symbol, side));
		}

		debug!(
			target: "orderbook",
			"Removed filled order {} from {} {} book",
			order_id, symbol, side
		);
		self.orders.remove(&order_id)
	}

	/// Total unfilled amount resting on a book, saturating at `Amount::MAX`
	pub fn depth(&self, symbol: &Symbol, side: Side) -> Amount {
		self.iter(symbol, side)
			.fold(0, |total: Amount, order| total.saturating_add(order.remaining()))
	}

	/// Total number of open orders across all books
	pub fn order_count(&self) -> usize {
		self.orders.len()
	}

	/// Every non-empty book, keyed by (symbol, side), in priority order
	pub fn books(&self) -> impl Iterator<Item = ((Symbol, Side), Vec<Order>)> + '_ {
		self.books.iter().map(|((symbol, side), ids)| {
			let orders = ids
				.iter()
				.filter_map(|id| self.orders.get(id))
				.cloned()
				.collect();
			((*symbol, *side), orders)
		})
	}
}
