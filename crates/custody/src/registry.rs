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

use std::{collections::HashMap, fmt};

use bourse_sdk::types::Symbol;
use tracing::{info, warn};

use crate::{error::CustodyError, token::TokenRef};

/// Token registry
///
/// Append-only mapping from symbol to token reference. One symbol is
/// designated as the quote currency at construction; it can be registered,
/// deposited and withdrawn like any other token but never traded as the
/// base instrument of an order.
pub struct TokenRegistry {
	quote: Symbol,
	tokens: HashMap<Symbol, TokenRef>,
	/// Symbols in registration order
	listing: Vec<Symbol>,
}

impl TokenRegistry {
	pub fn new(quote: Symbol) -> Self {
		Self {
			quote,
			tokens: HashMap::new(),
			listing: Vec::new(),
		}
	}

	/// Register a token under `symbol`
	///
	/// Re-registering an existing symbol is rejected; the registry never
	/// overwrites or removes entries.
	pub fn add_token(&mut self, symbol: Symbol, token: TokenRef) -> Result<(), CustodyError> {
		if self.tokens.contains_key(&symbol) {
			warn!(target: "custody", "Rejected duplicate token registration: {}", symbol);
			return Err(CustodyError::DuplicateToken(symbol));
		}

		if token.symbol() != symbol {
			warn!(
				target: "custody",
				"Registering token reporting symbol {} under {}",
				token.symbol(),
				symbol
			);
		}

		self.tokens.insert(symbol, token);
		self.listing.push(symbol);
		info!(target: "custody", "Token registered: {}", symbol);
		Ok(())
	}

	/// Look up the token registered under `symbol`
	pub fn resolve(&self, symbol: &Symbol) -> Result<&TokenRef, CustodyError> {
		self.tokens
			.get(symbol)
			.ok_or(CustodyError::UnknownToken(*symbol))
	}

	pub fn contains(&self, symbol: &Symbol) -> bool {
		self.tokens.contains_key(symbol)
	}

	pub fn is_quote_currency(&self, symbol: &Symbol) -> bool {
		*symbol == self.quote
	}

	/// Registered symbols in registration order
	pub fn tokens(&self) -> &[Symbol] {
		&self.listing
	}

	pub fn len(&self) -> usize {
		self.listing.len()
	}

	pub fn is_empty(&self) -> bool {
		self.listing.is_empty()
	}
}

impl fmt::Debug for TokenRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TokenRegistry")
			.field("quote", &self.quote)
			.field("tokens", &self.listing)
			.finish()
	}
}
