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

//! Bourse Custody
//!
//! This crate owns the assets side of the exchange:
//! - Token collaborator interface (`TokenContract`) and an in-memory reference token
//! - Token registry (symbol -> token reference, quote-currency designation)
//! - Balance ledger (trader, symbol) -> available balance, with deposit and
//!   withdraw flows that move tokens in and out of custody
//!
//! Every operation validates before it mutates, so a returned error always
//! means no state changed.

pub mod error;
pub mod ledger;
pub mod registry;
pub mod token;

pub use error::CustodyError;
pub use ledger::BalanceLedger;
pub use registry::TokenRegistry;
pub use token::{MockToken, TokenContract, TokenRef, TransferError};
