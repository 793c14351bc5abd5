/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::util::amount::{Amount, Currency};
use crate::util::date::Date;
use crate::util::quant::Quant;
use std::cmp::Ordering;
use std::fmt;

/// A buy or sell against the pool, with its exchange rate already attached.
/// Releases and sales both become one of these, so the ledger sees a single
/// uniform stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
	pub date: Date,
	pub direction: Direction,
	pub shares: Quant,

	/// Always in USD, whatever the source table was priced in
	pub unit_price: Quant,

	/// Dollars per £1 on `date`
	pub fx_rate: Quant,
}

impl Event {
	/// Total value of the event in GBP: the allowable cost of a buy, or the
	/// proceeds of a sell.
	pub fn value_gbp(&self) -> Quant {
		Amount::usd(self.shares * self.unit_price)
			.convert(Currency::Gbp, self.fx_rate)
			.value
	}

	pub fn value_usd(&self) -> Quant {
		self.shares * self.unit_price
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	Buy,
	Sell,
}

impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Direction::Buy => write!(f, "Buy"),
			Direction::Sell => write!(f, "Sell"),
		}
	}
}

impl PartialOrd for Direction {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Direction {
	fn cmp(&self, other: &Self) -> Ordering {
		match (self, other) {
			(Direction::Buy, Direction::Sell) => Ordering::Less,
			(Direction::Sell, Direction::Buy) => Ordering::Greater,
			_ => Ordering::Equal,
		}
	}
}
