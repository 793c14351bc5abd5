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
use crate::util::amount::Amount;
use crate::util::date::Date;
use crate::util::quant::Quant;
use anyhow::{bail, Error};

/// A disposal the user recorded by hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sale {
	pub date: Date,
	pub shares: Quant,

	/// Not necessarily in dollars; see `Currency`
	pub unit_price: Amount,
}

impl Sale {
	pub fn new(
		date: Date,
		shares: Quant,
		unit_price: Amount,
	) -> Result<Self, Error> {
		if !shares.is_positive() {
			bail!("Sale must be of a positive number of shares, got {}", shares)
		}
		if unit_price.value.is_negative() {
			bail!("Sale price cannot be negative")
		}

		Ok(Self {
			date,
			shares,
			unit_price,
		})
	}
}
