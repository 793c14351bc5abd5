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
use crate::util::date::Date;
use crate::util::quant::Quant;
use anyhow::{bail, Error};
use log::warn;

/// A vesting event taken from a release confirmation. Of the `granted`
/// shares, `withheld` were sold by the broker to cover tax, and `issued`
/// actually landed in the account. Only issued shares enter the pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Release {
	pub date: Date,
	pub granted: u64,
	pub withheld: u64,
	pub issued: u64,

	/// Market value per share on the release date, in USD
	pub unit_price: Quant,
}

impl Release {
	/// Fills in whichever of withheld/issued is missing from the other two.
	/// Neither may exceed the grant. When both are given and disagree with
	/// it, the stated issued count wins, since that is what the broker
	/// actually delivered.
	pub fn new(
		date: Date,
		granted: u64,
		withheld: Option<u64>,
		issued: Option<u64>,
		unit_price: Quant,
	) -> Result<Self, Error> {
		if unit_price.is_negative() {
			bail!("Release price cannot be negative")
		}

		let (withheld, issued) = match (withheld, issued) {
			(Some(w), Some(i)) => {
				if w > granted {
					bail!("Withheld {} exceeds granted {}", w, granted);
				}
				if i > granted {
					bail!("Issued {} exceeds granted {}", i, granted);
				}
				if granted - w != i {
					warn!(
						"[{}]: issued {} does not equal granted {} less withheld {}",
						date, i, granted, w
					);
				}
				(w, i)
			},
			(Some(w), None) => match granted.checked_sub(w) {
				Some(i) => (w, i),
				None => bail!("Withheld {} exceeds granted {}", w, granted),
			},
			(None, Some(i)) => match granted.checked_sub(i) {
				Some(w) => (w, i),
				None => bail!("Issued {} exceeds granted {}", i, granted),
			},
			(None, None) => (0, granted),
		};

		Ok(Self {
			date,
			granted,
			withheld,
			issued,
			unit_price,
		})
	}

	/// The number of shares that enter the pool
	pub fn shares(&self) -> Quant {
		Quant::from_i128(self.issued as i128)
	}
}
