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

/// One row of a rate table: dollars per £1, valid on every day from `start`
/// to `end` inclusive. A value object not intended to have much
/// functionality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateInterval {
	pub start: Date,
	pub end: Date,
	pub rate: Quant,
}

impl RateInterval {
	pub fn new(start: Date, end: Date, rate: Quant) -> Result<Self, Error> {
		if start > end {
			bail!("Interval starts ({}) after it ends ({})", start, end)
		}
		if !rate.is_positive() {
			bail!("Exchange rate must be positive, got {}", rate)
		}

		Ok(Self { start, end, rate })
	}

	pub fn contains(&self, date: &Date) -> bool {
		&self.start <= date && date <= &self.end
	}
}
