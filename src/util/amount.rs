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
use crate::util::quant::Quant;
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;

/// The two currencies this tool deals in: shares are priced in dollars and
/// gains are reported in pounds.
#[derive(
	Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
	Usd,
	Gbp,
}

impl fmt::Display for Currency {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Currency::Usd => write!(f, "USD"),
			Currency::Gbp => write!(f, "GBP"),
		}
	}
}

/// A quant value with a currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Amount {
	pub currency: Currency,
	pub value: Quant,
}

impl Amount {
	pub fn new(value: Quant, currency: Currency) -> Self {
		Self { value, currency }
	}

	pub fn usd(value: Quant) -> Self {
		Self::new(value, Currency::Usd)
	}

	/// Converts into `target` using a rate quoted as dollars per £1, the
	/// convention of HMRC's tables. Same-currency conversion is a no-op.
	pub fn convert(&self, target: Currency, usd_per_gbp: Quant) -> Amount {
		let value = match (self.currency, target) {
			(Currency::Usd, Currency::Gbp) => self.value / usd_per_gbp,
			(Currency::Gbp, Currency::Usd) => self.value * usd_per_gbp,
			_ => self.value,
		};
		Amount::new(value, target)
	}
}

impl fmt::Display for Amount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if f.alternate() {
			write!(f, "{:#} {}", self.value, self.currency)
		} else {
			write!(f, "{} {}", self.value, self.currency)
		}
	}
}
