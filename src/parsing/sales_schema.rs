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
use crate::config::config_file::SalesConfig;
use crate::error::PoolError;
use crate::util::amount::Currency;

const DATE_COLUMNS: &[&str] = &["date", "sale date", "transaction date"];

const SHARE_COLUMNS: &[&str] =
	&["shares", "quantity", "units", "issued", "shares sold", "qty"];

const USD_PRICE_COLUMNS: &[&str] = &[
	"price per share ($)",
	"priceusd",
	"price",
	"sale price",
	"sale price ($)",
];

const GBP_PRICE_COLUMNS: &[&str] = &[
	"price per share (gbp)",
	"price per share (£)",
	"pricegbp",
	"price",
	"sale price",
	"sale price (gbp)",
	"sale price (£)",
];

/// Brokers export sales under all sorts of headings. This holds, per column
/// role, the accepted names in the order they are tried. Names are compared
/// exactly after trimming and lower-casing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SalesSchema {
	pub currency: Currency,
	date: Vec<String>,
	shares: Vec<String>,
	price: Vec<String>,
}

/// Where each role was found in a particular header row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SalesColumns {
	pub date: usize,
	pub shares: usize,
	pub price: usize,
}

impl SalesSchema {
	pub fn new(currency: Currency) -> Self {
		let prices = match currency {
			Currency::Usd => USD_PRICE_COLUMNS,
			Currency::Gbp => GBP_PRICE_COLUMNS,
		};

		Self {
			currency,
			date: owned(DATE_COLUMNS),
			shares: owned(SHARE_COLUMNS),
			price: owned(prices),
		}
	}

	/// Built-in names plus any from config, which go first
	pub fn from_config(
		currency: Currency,
		config: Option<&SalesConfig>,
	) -> Self {
		let mut schema = Self::new(currency);

		if let Some(config) = config {
			prepend(&mut schema.date, &config.date_columns);
			prepend(&mut schema.shares, &config.share_columns);
			prepend(&mut schema.price, &config.price_columns);
		}

		schema
	}

	pub fn detect(
		&self,
		headers: &[String],
	) -> Result<SalesColumns, PoolError> {
		let normalized: Vec<String> =
			headers.iter().map(|h| normalize(h)).collect();

		let find = |role: &'static str, names: &[String]| {
			names
				.iter()
				.find_map(|name| normalized.iter().position(|h| h == name))
				.ok_or_else(|| PoolError::UnrecognizedSalesSchema {
					role,
					expected: names.to_vec(),
					found: headers
						.iter()
						.map(|h| normalize_display(h))
						.collect(),
				})
		};

		Ok(SalesColumns {
			date: find("date", &self.date)?,
			shares: find("shares", &self.shares)?,
			price: find("price", &self.price)?,
		})
	}
}

impl Default for SalesSchema {
	fn default() -> Self {
		Self::new(Currency::Usd)
	}
}

/// Lower-cased, trimmed, and without a byte-order mark
pub fn normalize(header: &str) -> String {
	normalize_display(header).to_lowercase()
}

fn normalize_display(header: &str) -> String {
	header.trim_start_matches('\u{feff}').trim().to_string()
}

fn owned(names: &[&str]) -> Vec<String> {
	names.iter().map(|n| n.to_string()).collect()
}

fn prepend(names: &mut Vec<String>, extra: &[String]) {
	let mut out: Vec<String> = extra.iter().map(|n| normalize(n)).collect();
	out.append(names);
	*names = out;
}
