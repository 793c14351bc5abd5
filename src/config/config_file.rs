/* Copyright © 2024-2025 Adam Train <adam@adamtrain.net>
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
use crate::reports::basis_reporter::Format;
use crate::util::amount::Currency;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	pub sales: Option<SalesConfig>,
	pub rates: Option<RatesConfig>,
	pub output: Option<OutputConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SalesConfig {
	/// Currency of the price column; the command line flag wins over this
	pub currency: Option<Currency>,

	/// Extra header names, tried before the built-in ones
	#[serde(default)]
	pub date_columns: Vec<String>,
	#[serde(default)]
	pub share_columns: Vec<String>,
	#[serde(default)]
	pub price_columns: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatesConfig {
	/// Rows of a multi-currency rate file to keep. Defaults to USD.
	pub currency_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
	pub format: Option<Format>,
	pub precision: Option<u32>,
}

impl Config {
	pub fn currency_code(&self) -> String {
		self.rates
			.as_ref()
			.and_then(|r| r.currency_code.clone())
			.unwrap_or_else(|| "USD".to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_config_is_default() {
		let config: Config = toml::from_str("").unwrap();
		assert!(config.sales.is_none());
		assert!(config.output.is_none());
		assert_eq!(config.currency_code(), "USD");
	}

	#[test]
	fn test_full_config() {
		let config: Config = toml::from_str(
			r#"
			[sales]
			currency = "gbp"
			date_columns = ["trade date"]
			price_columns = ["net price"]

			[rates]
			currency_code = "EUR"

			[output]
			format = "csv"
			precision = 2
			"#,
		)
		.unwrap();

		let sales = config.sales.as_ref().unwrap();
		assert_eq!(sales.currency, Some(Currency::Gbp));
		assert_eq!(sales.date_columns, vec!["trade date"]);
		assert!(sales.share_columns.is_empty());

		let output = config.output.as_ref().unwrap();
		assert_eq!(output.format, Some(Format::Csv));
		assert_eq!(output.precision, Some(2));

		assert_eq!(config.currency_code(), "EUR");
	}

	#[test]
	fn test_unknown_key_rejected() {
		let parsed = toml::from_str::<Config>("[output]\ncolour = true\n");
		assert!(parsed.is_err());
	}
}
