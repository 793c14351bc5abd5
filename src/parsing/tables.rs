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
use crate::error::PoolError;
use crate::fx::rate_interval::RateInterval;
use crate::fx::rate_table::FxRateTable;
use crate::investment::release::Release;
use crate::investment::sale::Sale;
use crate::parsing::sales_schema::{normalize, SalesSchema};
use crate::util::amount::Amount;
use crate::util::date::Date;
use crate::util::quant::Quant;
use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use log::{debug, info};

const RELEASES: &str = "releases";
const RATES: &str = "exchange rate";
const SALES: &str = "sales";

/// Reads a releases table: one row per vesting event.
pub fn load_releases(text: &str) -> Result<Vec<Release>, PoolError> {
	let mut rdr = reader(text);
	let headers = header_names(&mut rdr)?;

	let date =
		require(&headers, RELEASES, "date", &["release date", "date"])?;
	let granted = require(&headers, RELEASES, "granted", &["granted"])?;
	let price = require(
		&headers,
		RELEASES,
		"price per share ($)",
		&["price per share ($)"],
	)?;
	let withheld = find(&headers, &["withheld", "sold"]);
	let issued = find(&headers, &["issued"]);

	let mut out = Vec::new();
	for result in rdr.records() {
		let record = result?;
		if is_blank(&record) {
			continue;
		}
		let row = Row::new(&record, RELEASES);

		let granted_count = row
			.count(Some(granted))?
			.ok_or_else(|| row.invalid("no granted count".to_string()))?;

		let release = Release::new(
			row.date(date)?,
			granted_count,
			row.count(withheld)?,
			row.count(issued)?,
			row.number(price)?,
		)
		.map_err(|e| row.invalid(e.to_string()))?;

		out.push(release);
	}

	info!("Loaded {} releases", out.len());
	Ok(out)
}

/// Reads one exchange rate table. Rows for other currencies are dropped
/// when the table has a currency code column, so the monthly HMRC file for
/// every currency can be given as it is.
pub fn load_rates(
	text: &str,
	currency_code: &str,
) -> Result<FxRateTable, PoolError> {
	let mut rdr = reader(text);
	let headers = header_names(&mut rdr)?;

	let start = require(&headers, RATES, "start date", &["start date"])?;
	let end = require(&headers, RATES, "end date", &["end date"])?;
	let rate = headers
		.iter()
		.position(|h| h.starts_with("currency units per"))
		.ok_or(PoolError::MissingColumn {
			table: RATES,
			column: "currency units per £1",
		})?;
	let code = find(&headers, &["currency code"]);

	let mut table = FxRateTable::new();
	let mut skipped = 0;
	for result in rdr.records() {
		let record = result?;
		if is_blank(&record) {
			continue;
		}
		let row = Row::new(&record, RATES);

		if let Some(code) = code {
			if !row.cell(code).eq_ignore_ascii_case(currency_code) {
				skipped += 1;
				continue;
			}
		}

		let interval = RateInterval::new(
			row.rate_date(start)?,
			row.rate_date(end)?,
			row.number(rate)?,
		)
		.map_err(|e| row.invalid(e.to_string()))?;

		table.add_interval(interval);
	}

	if skipped > 0 {
		debug!("Skipped {} rate rows not in {}", skipped, currency_code);
	}
	info!("Loaded {} {} rate intervals", table.len(), currency_code);
	Ok(table)
}

/// Reads a sales table, finding its columns by name through the schema.
pub fn load_sales(
	text: &str,
	schema: &SalesSchema,
) -> Result<Vec<Sale>, PoolError> {
	let mut rdr = reader(text);
	let headers: Vec<String> =
		rdr.headers()?.iter().map(|h| h.to_string()).collect();
	let columns = schema.detect(&headers)?;

	let mut out = Vec::new();
	for result in rdr.records() {
		let record = result?;
		if is_blank(&record) {
			continue;
		}
		let row = Row::new(&record, SALES);

		let price = Amount::new(row.number(columns.price)?, schema.currency);
		let sale = Sale::new(
			row.date(columns.date)?,
			row.number(columns.shares)?,
			price,
		)
		.map_err(|e| row.invalid(e.to_string()))?;

		out.push(sale);
	}

	info!("Loaded {} sales", out.len());
	Ok(out)
}

/// Parses a money or share cell. Currency symbols, thousands separators
/// and spaces are dropped; an amount in parentheses is negative.
pub fn parse_number(cell: &str) -> Option<Quant> {
	let cleaned: String = cell
		.chars()
		.filter(|c| !matches!(*c, '$' | '£' | ',' | ' '))
		.collect();

	let (negative, digits) =
		match cleaned.strip_prefix('(').and_then(|c| c.strip_suffix(')')) {
			Some(inner) => (true, inner),
			None => (false, cleaned.as_str()),
		};

	let value = Quant::from_str(digits).ok()?;
	Some(if negative { -value } else { value })
}

fn reader(text: &str) -> Reader<&[u8]> {
	ReaderBuilder::new()
		.trim(Trim::All)
		.flexible(true)
		.from_reader(text.trim_start_matches('\u{feff}').as_bytes())
}

fn header_names(rdr: &mut Reader<&[u8]>) -> Result<Vec<String>, PoolError> {
	Ok(rdr.headers()?.iter().map(normalize).collect())
}

fn find(headers: &[String], names: &[&str]) -> Option<usize> {
	names
		.iter()
		.find_map(|name| headers.iter().position(|h| h == name))
}

fn require(
	headers: &[String],
	table: &'static str,
	column: &'static str,
	names: &[&str],
) -> Result<usize, PoolError> {
	find(headers, names).ok_or(PoolError::MissingColumn { table, column })
}

fn is_blank(record: &StringRecord) -> bool {
	record.iter().all(|cell| cell.is_empty())
}

/// One data row, with enough context to say where a bad cell came from
struct Row<'a> {
	record: &'a StringRecord,
	table: &'static str,
	line: u64,
}

impl<'a> Row<'a> {
	fn new(record: &'a StringRecord, table: &'static str) -> Self {
		let line = record.position().map(|p| p.line()).unwrap_or(0);
		Self {
			record,
			table,
			line,
		}
	}

	/// Short rows are allowed; missing trailing cells read as empty.
	fn cell(&self, index: usize) -> &str {
		self.record.get(index).unwrap_or("")
	}

	fn invalid(&self, reason: String) -> PoolError {
		PoolError::InvalidRecord {
			table: self.table,
			line: self.line,
			reason,
		}
	}

	fn date(&self, index: usize) -> Result<Date, PoolError> {
		Date::from_str(self.cell(index))
			.map_err(|e| self.invalid(e.to_string()))
	}

	/// HMRC tables are day first; ISO dates are taken too.
	fn rate_date(&self, index: usize) -> Result<Date, PoolError> {
		let cell = self.cell(index);
		Date::from_dmy(cell)
			.or_else(|_| Date::from_str(cell))
			.map_err(|e| self.invalid(e.to_string()))
	}

	fn number(&self, index: usize) -> Result<Quant, PoolError> {
		let cell = self.cell(index);
		parse_number(cell)
			.ok_or_else(|| self.invalid(format!("not a number: {:?}", cell)))
	}

	/// A whole share count from an optional column. An absent column or an
	/// empty cell both give None.
	fn count(&self, index: Option<usize>) -> Result<Option<u64>, PoolError> {
		let cell = match index {
			Some(i) => self.cell(i),
			None => return Ok(None),
		};
		if cell.is_empty() {
			return Ok(None);
		}

		let cleaned: String = cell.chars().filter(|c| *c != ',').collect();
		cleaned.parse::<u64>().map(Some).map_err(|_| {
			self.invalid(format!("not a whole share count: {:?}", cell))
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::util::amount::Currency;

	fn q(s: &str) -> Quant {
		Quant::from_str(s).unwrap()
	}

	fn d(s: &str) -> Date {
		Date::from_str(s).unwrap()
	}

	#[test]
	fn test_parse_number() {
		assert_eq!(parse_number("12.50"), Some(q("12.5")));
		assert_eq!(parse_number("$1,234.5"), Some(q("1234.5")));
		assert_eq!(parse_number(" £ 7 "), Some(q("7")));
		assert_eq!(parse_number("(3.25)"), Some(q("-3.25")));
		assert_eq!(parse_number(""), None);
		assert_eq!(parse_number("n/a"), None);
	}

	#[test]
	fn test_load_releases() {
		let text = "\
Release Date,Granted,Withheld,Issued,Price per share ($)
2024-01-10,180,80,100,$10.00

2024/01/20,90,40,,16.00
";
		let releases = load_releases(text).unwrap();

		assert_eq!(releases.len(), 2);
		assert_eq!(releases[0].date, d("2024-01-10"));
		assert_eq!(releases[0].issued, 100);
		assert_eq!(releases[0].unit_price, q("10"));
		assert_eq!(releases[1].date, d("2024-01-20"));
		assert_eq!(releases[1].issued, 50);
	}

	#[test]
	fn test_releases_accept_sold_for_withheld() {
		let text = "Date,Granted,Sold,Price per share ($)\n2024-01-10,10,4,1\n";
		let releases = load_releases(text).unwrap();
		assert_eq!(releases[0].withheld, 4);
		assert_eq!(releases[0].issued, 6);
	}

	#[test]
	fn test_releases_missing_price_column() {
		let text = "Release Date,Granted,Issued\n2024-01-10,10,10\n";
		match load_releases(text) {
			Err(PoolError::MissingColumn { column, .. }) => {
				assert_eq!(column, "price per share ($)")
			},
			other => panic!("expected MissingColumn, got {:?}", other),
		}
	}

	#[test]
	fn test_releases_bad_cell_names_line() {
		let text = "\
Release Date,Granted,Withheld,Issued,Price per share ($)
2024-01-10,180,80,100,10.00
2024-01-20,90,100,,16.00
";
		match load_releases(text) {
			Err(PoolError::InvalidRecord { table, line, .. }) => {
				assert_eq!(table, "releases");
				assert_eq!(line, 3);
			},
			other => panic!("expected InvalidRecord, got {:?}", other),
		}
	}

	#[test]
	fn test_releases_issued_over_granted_is_invalid() {
		let text = "\
Release Date,Granted,Withheld,Issued,Price per share ($)
2024-01-10,10,0,11,10.00
";
		match load_releases(text) {
			Err(PoolError::InvalidRecord { line, reason, .. }) => {
				assert_eq!(line, 2);
				assert!(reason.contains("Issued 11 exceeds granted 10"));
			},
			other => panic!("expected InvalidRecord, got {:?}", other),
		}
	}

	#[test]
	fn test_load_rates_hmrc_layout() {
		let text = "\
Country/Territories,Currency,Currency Code,Currency units per £1,Start Date,End Date
USA,Dollar,USD,1.2500,01/01/2024,31/01/2024
Eurozone,Euro,EUR,1.1700,01/01/2024,31/01/2024
";
		let table = load_rates(text, "USD").unwrap();
		assert_eq!(table.len(), 1);
		assert_eq!(table.resolve(&d("2024-01-31")).unwrap(), q("1.25"));
	}

	#[test]
	fn test_load_rates_without_code_column() {
		let text = "\
\u{feff}Start Date,End Date,Currency units per \u{a3}1
01/01/2024,31/01/2024,1.25
01/02/2024,29/02/2024,1.6
";
		let table = load_rates(text, "USD").unwrap();
		assert_eq!(table.len(), 2);
		assert_eq!(table.resolve(&d("2024-02-05")).unwrap(), q("1.6"));
	}

	#[test]
	fn test_load_rates_rejects_reversed_interval() {
		let text = "Start Date,End Date,Currency units per £1\n\
			31/01/2024,01/01/2024,1.25\n";
		assert!(matches!(
			load_rates(text, "USD"),
			Err(PoolError::InvalidRecord { line: 2, .. })
		));
	}

	#[test]
	fn test_load_rates_missing_rate_column() {
		let text = "Start Date,End Date,Rate\n01/01/2024,31/01/2024,1.25\n";
		assert!(matches!(
			load_rates(text, "USD"),
			Err(PoolError::MissingColumn { .. })
		));
	}

	#[test]
	fn test_load_sales() {
		let text = "Date,Quantity,Sale Price ($)\n2024-02-05,60,20.00\n";
		let sales = load_sales(text, &SalesSchema::default()).unwrap();

		assert_eq!(sales.len(), 1);
		assert_eq!(sales[0].shares, q("60"));
		assert_eq!(sales[0].unit_price, Amount::usd(q("20")));
	}

	#[test]
	fn test_load_sales_in_gbp() {
		let text = "Sale Date,Units,Sale Price (GBP)\n2024-02-05,10,12.50\n";
		let schema = SalesSchema::new(Currency::Gbp);
		let sales = load_sales(text, &schema).unwrap();
		assert_eq!(sales[0].unit_price, Amount::new(q("12.5"), Currency::Gbp));
	}

	#[test]
	fn test_load_sales_unrecognized() {
		let text = "When,Quantity,Sale Price ($)\n2024-02-05,60,20.00\n";
		assert!(matches!(
			load_sales(text, &SalesSchema::default()),
			Err(PoolError::UnrecognizedSalesSchema { .. })
		));
	}

	#[test]
	fn test_load_sales_rejects_negative_shares() {
		let text = "Date,Shares,Price\n2024-02-05,(5),20\n";
		assert!(matches!(
			load_sales(text, &SalesSchema::default()),
			Err(PoolError::InvalidRecord { .. })
		));
	}
}
