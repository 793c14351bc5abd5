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

use anyhow::{anyhow, Error};
use chrono::NaiveDate;
use std::fmt;

/// A calendar day. Release confirmations and sales use ISO order, HMRC rate
/// files use day-first order; both end up here.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date(NaiveDate);

impl Date {
	/// Constructor to parse a string in the "YYYY-mm-dd" format. Slashes
	/// are accepted in place of dashes, as some spreadsheets export them.
	pub fn from_str(date_str: &str) -> Result<Date, Error> {
		let normalized = date_str.trim().replace('/', "-");
		NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
			.map(Date)
			.map_err(|e| {
				anyhow!("Invalid date {:?} (want YYYY-MM-DD): {}", date_str, e)
			})
	}

	/// Constructor for the "dd/mm/YYYY" format of HMRC rate tables
	pub fn from_dmy(date_str: &str) -> Result<Date, Error> {
		NaiveDate::parse_from_str(date_str.trim(), "%d/%m/%Y")
			.map(Date)
			.map_err(|e| {
				anyhow!("Invalid date {:?} (want DD/MM/YYYY): {}", date_str, e)
			})
	}
}

impl fmt::Display for Date {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.format("%Y-%m-%d"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_iso_date() {
		let date = Date::from_str("2024-11-15").unwrap();
		assert_eq!(date.to_string(), "2024-11-15");
	}

	#[test]
	fn test_unpadded_and_slashed() {
		assert_eq!(
			Date::from_str("2024-1-5").unwrap(),
			Date::from_str("2024-01-05").unwrap()
		);
		assert_eq!(
			Date::from_str("2024/01/05").unwrap(),
			Date::from_str("2024-01-05").unwrap()
		);
	}

	#[test]
	fn test_day_first() {
		let date = Date::from_dmy("31/01/2024").unwrap();
		assert_eq!(date, Date::from_str("2024-01-31").unwrap());
	}

	#[test]
	fn test_invalid_dates() {
		assert!(Date::from_str("2024-02-30").is_err());
		assert!(Date::from_str("2024-13-01").is_err());
		assert!(Date::from_str("15/11/2024").is_err());
		assert!(Date::from_dmy("2024-11-15").is_err());
		assert!(Date::from_dmy("31/04/2024").is_err());
	}

	#[test]
	fn test_leap_day() {
		assert!(Date::from_dmy("29/02/2024").is_ok());
		assert!(Date::from_dmy("29/02/2023").is_err());
	}

	#[test]
	fn test_ordering() {
		let a = Date::from_str("2023-12-31").unwrap();
		let b = Date::from_str("2024-01-01").unwrap();
		assert!(a < b);
	}
}
