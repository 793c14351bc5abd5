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
use thiserror::Error;

/// Everything that can stop a cost basis run. None of these are retried:
/// the input is static, so the same input fails the same way every time.
#[derive(Debug, Error)]
pub enum PoolError {
	#[error("no exchange rate interval covers {date}")]
	MissingFxRate { date: Date },

	#[error(
		"{count} exchange rate intervals cover {date}; the rate table overlaps"
	)]
	AmbiguousFxRate { date: Date, count: usize },

	#[error(
		"unrecognized sales table: no {role} column (tried {}); found headers [{}]",
		.expected.join(", "),
		.found.join(", ")
	)]
	UnrecognizedSalesSchema {
		role: &'static str,
		expected: Vec<String>,
		found: Vec<String>,
	},

	#[error(
		"cannot sell {requested} shares on {date}: only {held} held in the pool"
	)]
	OverdrawnPool {
		date: Date,
		requested: Quant,
		held: Quant,
	},

	#[error("{table} table has no {column} column")]
	MissingColumn {
		table: &'static str,
		column: &'static str,
	},

	#[error("{table} table, line {line}: {reason}")]
	InvalidRecord {
		table: &'static str,
		line: u64,
		reason: String,
	},

	#[error(transparent)]
	Csv(#[from] csv::Error),
}
