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
use crate::investment::ledger::{BasisReport, BasisRow, BasisSummary};
use crate::reports::table::Table;
use crate::util::quant::Quant;
use anyhow::{anyhow, Error};
use clap::ValueEnum;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};

pub const COLUMNS: [&str; 11] = [
	"Type",
	"Release/Sale Date",
	"Shares",
	"Price per share ($)",
	"GBP/USD rate",
	"Avg cost per share (GBP)",
	"Cost removed (GBP)",
	"Proceeds (GBP)",
	"Gain/Loss (GBP)",
	"Pool shares",
	"Pool cost (GBP)",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
	Table,
	Csv,
	Json,
}

/// One output line. Every figure is already rounded and rendered, so the
/// three formats cannot disagree on a digit.
#[derive(Debug, Serialize)]
struct EventRecord {
	#[serde(rename = "type")]
	kind: String,
	date: Option<String>,
	shares: Option<String>,
	price_per_share_usd: Option<String>,
	fx_rate: Option<String>,
	avg_cost_gbp: Option<String>,
	cost_removed_gbp: Option<String>,
	proceeds_gbp: Option<String>,
	gain_gbp: Option<String>,
	pool_shares: Option<String>,
	pool_cost_gbp: Option<String>,
}

impl EventRecord {
	fn cells(self) -> Vec<String> {
		[
			Some(self.kind),
			self.date,
			self.shares,
			self.price_per_share_usd,
			self.fx_rate,
			self.avg_cost_gbp,
			self.cost_removed_gbp,
			self.proceeds_gbp,
			self.gain_gbp,
			self.pool_shares,
			self.pool_cost_gbp,
		]
		.into_iter()
		.map(Option::unwrap_or_default)
		.collect()
	}
}

#[derive(Debug, Serialize)]
struct SummaryRecord {
	buy_count: usize,
	shares_acquired: String,
	avg_cost_usd: Option<String>,
	avg_cost_gbp: Option<String>,
	realized_gain_gbp: String,
}

#[derive(Serialize)]
struct JsonReport {
	events: Vec<EventRecord>,
	summary: SummaryRecord,
}

#[derive(Serialize)]
struct JsonSummary {
	summary: SummaryRecord,
}

pub struct BasisReporter {
	report: BasisReport,

	/// Decimal places for money and rates; share counts print exactly
	precision: u32,
}

impl BasisReporter {
	pub fn new(report: BasisReport, precision: u32) -> Self {
		Self { report, precision }
	}

	/// The per-event report followed by the summary.
	pub fn render(&self, format: Format) -> Result<String, Error> {
		let summary = &self.report.summary;
		match format {
			Format::Table => {
				let mut table = Table::new(COLUMNS.len());
				table.add_header(COLUMNS.to_vec());
				table.add_separator();
				for row in &self.report.rows {
					table.add_row(self.event_record(row, true).cells());
				}
				table.right_align((2..COLUMNS.len()).collect());

				Ok(format!(
					"{}\n{}",
					table.render(),
					self.summary_block(summary)
				))
			},
			Format::Csv => {
				let mut records: Vec<EventRecord> = self
					.report
					.rows
					.iter()
					.map(|r| self.event_record(r, false))
					.collect();
				records.push(self.summary_line(summary));
				write_csv(records)
			},
			Format::Json => {
				let report = JsonReport {
					events: self
						.report
						.rows
						.iter()
						.map(|r| self.event_record(r, false))
						.collect(),
					summary: self.summary_record(summary, false),
				};
				Ok(serde_json::to_string_pretty(&report)? + "\n")
			},
		}
	}

	/// Only the summary, for when the per-event rows are not wanted.
	pub fn render_summary(&self, format: Format) -> Result<String, Error> {
		let summary = &self.report.summary;
		match format {
			Format::Table => Ok(self.summary_block(summary)),
			Format::Csv => write_csv(vec![self.summary_line(summary)]),
			Format::Json => {
				let json = JsonSummary {
					summary: self.summary_record(summary, false),
				};
				Ok(serde_json::to_string_pretty(&json)? + "\n")
			},
		}
	}

	fn money(&self, value: Quant, grouped: bool) -> String {
		let value = value.rounded(self.precision);
		if grouped {
			format!("{:#}", value)
		} else {
			value.to_string()
		}
	}

	fn event_record(&self, row: &BasisRow, grouped: bool) -> EventRecord {
		let money = |q: Quant| self.money(q, grouped);

		EventRecord {
			kind: row.direction.to_string(),
			date: Some(row.date.to_string()),
			shares: Some(row.shares.to_string()),
			price_per_share_usd: Some(money(row.unit_price_usd)),
			fx_rate: Some(money(row.fx_rate)),
			avg_cost_gbp: row.avg_cost_gbp.map(money),
			cost_removed_gbp: row
				.disposal
				.as_ref()
				.map(|d| money(d.cost_removed_gbp)),
			proceeds_gbp: row.disposal.as_ref().map(|d| money(d.proceeds_gbp)),
			gain_gbp: row.disposal.as_ref().map(|d| money(d.gain_gbp)),
			pool_shares: Some(row.pool_shares.to_string()),
			pool_cost_gbp: Some(money(row.pool_cost_gbp)),
		}
	}

	/// The summary squeezed into the event columns, for CSV
	fn summary_line(&self, summary: &BasisSummary) -> EventRecord {
		let record = self.summary_record(summary, false);

		EventRecord {
			kind: "Summary".to_string(),
			date: None,
			shares: Some(record.shares_acquired),
			price_per_share_usd: record.avg_cost_usd,
			fx_rate: None,
			avg_cost_gbp: record.avg_cost_gbp,
			cost_removed_gbp: None,
			proceeds_gbp: None,
			gain_gbp: Some(record.realized_gain_gbp),
			pool_shares: None,
			pool_cost_gbp: None,
		}
	}

	fn summary_record(
		&self,
		summary: &BasisSummary,
		grouped: bool,
	) -> SummaryRecord {
		let money = |q: Quant| self.money(q, grouped);

		SummaryRecord {
			buy_count: summary.buy_count,
			shares_acquired: summary.shares_acquired.to_string(),
			avg_cost_usd: summary.avg_cost_usd.map(money),
			avg_cost_gbp: summary.avg_cost_gbp.map(money),
			realized_gain_gbp: money(summary.realized_gain_gbp),
		}
	}

	fn summary_block(&self, summary: &BasisSummary) -> String {
		let record = self.summary_record(summary, true);
		let none = || "n/a".to_string();

		let mut table = Table::new(2);
		table.add_row(vec!["Buys".into(), record.buy_count.to_string()]);
		table.add_row(vec!["Shares acquired".into(), record.shares_acquired]);
		table.add_row(vec![
			"Avg cost per share (USD)".into(),
			record.avg_cost_usd.unwrap_or_else(none),
		]);
		table.add_row(vec![
			"Avg cost per share (GBP)".into(),
			record.avg_cost_gbp.unwrap_or_else(none),
		]);
		table.add_row(vec![
			"Realised gain/loss (GBP)".into(),
			record.realized_gain_gbp,
		]);
		table.right_align(vec![1]);
		table.render()
	}
}

fn write_csv(records: Vec<EventRecord>) -> Result<String, Error> {
	let mut wtr = WriterBuilder::new().has_headers(false).from_writer(vec![]);

	wtr.write_record(COLUMNS)?;
	for record in records {
		wtr.serialize(record)?;
	}

	let bytes = wtr.into_inner().map_err(|e| anyhow!("{}", e))?;
	Ok(String::from_utf8(bytes)?)
}
