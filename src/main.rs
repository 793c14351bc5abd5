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
use crate::config::config_file::Config;
use crate::fx::rate_table::FxRateTable;
use crate::investment::event_buffer::EventBuffer;
use crate::investment::ledger::PoolLedger;
use crate::parsing::filesystem::Filesystem;
use crate::parsing::sales_schema::SalesSchema;
use crate::parsing::tables;
use crate::reports::basis_reporter::{BasisReporter, Format};
use crate::reports::rate_reporter::RateReporter;
use crate::util::amount::Currency;
use anyhow::{bail, Context, Error};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;

mod config;
mod error;
mod fx;
mod investment;
mod parsing;
mod reports;
mod util;

#[derive(Parser)]
#[command(
	name = "poolbasis",
	version = "0.1",
	about = "Section 104 pooled cost basis for RSU releases and sales"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// The command to execute
	command: Directive,

	// -----------
	// -- FLAGS --
	// -----------
	/// Releases table (CSV)
	#[arg(short, long)]
	releases: String,

	/// Exchange rate table (CSV); repeat for several files
	#[arg(short = 'x', long = "rates", required = true)]
	rates: Vec<String>,

	/// Sales table (CSV)
	#[arg(short, long)]
	sales: Option<String>,

	/// Currency of the sales price column (default: usd)
	#[arg(long, value_enum)]
	sales_currency: Option<Currency>,

	/// Custom config file location (default: ~/.config/poolbasis/config.toml)
	#[arg(long)]
	config: Option<String>,

	/// Output format (default: table)
	#[arg(short, long, value_enum)]
	format: Option<Format>,

	/// Decimal places to show for money and rates (default: 4)
	#[arg(short, long)]
	precision: Option<u32>,
}

impl Cli {
	/// Pooled figures are only carried to this many places, so printing
	/// more would just show zeroes
	const MAX_PRECISION: u32 = 12;

	const DEFAULT_PRECISION: u32 = 4;

	/// Extra validations on top of what clap does
	fn validate(&self) -> Result<(), Error> {
		check_precision(self.precision)
	}
}

#[derive(ValueEnum, Clone, PartialEq)]
enum Directive {
	Basis,   // per-event report and summary
	Summary, // summary only
	Rates,   // exchange rate intervals and how many events each priced
	Check,   // run everything, report nothing but errors
}

fn main() -> Result<(), Error> {
	env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
		.init();

	let args = Cli::parse();
	args.validate()?;

	let mut fs = Filesystem::new();
	let config = fs.get_config(args.config.as_ref())?;

	let output = config.output.as_ref();
	let format = args
		.format
		.or(output.and_then(|o| o.format))
		.unwrap_or(Format::Table);
	let precision = args.precision.or(output.and_then(|o| o.precision));
	check_precision(precision)?;
	let precision = precision.unwrap_or(Cli::DEFAULT_PRECISION);

	let rates = load_rates(&mut fs, &args.rates, &config)?;
	let buffer = load_events(&mut fs, &args, &config)?;
	let events = buffer.merge(&rates)?;

	match args.command {
		Directive::Basis => {
			let report = PoolLedger::fold(&events)?;
			let reporter = BasisReporter::new(report, precision);
			print!("{}", reporter.render(format)?);
		},
		Directive::Summary => {
			let report = PoolLedger::fold(&events)?;
			let reporter = BasisReporter::new(report, precision);
			print!("{}", reporter.render_summary(format)?);
		},
		Directive::Rates => {
			let dates: Vec<_> = events.iter().map(|e| e.date).collect();
			let reporter = RateReporter::new(rates.usage(&dates), precision);
			print!("{}", reporter.render());
		},
		Directive::Check => {
			PoolLedger::fold(&events)?;
			println!("Done");
		},
	}

	Ok(())
}

fn check_precision(precision: Option<u32>) -> Result<(), Error> {
	if let Some(prec) = precision {
		if prec > Cli::MAX_PRECISION {
			bail!("Maximum precision is {}", Cli::MAX_PRECISION);
		}
	}

	Ok(())
}

/// Reads every rate file into one table.
fn load_rates(
	fs: &mut Filesystem,
	paths: &[String],
	config: &Config,
) -> Result<FxRateTable, Error> {
	let currency_code = config.currency_code();
	let mut rates = FxRateTable::new();

	for path in paths {
		let text = fs.read_text(path)?;
		let table = tables::load_rates(&text, &currency_code)
			.with_context(|| format!("while reading {}", path))?;
		rates.append(table);
	}

	if rates.is_empty() {
		bail!(
			"No {} exchange rates found in {}",
			currency_code,
			paths.join(", ")
		);
	}

	info!("{} rate intervals in total", rates.len());
	Ok(rates)
}

fn load_events(
	fs: &mut Filesystem,
	args: &Cli,
	config: &Config,
) -> Result<EventBuffer, Error> {
	let mut buffer = EventBuffer::default();

	let text = fs.read_text(&args.releases)?;
	let releases = tables::load_releases(&text)
		.with_context(|| format!("while reading {}", args.releases))?;
	for release in releases {
		buffer.add_release(release);
	}

	if let Some(path) = &args.sales {
		let sales_config = config.sales.as_ref();
		let currency = args
			.sales_currency
			.or(sales_config.and_then(|s| s.currency))
			.unwrap_or(Currency::Usd);
		let schema = SalesSchema::from_config(currency, sales_config);

		let text = fs.read_text(path)?;
		let sales = tables::load_sales(&text, &schema)
			.with_context(|| format!("while reading {}", path))?;
		for sale in sales {
			buffer.add_sale(sale);
		}
	}

	Ok(buffer)
}
