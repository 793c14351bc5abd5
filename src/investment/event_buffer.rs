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
use crate::fx::rate_table::FxRateTable;
use crate::investment::event::{Direction, Event};
use crate::investment::release::Release;
use crate::investment::sale::Sale;
use crate::util::amount::{Amount, Currency};
use crate::util::date::Date;
use crate::util::quant::Quant;
use log::debug;

/// Stores releases and sales until they are all in, at which time this
/// merges them into one priced, chronological stream for the ledger.
#[derive(Debug, Default)]
pub struct EventBuffer {
	releases: Vec<Release>,
	sales: Vec<Sale>,
}

/// An event before its exchange rate is known
struct Unpriced {
	date: Date,
	direction: Direction,
	shares: Quant,
	unit_price: Amount,
}

impl EventBuffer {
	pub fn add_release(&mut self, release: Release) {
		debug!(
			"[{}]: {} granted, {} withheld, {} issued",
			release.date, release.granted, release.withheld, release.issued
		);
		self.releases.push(release);
	}

	pub fn add_sale(&mut self, sale: Sale) {
		self.sales.push(sale);
	}

	/// Orders all events by date. On the same date, all buys come before all
	/// sells, so a release and a sale of those same shares on one day do not
	/// trip the overdraw check; otherwise input order is kept. Each event is
	/// then priced: its rate is resolved, and sale prices given in GBP are
	/// carried into USD at that rate. Fails on the first date the rate table
	/// cannot price.
	pub fn merge(&self, rates: &FxRateTable) -> Result<Vec<Event>, PoolError> {
		let mut unpriced: Vec<Unpriced> = self
			.releases
			.iter()
			.map(|r| Unpriced {
				date: r.date,
				direction: Direction::Buy,
				shares: r.shares(),
				unit_price: Amount::usd(r.unit_price),
			})
			.chain(self.sales.iter().map(|s| Unpriced {
				date: s.date,
				direction: Direction::Sell,
				shares: s.shares,
				unit_price: s.unit_price,
			}))
			.collect();

		// stable, so input order survives among equals
		unpriced.sort_by(|a, b| {
			a.date.cmp(&b.date).then_with(|| a.direction.cmp(&b.direction))
		});

		unpriced
			.into_iter()
			.map(|u| {
				let fx_rate = rates.resolve(&u.date)?;
				let unit_price =
					u.unit_price.convert(Currency::Usd, fx_rate).value;

				debug!(
					"[{}]: {} {} @ {} (rate {})",
					u.date, u.direction, u.shares, u.unit_price, fx_rate
				);

				Ok(Event {
					date: u.date,
					direction: u.direction,
					shares: u.shares,
					unit_price,
					fx_rate,
				})
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fx::rate_interval::RateInterval;

	fn d(s: &str) -> Date {
		Date::from_str(s).unwrap()
	}

	fn q(s: &str) -> Quant {
		Quant::from_str(s).unwrap()
	}

	fn rates() -> FxRateTable {
		let mut table = FxRateTable::new();
		table.add_interval(
			RateInterval::new(d("2024-01-01"), d("2024-01-31"), q("1.25"))
				.unwrap(),
		);
		table.add_interval(
			RateInterval::new(d("2024-02-01"), d("2024-02-29"), q("1.6"))
				.unwrap(),
		);
		table
	}

	fn release(date: &str, issued: u64, price: &str) -> Release {
		Release::new(d(date), issued, Some(0), None, q(price)).unwrap()
	}

	fn sale(date: &str, shares: &str, price: Amount) -> Sale {
		Sale::new(d(date), q(shares), price).unwrap()
	}

	#[test]
	fn test_chronological_across_sources() {
		let mut buffer = EventBuffer::default();
		buffer.add_sale(sale("2024-02-05", "60", Amount::usd(q("20"))));
		buffer.add_release(release("2024-01-20", 50, "16"));
		buffer.add_release(release("2024-01-10", 100, "10"));

		let events = buffer.merge(&rates()).unwrap();
		let order: Vec<(String, Direction)> = events
			.iter()
			.map(|e| (e.date.to_string(), e.direction))
			.collect();

		assert_eq!(
			order,
			vec![
				("2024-01-10".to_string(), Direction::Buy),
				("2024-01-20".to_string(), Direction::Buy),
				("2024-02-05".to_string(), Direction::Sell),
			]
		);
	}

	#[test]
	fn test_same_day_buy_precedes_sell() {
		let mut buffer = EventBuffer::default();
		// sale added first; the buy must still come out first
		buffer.add_sale(sale("2024-01-15", "10", Amount::usd(q("11"))));
		buffer.add_release(release("2024-01-15", 10, "11"));

		let events = buffer.merge(&rates()).unwrap();
		assert_eq!(events[0].direction, Direction::Buy);
		assert_eq!(events[1].direction, Direction::Sell);
	}

	#[test]
	fn test_same_day_same_direction_keeps_input_order() {
		let mut buffer = EventBuffer::default();
		buffer.add_sale(sale("2024-01-15", "3", Amount::usd(q("11"))));
		buffer.add_sale(sale("2024-01-15", "7", Amount::usd(q("12"))));

		let events = buffer.merge(&rates()).unwrap();
		assert_eq!(events[0].shares, q("3"));
		assert_eq!(events[1].shares, q("7"));
	}

	#[test]
	fn test_rates_attached_per_event() {
		let mut buffer = EventBuffer::default();
		buffer.add_release(release("2024-01-31", 1, "10"));
		buffer.add_release(release("2024-02-01", 1, "10"));

		let events = buffer.merge(&rates()).unwrap();
		assert_eq!(events[0].fx_rate, q("1.25"));
		assert_eq!(events[1].fx_rate, q("1.6"));
	}

	#[test]
	fn test_gbp_sale_normalised_to_usd() {
		let mut buffer = EventBuffer::default();
		let price = Amount::new(q("12.50"), Currency::Gbp);
		buffer.add_sale(sale("2024-02-05", "10", price));

		let events = buffer.merge(&rates()).unwrap();
		assert_eq!(events[0].unit_price, q("20"));
		// and converting back gives the GBP price that was entered
		assert_eq!(events[0].value_gbp(), q("125"));
	}

	#[test]
	fn test_unpriced_date_fails_merge() {
		let mut buffer = EventBuffer::default();
		buffer.add_release(release("2024-01-10", 100, "10"));
		buffer.add_sale(sale("2024-03-01", "5", Amount::usd(q("20"))));

		match buffer.merge(&rates()) {
			Err(PoolError::MissingFxRate { date }) => {
				assert_eq!(date, d("2024-03-01"))
			},
			other => panic!("expected MissingFxRate, got {:?}", other),
		}
	}
}
