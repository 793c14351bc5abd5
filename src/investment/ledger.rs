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
use crate::investment::event::{Direction, Event};
use crate::investment::pool::{Pool, SETTLE_PRECISION};
use crate::util::date::Date;
use crate::util::quant::Quant;
use log::{debug, info};

/// One event as the pool saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasisRow {
	pub date: Date,
	pub direction: Direction,
	pub shares: Quant,
	pub unit_price_usd: Quant,
	pub fx_rate: Quant,

	/// The pool average after the event. None only after a sale that
	/// emptied the pool.
	pub avg_cost_gbp: Option<Quant>,

	/// Present on sells only
	pub disposal: Option<Disposal>,

	pub pool_shares: Quant,
	pub pool_cost_gbp: Quant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disposal {
	pub cost_removed_gbp: Quant,
	pub proceeds_gbp: Quant,
	pub gain_gbp: Quant,
}

/// Weighted averages over buys only, and the sum of all realised gains.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BasisSummary {
	pub buy_count: usize,
	pub shares_acquired: Quant,
	pub avg_cost_usd: Option<Quant>,
	pub avg_cost_gbp: Option<Quant>,
	pub realized_gain_gbp: Quant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasisReport {
	pub rows: Vec<BasisRow>,
	pub summary: BasisSummary,
}

/// Walks an ordered event stream through a single pool. The running buy
/// totals are kept apart from the pool, since sells drain the pool but
/// have no bearing on what was paid on the way in.
#[derive(Debug, Default)]
pub struct PoolLedger {
	pool: Pool,
	buy_count: usize,
	shares_acquired: Quant,
	cost_usd: Quant,
	cost_gbp: Quant,
	realized_gain_gbp: Quant,
}

impl PoolLedger {
	pub fn new() -> Self {
		Self {
			pool: Pool::new(),
			..Self::default()
		}
	}

	/// Folds every event in order. Stops at the first sale the pool cannot
	/// cover; no partial report comes back.
	pub fn fold(events: &[Event]) -> Result<BasisReport, PoolError> {
		let mut ledger = Self::new();
		let rows = events
			.iter()
			.map(|e| ledger.apply(e))
			.collect::<Result<Vec<BasisRow>, PoolError>>()?;

		info!(
			"Folded {} events; {} shares left in the pool",
			rows.len(),
			ledger.pool.shares()
		);

		Ok(BasisReport {
			rows,
			summary: ledger.summary(),
		})
	}

	pub fn apply(&mut self, event: &Event) -> Result<BasisRow, PoolError> {
		let value_gbp = event.value_gbp().rounded(SETTLE_PRECISION);

		let disposal = match event.direction {
			Direction::Buy => {
				self.pool.acquire(event.shares, value_gbp);
				self.buy_count += 1;
				self.shares_acquired += event.shares;
				self.cost_usd += event.value_usd();
				self.cost_gbp += value_gbp;
				None
			},
			Direction::Sell => {
				let cost_removed_gbp =
					self.pool.dispose(&event.date, event.shares)?;
				let gain_gbp = value_gbp - cost_removed_gbp;
				self.realized_gain_gbp += gain_gbp;
				Some(Disposal {
					cost_removed_gbp,
					proceeds_gbp: value_gbp,
					gain_gbp,
				})
			},
		};

		debug!(
			"[{}]: {} {} -> pool {} shares, cost {}",
			event.date,
			event.direction,
			event.shares,
			self.pool.shares(),
			self.pool.cost_gbp()
		);

		Ok(BasisRow {
			date: event.date,
			direction: event.direction,
			shares: event.shares,
			unit_price_usd: event.unit_price,
			fx_rate: event.fx_rate,
			avg_cost_gbp: self.pool.avg_cost_gbp(),
			disposal,
			pool_shares: self.pool.shares(),
			pool_cost_gbp: self.pool.cost_gbp(),
		})
	}

	pub fn summary(&self) -> BasisSummary {
		let average = |total: Quant| {
			if self.shares_acquired.is_positive() {
				Some((total / self.shares_acquired).rounded(SETTLE_PRECISION))
			} else {
				None
			}
		};

		BasisSummary {
			buy_count: self.buy_count,
			shares_acquired: self.shares_acquired,
			avg_cost_usd: average(self.cost_usd),
			avg_cost_gbp: average(self.cost_gbp),
			realized_gain_gbp: self.realized_gain_gbp,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn q(s: &str) -> Quant {
		Quant::from_str(s).unwrap()
	}

	fn event(
		date: &str,
		direction: Direction,
		shares: &str,
		price: &str,
		rate: &str,
	) -> Event {
		Event {
			date: Date::from_str(date).unwrap(),
			direction,
			shares: q(shares),
			unit_price: q(price),
			fx_rate: q(rate),
		}
	}

	fn scenario() -> Vec<Event> {
		vec![
			event("2024-01-10", Direction::Buy, "100", "10", "1.25"),
			event("2024-01-20", Direction::Buy, "50", "16", "1.25"),
			event("2024-02-05", Direction::Sell, "60", "20", "1.6"),
		]
	}

	#[test]
	fn test_scenario_rows() {
		let report = PoolLedger::fold(&scenario()).unwrap();
		let rows = &report.rows;

		assert_eq!(rows[0].avg_cost_gbp, Some(q("8")));
		assert_eq!(rows[0].pool_shares, q("100"));
		assert_eq!(rows[0].disposal, None);

		assert_eq!(rows[1].avg_cost_gbp, Some(q("9.6")));
		assert_eq!(rows[1].pool_cost_gbp, q("1440"));

		let sell = &rows[2];
		assert_eq!(sell.avg_cost_gbp, Some(q("9.6")));
		assert_eq!(sell.pool_shares, q("90"));
		assert_eq!(sell.pool_cost_gbp, q("864"));
		assert_eq!(
			sell.disposal,
			Some(Disposal {
				cost_removed_gbp: q("576"),
				proceeds_gbp: q("750"),
				gain_gbp: q("174"),
			})
		);
	}

	#[test]
	fn test_scenario_summary_counts_buys_only() {
		let summary = PoolLedger::fold(&scenario()).unwrap().summary;

		assert_eq!(summary.buy_count, 2);
		assert_eq!(summary.shares_acquired, q("150"));
		assert_eq!(summary.avg_cost_usd, Some(q("12")));
		assert_eq!(summary.avg_cost_gbp, Some(q("9.6")));
		assert_eq!(summary.realized_gain_gbp, q("174"));
	}

	#[test]
	fn test_sale_does_not_touch_summary_averages() {
		let buys_only = PoolLedger::fold(&scenario()[..2]).unwrap().summary;
		let with_sale = PoolLedger::fold(&scenario()).unwrap().summary;

		assert_eq!(buys_only.avg_cost_usd, with_sale.avg_cost_usd);
		assert_eq!(buys_only.avg_cost_gbp, with_sale.avg_cost_gbp);
	}

	#[test]
	fn test_depletion_and_fresh_average() {
		let events = vec![
			event("2024-03-01", Direction::Buy, "100", "10", "1.25"),
			event("2024-03-01", Direction::Sell, "100", "10", "1.25"),
			event("2024-03-15", Direction::Buy, "40", "12.5", "1.25"),
		];
		let report = PoolLedger::fold(&events).unwrap();

		let emptied = &report.rows[1];
		assert_eq!(emptied.avg_cost_gbp, None);
		assert!(emptied.pool_shares.is_zero());
		assert!(emptied.pool_cost_gbp.is_zero());
		let disposal = emptied.disposal.clone().unwrap();
		assert_eq!(disposal.cost_removed_gbp, q("800"));
		assert!(disposal.gain_gbp.is_zero());

		// the new average is the new buy's own per-share cost
		assert_eq!(report.rows[2].avg_cost_gbp, Some(q("10")));
		assert_eq!(report.summary.shares_acquired, q("140"));
	}

	#[test]
	fn test_overdraw_aborts_fold() {
		let mut events = scenario();
		events.push(event("2024-02-06", Direction::Sell, "200", "20", "1.6"));

		match PoolLedger::fold(&events) {
			Err(PoolError::OverdrawnPool {
				requested, held, ..
			}) => {
				assert_eq!(requested, q("200"));
				assert_eq!(held, q("90"));
			},
			other => panic!("expected OverdrawnPool, got {:?}", other),
		}
	}

	#[test]
	fn test_loss_is_negative() {
		let events = vec![
			event("2024-01-10", Direction::Buy, "10", "20", "1.25"),
			event("2024-01-11", Direction::Sell, "5", "10", "1.25"),
		];
		let report = PoolLedger::fold(&events).unwrap();

		let disposal = report.rows[1].disposal.clone().unwrap();
		assert_eq!(disposal.gain_gbp, q("-40"));
		assert_eq!(report.summary.realized_gain_gbp, q("-40"));
	}

	#[test]
	fn test_no_buys_means_no_summary_average() {
		let summary = PoolLedger::fold(&[]).unwrap().summary;
		assert_eq!(summary.buy_count, 0);
		assert_eq!(summary.avg_cost_usd, None);
		assert_eq!(summary.avg_cost_gbp, None);
	}
}
