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
use crate::util::date::Date;
use crate::util::quant::Quant;

/// Decimal places that pooled GBP figures are settled to after every step.
/// Exact fractions would otherwise pick up a new factor in the denominator
/// with every distinct exchange rate, and a few years of monthly releases
/// would overflow u128. Far below anything a report shows.
pub const SETTLE_PRECISION: u32 = 12;

/// A Section 104 holding: one number of shares, one pooled GBP cost, and
/// the average cost per share derived from them. Acquisitions blend into
/// the average; disposals leave at it.
///
/// Never goes negative; a disposal larger than the holding is refused.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pool {
	shares: Quant,
	cost_gbp: Quant,

	/// None whenever the pool is empty
	avg_cost_gbp: Option<Quant>,
}

impl Pool {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn shares(&self) -> Quant {
		self.shares
	}

	pub fn cost_gbp(&self) -> Quant {
		self.cost_gbp
	}

	pub fn avg_cost_gbp(&self) -> Option<Quant> {
		self.avg_cost_gbp
	}

	/// Adds shares at their total allowable cost, and recomputes the
	/// average from the new totals.
	pub fn acquire(&mut self, shares: Quant, cost_gbp: Quant) {
		self.shares += shares;
		self.cost_gbp += cost_gbp.rounded(SETTLE_PRECISION);

		if self.shares.is_positive() {
			self.avg_cost_gbp =
				Some((self.cost_gbp / self.shares).rounded(SETTLE_PRECISION));
		}
	}

	/// Removes shares at the current average cost and returns the cost
	/// removed. The average itself is untouched, except that emptying the
	/// pool clears it; in that case the whole remaining cost leaves with the
	/// shares so nothing is stranded by settling.
	pub fn dispose(
		&mut self,
		date: &Date,
		shares: Quant,
	) -> Result<Quant, PoolError> {
		if shares > self.shares {
			return Err(PoolError::OverdrawnPool {
				date: *date,
				requested: shares,
				held: self.shares,
			});
		}

		let removed = if shares == self.shares {
			self.cost_gbp
		} else {
			self.avg_cost_gbp
				.map(|avg| {
					let settled = shares.rounded(SETTLE_PRECISION);
					(settled * avg).rounded(SETTLE_PRECISION)
				})
				.unwrap_or_default()
		};

		self.shares -= shares;
		self.cost_gbp -= removed;

		if self.shares.is_zero() {
			self.cost_gbp = Quant::zero();
			self.avg_cost_gbp = None;
		}

		Ok(removed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn q(s: &str) -> Quant {
		Quant::from_str(s).unwrap()
	}

	fn d() -> Date {
		Date::from_str("2024-02-05").unwrap()
	}

	/// Buy 100 @ £8, buy 50 @ £12.80
	fn scenario_pool() -> Pool {
		let mut pool = Pool::new();
		pool.acquire(q("100"), q("800"));
		pool.acquire(q("50"), q("640"));
		pool
	}

	#[test]
	fn test_empty_pool_has_no_average() {
		let pool = Pool::new();
		assert!(pool.shares().is_zero());
		assert_eq!(pool.avg_cost_gbp(), None);
	}

	#[test]
	fn test_first_buy_sets_average() {
		let mut pool = Pool::new();
		pool.acquire(q("100"), q("800"));
		assert_eq!(pool.shares(), q("100"));
		assert_eq!(pool.avg_cost_gbp(), Some(q("8")));
	}

	#[test]
	fn test_buys_blend_into_average() {
		let pool = scenario_pool();
		assert_eq!(pool.shares(), q("150"));
		assert_eq!(pool.cost_gbp(), q("1440"));
		assert_eq!(pool.avg_cost_gbp(), Some(q("9.6")));
	}

	#[test]
	fn test_average_recomputed_from_totals_after_buy() {
		let mut pool = Pool::new();
		pool.acquire(q("3"), q("10"));
		pool.acquire(q("7"), q("31.4159"));

		let expected =
			(pool.cost_gbp() / pool.shares()).rounded(SETTLE_PRECISION);
		assert_eq!(pool.avg_cost_gbp(), Some(expected));
	}

	#[test]
	fn test_sell_removes_at_average() {
		let mut pool = scenario_pool();
		let removed = pool.dispose(&d(), q("60")).unwrap();

		assert_eq!(removed, q("576"));
		assert_eq!(pool.shares(), q("90"));
		assert_eq!(pool.cost_gbp(), q("864"));
		assert_eq!(pool.avg_cost_gbp(), Some(q("9.6")));
	}

	#[test]
	fn test_sell_never_moves_average() {
		let mut pool = Pool::new();
		pool.acquire(q("7"), q("100"));
		let before = pool.avg_cost_gbp();

		for _ in 0..6 {
			pool.dispose(&d(), q("1")).unwrap();
			assert_eq!(pool.avg_cost_gbp(), before);
		}
	}

	#[test]
	fn test_sell_with_float_artefact_share_count() {
		let mut pool = Pool::new();
		pool.acquire(q("100"), q("1000") / q("1.2734"));
		pool.acquire(q("37"), q("487.29") / q("1.2734"));
		assert_eq!(pool.avg_cost_gbp(), Some(q("8.525311282285")));

		let removed = pool.dispose(&d(), q("59.99999999999999")).unwrap();

		assert_eq!(removed, q("511.5186769371"));
		assert_eq!(pool.shares(), q("77.00000000000001"));
		assert_eq!(pool.cost_gbp(), q("656.448968735901"));
	}

	#[test]
	fn test_depletion_then_fresh_average() {
		let mut pool = scenario_pool();
		let removed = pool.dispose(&d(), q("150")).unwrap();

		assert_eq!(removed, q("1440"));
		assert!(pool.shares().is_zero());
		assert!(pool.cost_gbp().is_zero());
		assert_eq!(pool.avg_cost_gbp(), None);

		pool.acquire(q("40"), q("400"));
		assert_eq!(pool.avg_cost_gbp(), Some(q("10")));
	}

	#[test]
	fn test_depletion_after_uneven_average() {
		let mut pool = Pool::new();
		pool.acquire(q("3"), q("10"));
		pool.dispose(&d(), q("1")).unwrap();
		let removed = pool.dispose(&d(), q("2")).unwrap();

		assert!(pool.cost_gbp().is_zero());
		assert!(removed.is_positive());
	}

	#[test]
	fn test_overdraw_is_refused() {
		let mut pool = scenario_pool();
		pool.dispose(&d(), q("60")).unwrap();

		match pool.dispose(&d(), q("200")) {
			Err(PoolError::OverdrawnPool {
				requested, held, ..
			}) => {
				assert_eq!(requested, q("200"));
				assert_eq!(held, q("90"));
			},
			other => panic!("expected OverdrawnPool, got {:?}", other),
		}

		// a refused sale leaves the pool as it was
		assert_eq!(pool.shares(), q("90"));
		assert_eq!(pool.avg_cost_gbp(), Some(q("9.6")));
	}

	#[test]
	fn test_selling_from_empty_pool_is_refused() {
		let mut pool = Pool::new();
		assert!(matches!(
			pool.dispose(&d(), q("1")),
			Err(PoolError::OverdrawnPool { .. })
		));
	}

	#[test]
	fn test_zero_share_acquisition_keeps_empty_pool_empty() {
		let mut pool = Pool::new();
		pool.acquire(Quant::zero(), Quant::zero());
		assert_eq!(pool.avg_cost_gbp(), None);
	}

	#[test]
	fn test_shares_never_negative() {
		let mut pool = Pool::new();
		let steps = [
			("+", "10"),
			("-", "4"),
			("-", "6"),
			("+", "2.5"),
			("-", "2.5"),
		];

		for (op, n) in steps {
			match op {
				"+" => pool.acquire(q(n), q(n) * q("3.3")),
				_ => {
					pool.dispose(&d(), q(n)).unwrap();
				},
			}
			assert!(!pool.shares().is_negative());
		}
		assert!(pool.dispose(&d(), q("0.1")).is_err());
		assert!(!pool.shares().is_negative());
	}
}
