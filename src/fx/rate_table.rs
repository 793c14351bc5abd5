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
use crate::util::date::Date;
use crate::util::quant::Quant;

/// The GBP/USD rate table, as a set of inclusive date intervals. Intervals
/// are stored in the order given; nothing here relies on them being sorted,
/// because tables are often stitched together from several monthly files.
#[derive(Debug, Default)]
pub struct FxRateTable {
	intervals: Vec<RateInterval>,
}

impl FxRateTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_interval(&mut self, interval: RateInterval) {
		self.intervals.push(interval);
	}

	/// Takes over every interval of another table, as when rates come from
	/// several files.
	pub fn append(&mut self, mut other: FxRateTable) {
		self.intervals.append(&mut other.intervals);
	}

	pub fn len(&self) -> usize {
		self.intervals.len()
	}

	pub fn is_empty(&self) -> bool {
		self.intervals.is_empty()
	}

	/// Returns the rate of the one interval containing `date`. Scans the
	/// whole table, so overlapping intervals are caught rather than
	/// silently resolved in favour of whichever comes first.
	pub fn resolve(&self, date: &Date) -> Result<Quant, PoolError> {
		let mut matches = self.intervals.iter().filter(|i| i.contains(date));

		let found = match matches.next() {
			Some(interval) => interval,
			None => return Err(PoolError::MissingFxRate { date: *date }),
		};

		let extra = matches.count();
		if extra > 0 {
			return Err(PoolError::AmbiguousFxRate {
				date: *date,
				count: extra + 1,
			});
		}

		Ok(found.rate)
	}

	/// Pairs each interval, in start date order, with how many of the given
	/// dates fall inside it.
	pub fn usage<'a>(
		&self,
		dates: impl IntoIterator<Item = &'a Date>,
	) -> Vec<(&RateInterval, usize)> {
		let mut out: Vec<(&RateInterval, usize)> =
			self.intervals.iter().map(|i| (i, 0)).collect();

		for date in dates {
			for (interval, count) in out.iter_mut() {
				if interval.contains(date) {
					*count += 1;
				}
			}
		}

		out.sort_by(|a, b| {
			a.0.start.cmp(&b.0.start).then_with(|| a.0.end.cmp(&b.0.end))
		});
		out
	}
}
