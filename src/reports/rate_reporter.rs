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
use crate::fx::rate_interval::RateInterval;
use crate::reports::table::Table;

pub struct RateReporter {
	/// Intervals in start order, each with the number of events it priced
	usage: Vec<(RateInterval, usize)>,
	precision: u32,
}

impl RateReporter {
	pub fn new(usage: Vec<(&RateInterval, usize)>, precision: u32) -> Self {
		Self {
			usage: usage.into_iter().map(|(i, n)| (i.clone(), n)).collect(),
			precision,
		}
	}

	pub fn render(&self) -> String {
		let mut table = Table::new(4);

		table.add_header(vec!["Start", "End", "Rate", "Events"]);
		table.add_separator();

		for (interval, count) in &self.usage {
			table.add_row(vec![
				interval.start.to_string(),
				interval.end.to_string(),
				interval.rate.rounded(self.precision).to_string(),
				count.to_string(),
			]);
		}

		table.right_align(vec![2, 3]);
		table.render()
	}
}
