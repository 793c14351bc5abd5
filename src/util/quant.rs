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
use anyhow::{bail, Error};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Largest number of decimal places accepted when parsing. Anything beyond
/// this is noise in a price or rate, and would crowd the u128 range.
const MAX_PARSE_PRECISION: u32 = 18;

/// A rational number backed by a fraction of u128s. Share counts, prices
/// and exchange rates all parse into this, so pool arithmetic never picks up
/// the drift that binary floats would introduce into an average cost.
///
/// Always kept in lowest terms; zero is always 0/1 and never negative.
#[derive(Clone, Copy, Debug)]
pub struct Quant {
	numerator: u128,
	denominator: u128,
	is_negative: bool,

	/// How many decimal places to render when printed. Has no effect on the
	/// underlying fraction; digits past this are truncated, so round first.
	render_precision: u32,
}

impl Default for Quant {
	fn default() -> Self {
		Self::zero()
	}
}

impl Quant {
	pub fn zero() -> Self {
		Self {
			numerator: 0,
			denominator: 1,
			is_negative: false,
			render_precision: 0,
		}
	}

	pub fn from_i128(amount: i128) -> Self {
		Self {
			numerator: amount.unsigned_abs(),
			denominator: 1,
			is_negative: amount < 0,
			render_precision: 0,
		}
	}

	/// Parses a plain decimal such as "12", "-0.5" or ".25". Currency
	/// symbols and thousands separators must already be stripped.
	pub fn from_str(input: &str) -> Result<Self, Error> {
		let is_negative = input.starts_with('-');
		let unsigned = input.trim_start_matches('-');

		if unsigned.is_empty()
			|| !unsigned.chars().all(|c| c.is_ascii_digit() || c == '.')
		{
			bail!("Invalid decimal: {:?}", input);
		}

		let (whole, fraction) = match unsigned.split_once('.') {
			Some((w, f)) => (w, f),
			None => (unsigned, ""),
		};
		if fraction.contains('.') || (whole.is_empty() && fraction.is_empty())
		{
			bail!("Invalid decimal: {:?}", input);
		}

		let precision = fraction.len() as u32;
		if precision > MAX_PARSE_PRECISION {
			bail!("Too many decimal places: {:?}", input);
		}

		let scale = 10u128.pow(precision);
		let whole = if whole.is_empty() {
			0
		} else {
			whole.parse::<u128>()?
		};
		let fractional = if fraction.is_empty() {
			0
		} else {
			fraction.parse::<u128>()?
		};

		let numerator = match whole
			.checked_mul(scale)
			.and_then(|n| n.checked_add(fractional))
		{
			Some(n) => n,
			None => bail!("Number out of range: {:?}", input),
		};
		let mut out = Self {
			numerator,
			denominator: scale,
			is_negative: is_negative && numerator > 0,
			render_precision: precision,
		};
		out.reduce();
		Ok(out)
	}

	/// Rounds to the given number of decimal places with banker's rounding
	/// (nearest, ties to even), and renders with exactly that many places.
	pub fn round(&mut self, decimal_places: u32) {
		let scale = 10u128.pow(decimal_places);
		let whole = self.numerator / self.denominator;
		let mut quotient = in_range(whole.checked_mul(scale));
		let mut remainder = self.numerator % self.denominator;

		// one digit at a time, so nothing grows past the denominator
		let mut place = scale;
		for _ in 0..decimal_places {
			place /= 10;
			remainder = in_range(remainder.checked_mul(10));
			let digit = remainder / self.denominator;
			quotient = in_range(quotient.checked_add(digit * place));
			remainder %= self.denominator;
		}

		// remainder against denominator - remainder: a half is a tie
		let rounded = match remainder.cmp(&(self.denominator - remainder)) {
			Ordering::Greater => in_range(quotient.checked_add(1)),
			Ordering::Equal if quotient % 2 == 1 => {
				in_range(quotient.checked_add(1))
			},
			_ => quotient,
		};

		self.numerator = rounded;
		self.denominator = scale;
		self.is_negative = self.is_negative && rounded > 0;
		self.render_precision = decimal_places;
		self.reduce();
	}

	/// Copying form of `round`.
	pub fn rounded(mut self, decimal_places: u32) -> Self {
		self.round(decimal_places);
		self
	}

	pub fn is_zero(&self) -> bool {
		self.numerator == 0
	}

	pub fn is_positive(&self) -> bool {
		self.numerator > 0 && !self.is_negative
	}

	pub fn is_negative(&self) -> bool {
		self.is_negative
	}

	fn reduce(&mut self) {
		let gcd = Self::gcd(self.numerator, self.denominator);
		self.numerator /= gcd;
		self.denominator /= gcd;
		if self.numerator == 0 {
			self.denominator = 1;
			self.is_negative = false;
		}
	}

	/// Euclid's algorithm
	fn gcd(mut a: u128, mut b: u128) -> u128 {
		while b != 0 {
			let temp = b;
			b = a % b;
			a = temp;
		}
		a
	}

	fn recip(&self) -> Self {
		if self.numerator == 0 {
			panic!("Attempt to divide by zero");
		}

		Self {
			numerator: self.denominator,
			denominator: self.numerator,
			..*self
		}
	}
}

/// Plain decimal by default; the alternate flag (`{:#}`) adds thousands
/// separators for human-facing tables.
impl fmt::Display for Quant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let integer_part = self.numerator / self.denominator;
		let mut remainder = self.numerator % self.denominator;

		let mut fraction_str = String::new();
		for _ in 0..self.render_precision {
			if remainder == 0 {
				break;
			}
			remainder = in_range(remainder.checked_mul(10));
			let digit = remainder / self.denominator;
			remainder %= self.denominator;
			fraction_str.push(char::from(b'0' + digit as u8));
		}
		while fraction_str.len() < self.render_precision as usize {
			fraction_str.push('0');
		}

		let mut int_str = integer_part.to_string();
		if f.alternate() {
			let mut i = int_str.len() as isize - 3;
			while i > 0 {
				int_str.insert(i as usize, ',');
				i -= 3;
			}
		}

		let sign = if self.is_negative { "-" } else { "" };
		if fraction_str.is_empty() {
			write!(f, "{}{}", sign, int_str)
		} else {
			write!(f, "{}{}.{}", sign, int_str, fraction_str)
		}
	}
}

/// Unwraps a checked u128 step. Overflow panics in every build profile
/// instead of wrapping into a wrong figure.
fn in_range(value: Option<u128>) -> u128 {
	match value {
		Some(v) => v,
		None => panic!("Quant arithmetic overflowed u128"),
	}
}

// -----------------
// -- BOILERPLATE --
// -----------------

impl Add for Quant {
	type Output = Self;

	fn add(self, rhs: Self) -> Self::Output {
		let render_precision = self.render_precision.max(rhs.render_precision);
		if self.numerator == 0 {
			return Self {
				render_precision,
				..rhs
			};
		}
		if rhs.numerator == 0 {
			return Self {
				render_precision,
				..self
			};
		}

		let gcd = Self::gcd(self.denominator, rhs.denominator);
		let lcm =
			in_range((self.denominator / gcd).checked_mul(rhs.denominator));

		let term_a =
			in_range(self.numerator.checked_mul(lcm / self.denominator));
		let term_b = in_range(rhs.numerator.checked_mul(lcm / rhs.denominator));

		let (numerator, is_negative) = if self.is_negative == rhs.is_negative
		{
			(in_range(term_a.checked_add(term_b)), self.is_negative)
		} else if term_a >= term_b {
			(term_a - term_b, self.is_negative)
		} else {
			(term_b - term_a, rhs.is_negative)
		};

		let mut out = Self {
			numerator,
			denominator: lcm,
			is_negative,
			render_precision,
		};
		out.reduce();
		out
	}
}

impl AddAssign for Quant {
	fn add_assign(&mut self, rhs: Self) {
		*self = *self + rhs;
	}
}

impl Sum for Quant {
	fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
		iter.fold(Quant::zero(), |acc, quant| acc + quant)
	}
}

impl Sub for Quant {
	type Output = Self;

	fn sub(self, rhs: Self) -> Self::Output {
		self + (-rhs)
	}
}

impl SubAssign for Quant {
	fn sub_assign(&mut self, rhs: Self) {
		*self = *self - rhs;
	}
}

impl Mul for Quant {
	type Output = Self;

	fn mul(self, rhs: Self) -> Self::Output {
		// cross-reduce first to keep the products small
		let gcd_a = Self::gcd(self.numerator, rhs.denominator);
		let gcd_b = Self::gcd(rhs.numerator, self.denominator);

		let numerator = in_range(
			(self.numerator / gcd_a).checked_mul(rhs.numerator / gcd_b),
		);
		let denominator = in_range(
			(self.denominator / gcd_b).checked_mul(rhs.denominator / gcd_a),
		);

		let mut out = Self {
			numerator,
			denominator,
			is_negative: self.is_negative ^ rhs.is_negative,
			render_precision: self.render_precision.max(rhs.render_precision),
		};
		out.reduce();
		out
	}
}

impl Div for Quant {
	type Output = Self;

	fn div(self, rhs: Self) -> Self::Output {
		self * rhs.recip()
	}
}

impl Neg for Quant {
	type Output = Self;

	fn neg(self) -> Self::Output {
		Self {
			is_negative: self.numerator != 0 && !self.is_negative,
			..self
		}
	}
}

impl PartialEq for Quant {
	fn eq(&self, other: &Self) -> bool {
		// both sides are always in lowest terms
		self.numerator == other.numerator
			&& self.denominator == other.denominator
			&& self.is_negative == other.is_negative
	}
}

impl Eq for Quant {}

impl PartialEq<i128> for Quant {
	fn eq(&self, other: &i128) -> bool {
		*self == Quant::from_i128(*other)
	}
}

impl PartialOrd for Quant {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl PartialOrd<i128> for Quant {
	fn partial_cmp(&self, other: &i128) -> Option<Ordering> {
		Some(self.cmp(&Quant::from_i128(*other)))
	}
}

impl Ord for Quant {
	fn cmp(&self, other: &Self) -> Ordering {
		match (self.is_negative, other.is_negative) {
			(true, false) => return Ordering::Less,
			(false, true) => return Ordering::Greater,
			_ => {},
		};

		let gcd = Self::gcd(self.denominator, other.denominator);
		let lcm =
			in_range((self.denominator / gcd).checked_mul(other.denominator));

		let left = in_range(self.numerator.checked_mul(lcm / self.denominator));
		let right =
			in_range(other.numerator.checked_mul(lcm / other.denominator));

		if self.is_negative {
			right.cmp(&left)
		} else {
			left.cmp(&right)
		}
	}
}
