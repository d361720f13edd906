// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 rowcast

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;
const SECONDS_PER_DAY: u64 = 86_400;

/// A calendar date without time information.
///
/// Internally stored as days since Unix epoch (1970-01-01); negative values
/// represent dates before 1970.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Date {
	days_since_epoch: i32,
}

impl Date {
	/// Construct from year, month and day. Returns `None` when the
	/// combination is not a valid civil date.
	pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
		if month < 1 || month > 12 || day < 1 || day > days_in_month(year, month) {
			return None;
		}
		Some(Self {
			days_since_epoch: days_from_civil(year, month, day),
		})
	}

	pub fn days_since_epoch(&self) -> i32 {
		self.days_since_epoch
	}

	pub fn year(&self) -> i32 {
		civil_from_days(self.days_since_epoch).0
	}

	pub fn month(&self) -> u32 {
		civil_from_days(self.days_since_epoch).1
	}

	pub fn day(&self) -> u32 {
		civil_from_days(self.days_since_epoch).2
	}
}

impl Display for Date {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let (year, month, day) = civil_from_days(self.days_since_epoch);
		write!(f, "{:04}-{:02}-{:02}", year, month, day)
	}
}

/// A time of day without date information.
///
/// Internally stored as nanoseconds since midnight.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Time {
	nanos_since_midnight: u64,
}

impl Time {
	pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
		Self::from_hms_micro(hour, minute, second, 0)
	}

	pub fn from_hms_micro(hour: u32, minute: u32, second: u32, microsecond: u32) -> Option<Self> {
		if hour > 23 || minute > 59 || second > 59 || microsecond > 999_999 {
			return None;
		}
		let seconds = u64::from(hour) * 3_600 + u64::from(minute) * 60 + u64::from(second);
		Some(Self {
			nanos_since_midnight: seconds * NANOS_PER_SECOND + u64::from(microsecond) * NANOS_PER_MICRO,
		})
	}

	pub fn hour(&self) -> u32 {
		(self.nanos_since_midnight / NANOS_PER_SECOND / 3_600) as u32
	}

	pub fn minute(&self) -> u32 {
		(self.nanos_since_midnight / NANOS_PER_SECOND / 60 % 60) as u32
	}

	pub fn second(&self) -> u32 {
		(self.nanos_since_midnight / NANOS_PER_SECOND % 60) as u32
	}

	/// Sub-second component in microseconds, in `0..1_000_000`.
	pub fn microsecond(&self) -> u32 {
		(self.nanos_since_midnight % NANOS_PER_SECOND / NANOS_PER_MICRO) as u32
	}

	/// Sub-second component in milliseconds, in `0..1_000`.
	pub fn millisecond(&self) -> u32 {
		self.microsecond() / 1_000
	}
}

impl Display for Time {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:02}:{:02}:{:02}", self.hour(), self.minute(), self.second())?;
		if self.microsecond() != 0 {
			write!(f, ".{:06}", self.microsecond())?;
		}
		Ok(())
	}
}

/// A calendar date combined with a time of day.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateTime {
	date: Date,
	time: Time,
}

impl DateTime {
	pub fn new(date: Date, time: Time) -> Self {
		Self {
			date,
			time,
		}
	}

	pub fn from_parts(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<Self> {
		Some(Self::new(Date::from_ymd(year, month, day)?, Time::from_hms(hour, minute, second)?))
	}

	pub fn date(&self) -> Date {
		self.date
	}

	pub fn time(&self) -> Time {
		self.time
	}

	pub fn year(&self) -> i32 {
		self.date.year()
	}

	pub fn month(&self) -> u32 {
		self.date.month()
	}

	pub fn day(&self) -> u32 {
		self.date.day()
	}

	pub fn hour(&self) -> u32 {
		self.time.hour()
	}

	pub fn minute(&self) -> u32 {
		self.time.minute()
	}

	pub fn second(&self) -> u32 {
		self.time.second()
	}

	pub fn microsecond(&self) -> u32 {
		self.time.microsecond()
	}

	pub fn millisecond(&self) -> u32 {
		self.time.millisecond()
	}

	pub fn seconds_since_epoch(&self) -> i64 {
		i64::from(self.date.days_since_epoch()) * SECONDS_PER_DAY as i64
			+ (self.time.nanos_since_midnight / NANOS_PER_SECOND) as i64
	}
}

impl Display for DateTime {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}T{}Z", self.date, self.time)
	}
}

fn is_leap_year(year: i32) -> bool {
	(year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn days_in_month(year: i32, month: u32) -> u32 {
	match month {
		1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
		4 | 6 | 9 | 11 => 30,
		2 => {
			if is_leap_year(year) {
				29
			} else {
				28
			}
		}
		_ => 0,
	}
}

// Howard Hinnant's civil calendar algorithms, shifted so that day 0 is
// 1970-01-01. Months are remapped to [0, 11] with March as month 0 so leap
// days land at the end of the mapped year.
fn days_from_civil(year: i32, month: u32, day: u32) -> i32 {
	let (y, m) = if month <= 2 {
		(year - 1, month as i32 + 9)
	} else {
		(year, month as i32 - 3)
	};
	let era = if y >= 0 {
		y
	} else {
		y - 399
	} / 400;
	let yoe = y - era * 400; // [0, 399]
	let doy = (153 * m + 2) / 5 + day as i32 - 1; // [0, 365]
	let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]
	era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i32) -> (i32, u32, u32) {
	let z = days + 719_468;
	let era = if z >= 0 {
		z
	} else {
		z - 146_096
	} / 146_097;
	let doe = z - era * 146_097; // [0, 146096]
	let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
	let y = yoe + era * 400;
	let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
	let mp = (5 * doy + 2) / 153; // [0, 11]
	let day = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
	let month = if mp < 10 {
		mp + 3
	} else {
		mp - 9
	};
	let year = if month <= 2 {
		y + 1
	} else {
		y
	};
	(year, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_epoch_is_day_zero() {
		let date = Date::from_ymd(1970, 1, 1).unwrap();
		assert_eq!(date.days_since_epoch(), 0);
		assert_eq!((date.year(), date.month(), date.day()), (1970, 1, 1));
	}

	#[test]
	fn test_round_trip_across_leap_years() {
		for &(y, m, d) in &[(2000, 2, 29), (2024, 2, 29), (1969, 12, 31), (2100, 3, 1), (1900, 2, 28)] {
			let date = Date::from_ymd(y, m, d).unwrap();
			assert_eq!((date.year(), date.month(), date.day()), (y, m, d), "{y}-{m}-{d}");
		}
	}

	#[test]
	fn test_invalid_dates_rejected() {
		assert_eq!(Date::from_ymd(2023, 2, 29), None);
		assert_eq!(Date::from_ymd(2023, 13, 1), None);
		assert_eq!(Date::from_ymd(2023, 4, 31), None);
	}

	#[test]
	fn test_date_ordering_follows_days() {
		let a = Date::from_ymd(1969, 12, 31).unwrap();
		let b = Date::from_ymd(1970, 1, 2).unwrap();
		assert!(a < b);
		assert_eq!(a.days_since_epoch(), -1);
	}

	#[test]
	fn test_time_components() {
		let time = Time::from_hms_micro(13, 37, 42, 123_456).unwrap();
		assert_eq!(time.hour(), 13);
		assert_eq!(time.minute(), 37);
		assert_eq!(time.second(), 42);
		assert_eq!(time.microsecond(), 123_456);
		assert_eq!(time.millisecond(), 123);
	}

	#[test]
	fn test_time_rejects_out_of_range() {
		assert_eq!(Time::from_hms(24, 0, 0), None);
		assert_eq!(Time::from_hms(0, 60, 0), None);
		assert_eq!(Time::from_hms_micro(0, 0, 0, 1_000_000), None);
	}

	#[test]
	fn test_datetime_display() {
		let dt = DateTime::from_parts(2020, 1, 2, 3, 4, 5).unwrap();
		assert_eq!(dt.to_string(), "2020-01-02T03:04:05Z");
	}

	#[test]
	fn test_datetime_accessors() {
		let dt = DateTime::new(
			Date::from_ymd(1999, 12, 31).unwrap(),
			Time::from_hms_micro(23, 59, 58, 7_000).unwrap(),
		);
		assert_eq!(dt.year(), 1999);
		assert_eq!(dt.millisecond(), 7);
		assert_eq!(dt.date(), Date::from_ymd(1999, 12, 31).unwrap());
		assert_eq!(dt.time().second(), 58);
	}
}
