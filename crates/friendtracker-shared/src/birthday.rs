//! Birthday arithmetic and the date-only wire codec.
//!
//! Birthdays are calendar dates without time-of-day or timezone.  Anything
//! that follows the `YYYY-MM-DD` segment of a transported value is dropped
//! before parsing, so a backend that hands out timestamps never shifts a
//! birthday across a day boundary.

use chrono::{Datelike, NaiveDate};

use crate::constants::{DATE_FORMAT, DATE_ONLY_LEN};
use crate::error::ContactError;

/// Parse the date-only segment of a transported birthday.
///
/// Blank input is an unknown birthday, not an error.
pub fn parse_date_only(value: &str) -> Result<Option<NaiveDate>, ContactError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let segment = trimmed.split('T').next().unwrap_or(trimmed);
    let segment = segment.get(..DATE_ONLY_LEN).unwrap_or(segment);

    NaiveDate::parse_from_str(segment, DATE_FORMAT)
        .map(Some)
        .map_err(|_| ContactError::InvalidBirthday {
            value: value.to_string(),
        })
}

/// Render a birthday in its wire form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// The day a birthday is observed in `year`.
///
/// Feb 29 falls on March 1 in non-leap years.
pub fn occurrence_in(birthday: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(birthday)
}

/// The first observed occurrence of `birthday` on or after `today`.
pub fn next_occurrence(birthday: NaiveDate, today: NaiveDate) -> NaiveDate {
    let this_year = occurrence_in(birthday, today.year());
    if this_year < today {
        occurrence_in(birthday, today.year() + 1)
    } else {
        this_year
    }
}

/// Whole days from `today` until the next occurrence of `birthday`.
///
/// Zero means the birthday is today.  Both values are calendar dates, so the
/// distance is already an exact day count.
pub fn days_until_next_birthday(birthday: NaiveDate, today: NaiveDate) -> i64 {
    (next_occurrence(birthday, today) - today).num_days()
}

/// Serde codec for `Option<NaiveDate>` fields carried as date-only strings.
pub mod date_only {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_date, parse_date_only};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&format_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_date_only(&raw).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Serde codec for tri-state patch birthdays: absent, cleared (`null`) or set.
///
/// Pair with `#[serde(default, skip_serializing_if = "Option::is_none")]`.
pub mod date_only_patch {
    use chrono::NaiveDate;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<Option<NaiveDate>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(inner) => super::date_only::serialize(inner, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<NaiveDate>>, D::Error> {
        super::date_only::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn birthday_already_passed_rolls_to_next_year() {
        let today = date(2024, 6, 10);
        assert_eq!(next_occurrence(date(2020, 6, 5), today), date(2025, 6, 5));
        assert_eq!(days_until_next_birthday(date(2020, 6, 5), today), 360);
    }

    #[test]
    fn birthday_later_this_year() {
        let today = date(2024, 6, 10);
        assert_eq!(days_until_next_birthday(date(2024, 6, 15), today), 5);
        assert_eq!(days_until_next_birthday(date(1985, 12, 31), today), 204);
    }

    #[test]
    fn birthday_today_is_zero() {
        let today = date(2024, 6, 10);
        assert_eq!(days_until_next_birthday(date(1999, 6, 10), today), 0);
    }

    #[test]
    fn december_to_january_wraparound() {
        let today = date(2024, 12, 30);
        assert_eq!(next_occurrence(date(1990, 1, 2), today), date(2025, 1, 2));
        assert_eq!(days_until_next_birthday(date(1990, 1, 2), today), 3);
        assert_eq!(days_until_next_birthday(date(1990, 12, 29), today), 364);
    }

    #[test]
    fn leap_day_birthday_observed_on_march_first() {
        let leapling = date(2000, 2, 29);

        assert_eq!(occurrence_in(leapling, 2023), date(2023, 3, 1));
        assert_eq!(occurrence_in(leapling, 2024), date(2024, 2, 29));

        assert_eq!(days_until_next_birthday(leapling, date(2023, 2, 1)), 28);
        assert_eq!(days_until_next_birthday(leapling, date(2024, 2, 1)), 28);
        assert_eq!(days_until_next_birthday(leapling, date(2023, 3, 1)), 0);
        assert_eq!(next_occurrence(leapling, date(2023, 3, 2)), date(2024, 2, 29));
        assert_eq!(days_until_next_birthday(leapling, date(2023, 3, 2)), 364);
    }

    #[test]
    fn parse_discards_time_component() {
        assert_eq!(
            parse_date_only("1990-05-17T23:59:59+02:00").unwrap(),
            Some(date(1990, 5, 17))
        );
        assert_eq!(
            parse_date_only("1990-05-17 08:00:00").unwrap(),
            Some(date(1990, 5, 17))
        );
        assert_eq!(parse_date_only("1990-05-17").unwrap(), Some(date(1990, 5, 17)));
    }

    #[test]
    fn parse_blank_is_unknown() {
        assert_eq!(parse_date_only("").unwrap(), None);
        assert_eq!(parse_date_only("   ").unwrap(), None);
    }

    #[test]
    fn parse_rejects_invalid_dates() {
        assert!(matches!(
            parse_date_only("2023-02-29"),
            Err(ContactError::InvalidBirthday { .. })
        ));
        assert!(parse_date_only("not a date").is_err());
    }

    #[test]
    fn format_is_date_only() {
        assert_eq!(format_date(date(2001, 1, 9)), "2001-01-09");
    }
}
