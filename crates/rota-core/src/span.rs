//! Span resolution — turning a reference date into a half-open time window.
//!
//! Schedule queries are bounded by either the calendar day containing a date
//! or the Monday-to-Monday week containing it. All windows are computed in
//! UTC, the fixed evaluation timezone for the whole system.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// The two window sizes a schedule query can ask for. `Week` is the default
/// everywhere a span token is optional.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
  Day,
  #[default]
  Week,
}

/// Resolve `date` to the half-open interval `[start, end)` of the day or
/// week containing it.
///
/// Weeks start on Monday: a Monday resolves to its own midnight, and a
/// Sunday to the Monday six days back. The offset comes from
/// [`Datelike::weekday`]'s `num_days_from_monday`, which already behaves as
/// a floor modulo (Sunday maps to 6, never -1).
pub fn span_range(date: NaiveDate, kind: SpanKind) -> (DateTime<Utc>, DateTime<Utc>) {
  let first_day = match kind {
    SpanKind::Day => date,
    SpanKind::Week => {
      date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
    }
  };
  let start = first_day.and_time(NaiveTime::MIN).and_utc();
  let end = match kind {
    SpanKind::Day => start + Duration::days(1),
    SpanKind::Week => start + Duration::days(7),
  };
  (start, end)
}
