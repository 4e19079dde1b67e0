//! Encoding and row-mapping helpers between Rust domain types and the
//! TEXT/INTEGER representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 UTC strings; booleans as 0/1.

use chrono::{DateTime, Utc};
use rota_core::{
  assignment::{Assignment, AssignmentId},
  shift::{Shift, ShiftId},
  worker::{Worker, WorkerId},
};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

/// Decode an RFC 3339 column value, reporting a failure as a conversion
/// error on the column it came from.
pub fn decode_dt(idx: usize, s: String) -> rusqlite::Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(&s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| {
      rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::new(e),
      )
    })
}

/// Map a `SELECT id, email, name, is_admin` row.
pub fn worker_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Worker> {
  Ok(Worker {
    id:       WorkerId(row.get(0)?),
    email:    row.get(1)?,
    name:     row.get(2)?,
    is_admin: row.get(3)?,
  })
}

/// Map a `SELECT id, start_time, end_time, capacity` row.
pub fn shift_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Shift> {
  Ok(Shift {
    id:         ShiftId(row.get(0)?),
    start_time: decode_dt(1, row.get(1)?)?,
    end_time:   decode_dt(2, row.get(2)?)?,
    capacity:   row.get(3)?,
  })
}

/// Map a `SELECT id, worker_id, shift_id` row.
pub fn assignment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Assignment> {
  Ok(Assignment {
    id:        AssignmentId(row.get(0)?),
    worker_id: WorkerId(row.get(1)?),
    shift_id:  ShiftId(row.get(2)?),
  })
}
