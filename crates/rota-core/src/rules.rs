//! Admission rules for new shift assignments.
//!
//! Both storage backends call [`check_assignment`] from inside their own
//! critical section (write lock or database transaction), so the checks here
//! are always atomic with the insert that follows them.

use crate::{error::Error, shift::Shift};

/// Decide whether a worker may take `shift`, given the shift's current
/// occupancy and every shift the worker is already assigned to.
///
/// `assigned` is the worker's entire assignment history, not a windowed
/// slice: a worker never has two shifts starting on the same calendar day,
/// no matter how far apart the weeks are.
pub fn check_assignment(
  shift: &Shift,
  occupancy: usize,
  assigned: &[Shift],
) -> Result<(), Error> {
  if occupancy >= shift.capacity as usize {
    return Err(Error::ShiftAtCapacity(shift.id));
  }
  let day = shift.start_time.date_naive();
  if assigned.iter().any(|s| s.start_time.date_naive() == day) {
    return Err(Error::TwoShiftsSameDay(day));
  }
  Ok(())
}
