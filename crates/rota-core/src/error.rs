//! Error types for `rota-core`.

use chrono::NaiveDate;
use thiserror::Error;

use crate::{shift::ShiftId, worker::WorkerId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("worker not found: {0}")]
  WorkerNotFound(WorkerId),

  #[error("shift not found: {0}")]
  ShiftNotFound(ShiftId),

  #[error("no assignment links worker {worker} to shift {shift}")]
  AssignmentNotFound { worker: WorkerId, shift: ShiftId },

  #[error("worker email already in use: {0}")]
  DuplicateEmail(String),

  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("shift {0} is already at capacity")]
  ShiftAtCapacity(ShiftId),

  #[error("worker already has a shift on {0}")]
  TwoShiftsSameDay(NaiveDate),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
