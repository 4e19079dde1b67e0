//! The `RosterStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (`rota-store-memory`,
//! `rota-store-sqlite`). Higher layers depend on this abstraction, not on
//! any concrete backend, and the two implementations are behaviorally
//! indistinguishable apart from durability.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  assignment::Assignment,
  shift::{NewShift, Shift, ShiftId},
  span::SpanKind,
  worker::{NewWorker, Worker, WorkerId},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`RosterStore::list_shifts`].
///
/// With no `date` there is no time restriction at all — "no date" does not
/// mean "today", and `span` is ignored. With a date, the window is the
/// containing day or week (see [`crate::span::span_range`]) and a shift is
/// included iff it overlaps the half-open window.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftQuery {
  pub date:   Option<NaiveDate>,
  pub span:   SpanKind,
  /// Restrict to shifts this worker is assigned to.
  pub worker: Option<WorkerId>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a roster storage backend.
///
/// Every read hands back owned copies detached from backend state; mutating
/// a returned value never changes the store. Every mutation is atomic: its
/// checks and its write succeed together or the store is untouched. The
/// assignment admission sequence in particular (shift lookup, capacity
/// count, same-day scan, insert) is totally ordered per store, so two
/// concurrent admissions can never both pass the capacity check.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Authentication ────────────────────────────────────────────────────

  /// Look up a worker by exact email and verify the password against the
  /// stored hash. Fails with `InvalidCredentials` on an unknown email or a
  /// wrong password; callers are not told which.
  fn authenticate<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Worker, Self::Error>> + Send + 'a;

  // ── Workers ───────────────────────────────────────────────────────────

  fn list_workers(
    &self,
  ) -> impl Future<Output = Result<Vec<Worker>, Self::Error>> + Send + '_;

  fn get_worker(
    &self,
    id: WorkerId,
  ) -> impl Future<Output = Result<Worker, Self::Error>> + Send + '_;

  /// Persist a new worker under a freshly allocated id. The email must not
  /// be in use (`DuplicateEmail`); the plaintext password is hashed before
  /// storage.
  fn create_worker(
    &self,
    input: NewWorker,
  ) -> impl Future<Output = Result<Worker, Self::Error>> + Send + '_;

  /// Replace an existing worker in place. Email uniqueness is re-checked
  /// against every other worker and the password is re-hashed.
  fn update_worker(
    &self,
    id: WorkerId,
    input: NewWorker,
  ) -> impl Future<Output = Result<Worker, Self::Error>> + Send + '_;

  /// Delete a worker and, with it, every assignment the worker holds.
  fn delete_worker(
    &self,
    id: WorkerId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Shifts ────────────────────────────────────────────────────────────

  /// Select shifts matching `query`. Result order is unspecified; an empty
  /// result is valid.
  fn list_shifts<'a>(
    &'a self,
    query: &'a ShiftQuery,
  ) -> impl Future<Output = Result<Vec<Shift>, Self::Error>> + Send + 'a;

  fn get_shift(
    &self,
    id: ShiftId,
  ) -> impl Future<Output = Result<Shift, Self::Error>> + Send + '_;

  fn create_shift(
    &self,
    input: NewShift,
  ) -> impl Future<Output = Result<Shift, Self::Error>> + Send + '_;

  /// Replace an existing shift in place. Capacity or time changes do not
  /// re-validate assignments already admitted against the old values.
  fn update_shift(
    &self,
    id: ShiftId,
    input: NewShift,
  ) -> impl Future<Output = Result<Shift, Self::Error>> + Send + '_;

  /// Delete a shift and, with it, every assignment referencing it.
  fn delete_shift(
    &self,
    id: ShiftId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Assignments ───────────────────────────────────────────────────────

  /// Admit `worker_id` onto `shift_id`: verify both exist, apply
  /// [`crate::rules::check_assignment`] against current state, and persist
  /// the assignment — all in one critical section.
  fn create_assignment(
    &self,
    worker_id: WorkerId,
    shift_id: ShiftId,
  ) -> impl Future<Output = Result<Assignment, Self::Error>> + Send + '_;

  /// Remove the unique assignment matching both ids.
  fn delete_assignment(
    &self,
    worker_id: WorkerId,
    shift_id: ShiftId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_assignments(
    &self,
  ) -> impl Future<Output = Result<Vec<Assignment>, Self::Error>> + Send + '_;
}
