//! [`MemoryStore`] — the volatile map-based implementation of
//! [`RosterStore`].

use std::collections::HashMap;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;
use tokio::sync::RwLock;

use rota_core::{
  Error, Result,
  assignment::{Assignment, AssignmentId},
  rules,
  shift::{NewShift, Shift, ShiftId},
  span::span_range,
  store::{RosterStore, ShiftQuery},
  worker::{NewWorker, Worker, WorkerId},
};

/// A worker as held inside the store: the public read model plus the
/// credential that must never leave the backend.
struct StoredWorker {
  worker:        Worker,
  password_hash: String,
}

#[derive(Default)]
struct Inner {
  next_worker_id:     i64,
  next_shift_id:      i64,
  next_assignment_id: i64,
  workers:            HashMap<WorkerId, StoredWorker>,
  /// Exact-match email index; kept in step with `workers` under the write
  /// lock.
  email_index:        HashMap<String, WorkerId>,
  shifts:             HashMap<ShiftId, Shift>,
  assignments:        Vec<Assignment>,
}

/// A roster store held entirely in process memory.
///
/// One `RwLock` guards all collections. Readers run concurrently; any
/// operation that mutates takes the exclusive write guard before its first
/// check and releases it after its last write.
pub struct MemoryStore {
  inner: RwLock<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self { inner: RwLock::new(Inner::default()) }
  }
}

impl Default for MemoryStore {
  fn default() -> Self { Self::new() }
}

fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

impl RosterStore for MemoryStore {
  type Error = Error;

  // ── Authentication ────────────────────────────────────────────────────────

  async fn authenticate(&self, email: &str, password: &str) -> Result<Worker> {
    let inner = self.inner.read().await;

    let stored = inner
      .email_index
      .get(email)
      .and_then(|id| inner.workers.get(id))
      .ok_or(Error::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(&stored.password_hash)
      .map_err(|_| Error::InvalidCredentials)?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed_hash)
      .map_err(|_| Error::InvalidCredentials)?;

    Ok(stored.worker.clone())
  }

  // ── Workers ───────────────────────────────────────────────────────────────

  async fn list_workers(&self) -> Result<Vec<Worker>> {
    let inner = self.inner.read().await;
    Ok(inner.workers.values().map(|s| s.worker.clone()).collect())
  }

  async fn get_worker(&self, id: WorkerId) -> Result<Worker> {
    let inner = self.inner.read().await;
    inner
      .workers
      .get(&id)
      .map(|s| s.worker.clone())
      .ok_or(Error::WorkerNotFound(id))
  }

  async fn create_worker(&self, input: NewWorker) -> Result<Worker> {
    // Hash outside the critical section; argon2 is deliberately slow.
    let password_hash = hash_password(&input.password)?;

    let mut inner = self.inner.write().await;
    if inner.email_index.contains_key(&input.email) {
      return Err(Error::DuplicateEmail(input.email));
    }

    inner.next_worker_id += 1;
    let worker = Worker {
      id:       WorkerId(inner.next_worker_id),
      email:    input.email,
      name:     input.name,
      is_admin: input.is_admin,
    };
    inner.email_index.insert(worker.email.clone(), worker.id);
    inner
      .workers
      .insert(worker.id, StoredWorker { worker: worker.clone(), password_hash });

    tracing::debug!(worker = %worker.id, "worker created");
    Ok(worker)
  }

  async fn update_worker(&self, id: WorkerId, input: NewWorker) -> Result<Worker> {
    let password_hash = hash_password(&input.password)?;

    let mut inner = self.inner.write().await;
    let old_email = match inner.workers.get(&id) {
      Some(stored) => stored.worker.email.clone(),
      None => return Err(Error::WorkerNotFound(id)),
    };
    if inner.email_index.get(&input.email).is_some_and(|owner| *owner != id) {
      return Err(Error::DuplicateEmail(input.email));
    }

    inner.email_index.remove(&old_email);
    let worker = Worker {
      id,
      email:    input.email,
      name:     input.name,
      is_admin: input.is_admin,
    };
    inner.email_index.insert(worker.email.clone(), id);
    inner
      .workers
      .insert(id, StoredWorker { worker: worker.clone(), password_hash });

    Ok(worker)
  }

  async fn delete_worker(&self, id: WorkerId) -> Result<()> {
    let mut inner = self.inner.write().await;
    let stored = inner.workers.remove(&id).ok_or(Error::WorkerNotFound(id))?;
    inner.email_index.remove(&stored.worker.email);
    inner.assignments.retain(|a| a.worker_id != id);
    tracing::debug!(worker = %id, "worker deleted");
    Ok(())
  }

  // ── Shifts ────────────────────────────────────────────────────────────────

  async fn list_shifts(&self, query: &ShiftQuery) -> Result<Vec<Shift>> {
    let inner = self.inner.read().await;

    let window = query.date.map(|d| span_range(d, query.span));

    // Collect the worker's assigned shift ids up front for filtering.
    let assigned: Option<Vec<ShiftId>> = query.worker.map(|worker_id| {
      inner
        .assignments
        .iter()
        .filter(|a| a.worker_id == worker_id)
        .map(|a| a.shift_id)
        .collect()
    });

    let shifts = inner
      .shifts
      .values()
      .filter(|s| window.is_none_or(|(start, end)| s.overlaps(start, end)))
      .filter(|s| assigned.as_ref().is_none_or(|ids| ids.contains(&s.id)))
      .cloned()
      .collect();

    Ok(shifts)
  }

  async fn get_shift(&self, id: ShiftId) -> Result<Shift> {
    let inner = self.inner.read().await;
    inner.shifts.get(&id).cloned().ok_or(Error::ShiftNotFound(id))
  }

  async fn create_shift(&self, input: NewShift) -> Result<Shift> {
    let mut inner = self.inner.write().await;
    inner.next_shift_id += 1;
    let shift = Shift {
      id:         ShiftId(inner.next_shift_id),
      start_time: input.start_time,
      end_time:   input.end_time,
      capacity:   input.capacity,
    };
    inner.shifts.insert(shift.id, shift.clone());
    tracing::debug!(shift = %shift.id, "shift created");
    Ok(shift)
  }

  async fn update_shift(&self, id: ShiftId, input: NewShift) -> Result<Shift> {
    let mut inner = self.inner.write().await;
    if !inner.shifts.contains_key(&id) {
      return Err(Error::ShiftNotFound(id));
    }
    let shift = Shift {
      id,
      start_time: input.start_time,
      end_time:   input.end_time,
      capacity:   input.capacity,
    };
    inner.shifts.insert(id, shift.clone());
    Ok(shift)
  }

  async fn delete_shift(&self, id: ShiftId) -> Result<()> {
    let mut inner = self.inner.write().await;
    if inner.shifts.remove(&id).is_none() {
      return Err(Error::ShiftNotFound(id));
    }
    inner.assignments.retain(|a| a.shift_id != id);
    tracing::debug!(shift = %id, "shift deleted");
    Ok(())
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn create_assignment(
    &self,
    worker_id: WorkerId,
    shift_id: ShiftId,
  ) -> Result<Assignment> {
    // The whole check-then-act sequence runs under one write guard: the
    // capacity count and same-day scan stay atomic with the insert.
    let mut inner = self.inner.write().await;

    if !inner.workers.contains_key(&worker_id) {
      return Err(Error::WorkerNotFound(worker_id));
    }
    let shift = inner
      .shifts
      .get(&shift_id)
      .cloned()
      .ok_or(Error::ShiftNotFound(shift_id))?;

    let occupancy = inner
      .assignments
      .iter()
      .filter(|a| a.shift_id == shift_id)
      .count();
    let assigned: Vec<Shift> = inner
      .assignments
      .iter()
      .filter(|a| a.worker_id == worker_id)
      .filter_map(|a| inner.shifts.get(&a.shift_id).cloned())
      .collect();
    rules::check_assignment(&shift, occupancy, &assigned)?;

    inner.next_assignment_id += 1;
    let assignment = Assignment {
      id: AssignmentId(inner.next_assignment_id),
      worker_id,
      shift_id,
    };
    inner.assignments.push(assignment);

    tracing::debug!(worker = %worker_id, shift = %shift_id, "assignment created");
    Ok(assignment)
  }

  async fn delete_assignment(
    &self,
    worker_id: WorkerId,
    shift_id: ShiftId,
  ) -> Result<()> {
    let mut inner = self.inner.write().await;
    let pos = inner
      .assignments
      .iter()
      .position(|a| a.worker_id == worker_id && a.shift_id == shift_id)
      .ok_or(Error::AssignmentNotFound { worker: worker_id, shift: shift_id })?;
    inner.assignments.remove(pos);
    tracing::debug!(worker = %worker_id, shift = %shift_id, "assignment deleted");
    Ok(())
  }

  async fn list_assignments(&self) -> Result<Vec<Assignment>> {
    let inner = self.inner.read().await;
    Ok(inner.assignments.clone())
  }
}
