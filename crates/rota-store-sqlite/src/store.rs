//! [`SqliteStore`] — the SQLite implementation of [`RosterStore`].

use std::path::Path;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;
use rusqlite::{OptionalExtension as _, TransactionBehavior, params};

use rota_core::{
  Error as CoreError,
  assignment::{Assignment, AssignmentId},
  rules,
  shift::{NewShift, Shift, ShiftId},
  span::span_range,
  store::{RosterStore, ShiftQuery},
  worker::{NewWorker, Worker, WorkerId},
};

use crate::{
  Error, Result,
  encode::{assignment_from_row, encode_dt, shift_from_row, worker_from_row},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All access
/// is serialised onto the connection's worker thread, and every
/// check-then-act sequence runs inside one IMMEDIATE transaction, so
/// admission decisions are totally ordered.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Core(CoreError::PasswordHash(e.to_string())))
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = Error;

  // ── Authentication ────────────────────────────────────────────────────────

  async fn authenticate(&self, email: &str, password: &str) -> Result<Worker> {
    let email = email.to_owned();

    let found: Option<(Worker, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, email, name, is_admin, password
                 FROM worker
                WHERE email = ?1",
              params![email],
              |row| Ok((worker_from_row(row)?, row.get::<_, String>(4)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let (worker, stored_hash) =
      found.ok_or(Error::Core(CoreError::InvalidCredentials))?;

    let parsed_hash = PasswordHash::new(&stored_hash)
      .map_err(|_| Error::Core(CoreError::InvalidCredentials))?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed_hash)
      .map_err(|_| Error::Core(CoreError::InvalidCredentials))?;

    Ok(worker)
  }

  // ── Workers ───────────────────────────────────────────────────────────────

  async fn list_workers(&self) -> Result<Vec<Worker>> {
    let workers = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, email, name, is_admin FROM worker")?;
        let rows = stmt
          .query_map([], worker_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(workers)
  }

  async fn get_worker(&self, id: WorkerId) -> Result<Worker> {
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, email, name, is_admin FROM worker WHERE id = ?1",
              params![id.0],
              worker_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    found.ok_or(Error::Core(CoreError::WorkerNotFound(id)))
  }

  async fn create_worker(&self, input: NewWorker) -> Result<Worker> {
    // Hash outside the database thread; argon2 is deliberately slow.
    let password_hash = hash_password(&input.password)?;

    let created = self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let taken: bool = tx
          .query_row(
            "SELECT 1 FROM worker WHERE email = ?1",
            params![input.email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(Err(CoreError::DuplicateEmail(input.email)));
        }

        tx.execute(
          "INSERT INTO worker (email, name, is_admin, password)
                VALUES (?1, ?2, ?3, ?4)",
          params![input.email, input.name, input.is_admin, password_hash],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Ok(Worker {
          id:       WorkerId(id),
          email:    input.email,
          name:     input.name,
          is_admin: input.is_admin,
        }))
      })
      .await?;

    let worker = created?;
    tracing::debug!(worker = %worker.id, "worker created");
    Ok(worker)
  }

  async fn update_worker(&self, id: WorkerId, input: NewWorker) -> Result<Worker> {
    let password_hash = hash_password(&input.password)?;

    let updated = self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM worker WHERE id = ?1",
            params![id.0],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(Err(CoreError::WorkerNotFound(id)));
        }

        let taken: bool = tx
          .query_row(
            "SELECT 1 FROM worker WHERE email = ?1 AND id <> ?2",
            params![input.email, id.0],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(Err(CoreError::DuplicateEmail(input.email)));
        }

        tx.execute(
          "UPDATE worker
              SET email = ?1, name = ?2, is_admin = ?3, password = ?4
            WHERE id = ?5",
          params![input.email, input.name, input.is_admin, password_hash, id.0],
        )?;
        tx.commit()?;

        Ok(Ok(Worker {
          id,
          email:    input.email,
          name:     input.name,
          is_admin: input.is_admin,
        }))
      })
      .await?;

    Ok(updated?)
  }

  async fn delete_worker(&self, id: WorkerId) -> Result<()> {
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM worker WHERE id = ?1", params![id.0])?)
      })
      .await?;
    if affected == 0 {
      return Err(Error::Core(CoreError::WorkerNotFound(id)));
    }
    tracing::debug!(worker = %id, "worker deleted");
    Ok(())
  }

  // ── Shifts ────────────────────────────────────────────────────────────────

  async fn list_shifts(&self, query: &ShiftQuery) -> Result<Vec<Shift>> {
    // Resolve the window to RFC 3339 bounds before crossing to the
    // database thread.
    let window = query.date.map(|d| {
      let (start, end) = span_range(d, query.span);
      (encode_dt(start), encode_dt(end))
    });
    let worker = query.worker.map(|w| w.0);

    let shifts = self
      .conn
      .call(move |conn| {
        let rows = match (window, worker) {
          (Some((start, end)), Some(w)) => {
            let mut stmt = conn.prepare(
              "SELECT id, start_time, end_time, capacity FROM shift
                WHERE start_time < ?1 AND end_time > ?2
                  AND EXISTS (SELECT 1 FROM shift_assignment a
                               WHERE a.shift_id = shift.id AND a.worker_id = ?3)",
            )?;
            stmt
              .query_map(params![end, start, w], shift_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          (Some((start, end)), None) => {
            let mut stmt = conn.prepare(
              "SELECT id, start_time, end_time, capacity FROM shift
                WHERE start_time < ?1 AND end_time > ?2",
            )?;
            stmt
              .query_map(params![end, start], shift_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          (None, Some(w)) => {
            let mut stmt = conn.prepare(
              "SELECT id, start_time, end_time, capacity FROM shift
                WHERE EXISTS (SELECT 1 FROM shift_assignment a
                               WHERE a.shift_id = shift.id AND a.worker_id = ?1)",
            )?;
            stmt
              .query_map(params![w], shift_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          (None, None) => {
            let mut stmt = conn
              .prepare("SELECT id, start_time, end_time, capacity FROM shift")?;
            stmt
              .query_map([], shift_from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
        };
        Ok(rows)
      })
      .await?;

    Ok(shifts)
  }

  async fn get_shift(&self, id: ShiftId) -> Result<Shift> {
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, start_time, end_time, capacity FROM shift WHERE id = ?1",
              params![id.0],
              shift_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    found.ok_or(Error::Core(CoreError::ShiftNotFound(id)))
  }

  async fn create_shift(&self, input: NewShift) -> Result<Shift> {
    let start_str = encode_dt(input.start_time);
    let end_str = encode_dt(input.end_time);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO shift (start_time, end_time, capacity)
                VALUES (?1, ?2, ?3)",
          params![start_str, end_str, input.capacity],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    let shift = Shift {
      id:         ShiftId(id),
      start_time: input.start_time,
      end_time:   input.end_time,
      capacity:   input.capacity,
    };
    tracing::debug!(shift = %shift.id, "shift created");
    Ok(shift)
  }

  async fn update_shift(&self, id: ShiftId, input: NewShift) -> Result<Shift> {
    let start_str = encode_dt(input.start_time);
    let end_str = encode_dt(input.end_time);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE shift
              SET start_time = ?1, end_time = ?2, capacity = ?3
            WHERE id = ?4",
          params![start_str, end_str, input.capacity, id.0],
        )?)
      })
      .await?;
    if affected == 0 {
      return Err(Error::Core(CoreError::ShiftNotFound(id)));
    }

    Ok(Shift {
      id,
      start_time: input.start_time,
      end_time:   input.end_time,
      capacity:   input.capacity,
    })
  }

  async fn delete_shift(&self, id: ShiftId) -> Result<()> {
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM shift WHERE id = ?1", params![id.0])?)
      })
      .await?;
    if affected == 0 {
      return Err(Error::Core(CoreError::ShiftNotFound(id)));
    }
    tracing::debug!(shift = %id, "shift deleted");
    Ok(())
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn create_assignment(
    &self,
    worker_id: WorkerId,
    shift_id: ShiftId,
  ) -> Result<Assignment> {
    let admitted = self
      .conn
      .call(move |conn| {
        // The whole admission sequence is one IMMEDIATE transaction: the
        // capacity count and same-day scan cannot interleave with another
        // insert.
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let worker_exists: bool = tx
          .query_row(
            "SELECT 1 FROM worker WHERE id = ?1",
            params![worker_id.0],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !worker_exists {
          return Ok(Err(CoreError::WorkerNotFound(worker_id)));
        }

        let shift = match tx
          .query_row(
            "SELECT id, start_time, end_time, capacity FROM shift WHERE id = ?1",
            params![shift_id.0],
            shift_from_row,
          )
          .optional()?
        {
          Some(shift) => shift,
          None => return Ok(Err(CoreError::ShiftNotFound(shift_id))),
        };

        let occupancy: i64 = tx.query_row(
          "SELECT COUNT(*) FROM shift_assignment WHERE shift_id = ?1",
          params![shift_id.0],
          |row| row.get(0),
        )?;

        // Every shift the worker already holds — the same-day rule looks at
        // the whole history, not a window.
        let assigned = {
          let mut stmt = tx.prepare(
            "SELECT s.id, s.start_time, s.end_time, s.capacity
               FROM shift s
               JOIN shift_assignment a ON a.shift_id = s.id
              WHERE a.worker_id = ?1",
          )?;
          stmt
            .query_map(params![worker_id.0], shift_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        if let Err(e) =
          rules::check_assignment(&shift, occupancy as usize, &assigned)
        {
          return Ok(Err(e));
        }

        tx.execute(
          "INSERT INTO shift_assignment (worker_id, shift_id) VALUES (?1, ?2)",
          params![worker_id.0, shift_id.0],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Ok(Assignment { id: AssignmentId(id), worker_id, shift_id }))
      })
      .await?;

    let assignment = admitted?;
    tracing::debug!(worker = %worker_id, shift = %shift_id, "assignment created");
    Ok(assignment)
  }

  async fn delete_assignment(
    &self,
    worker_id: WorkerId,
    shift_id: ShiftId,
  ) -> Result<()> {
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM shift_assignment WHERE worker_id = ?1 AND shift_id = ?2",
          params![worker_id.0, shift_id.0],
        )?)
      })
      .await?;
    if affected == 0 {
      return Err(Error::Core(CoreError::AssignmentNotFound {
        worker: worker_id,
        shift:  shift_id,
      }));
    }
    tracing::debug!(worker = %worker_id, shift = %shift_id, "assignment deleted");
    Ok(())
  }

  async fn list_assignments(&self) -> Result<Vec<Assignment>> {
    let assignments = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, worker_id, shift_id FROM shift_assignment")?;
        let rows = stmt
          .query_map([], assignment_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(assignments)
  }
}
