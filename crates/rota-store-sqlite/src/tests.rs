//! Behavioral tests for `SqliteStore` against an in-memory database — the
//! same suite the memory backend runs, so the two stay indistinguishable,
//! plus a durability check against a real file.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use rota_core::{
  Error as CoreError,
  shift::NewShift,
  span::SpanKind,
  store::{RosterStore, ShiftQuery},
  worker::NewWorker,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn worker_input(email: &str, password: &str) -> NewWorker {
  NewWorker {
    email:    email.into(),
    name:     "Some Worker".into(),
    is_admin: false,
    password: password.into(),
  }
}

/// An 8-hour shift starting at the given hour of the given day.
fn shift_input(y: i32, m: u32, d: u32, hour: u32, capacity: u32) -> NewShift {
  let start = Utc.with_ymd_and_hms(y, m, d, hour, 0, 0).unwrap();
  NewShift { start_time: start, end_time: start + Duration::hours(8), capacity }
}

fn is_core(err: &Error, check: impl Fn(&CoreError) -> bool) -> bool {
  matches!(err, Error::Core(e) if check(e))
}

// ─── Workers ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_worker() {
  let s = store().await;

  let created = s
    .create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
  assert_eq!(created.email, "alice@example.com");

  let fetched = s.get_worker(created.id).await.unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_worker_missing_fails() {
  let s = store().await;
  let err = s.get_worker(rota_core::worker::WorkerId(42)).await.unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::WorkerNotFound(_))));
}

#[tokio::test]
async fn create_worker_rejects_duplicate_email() {
  let s = store().await;
  s.create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();

  let err = s
    .create_worker(worker_input("alice@example.com", "other"))
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::DuplicateEmail(_))));
  assert_eq!(s.list_workers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_worker_replaces_fields_and_password() {
  let s = store().await;
  let w = s
    .create_worker(worker_input("alice@example.com", "old-pw"))
    .await
    .unwrap();

  let updated = s
    .update_worker(
      w.id,
      NewWorker {
        email:    "alice@new.example.com".into(),
        name:     "Alice Prime".into(),
        is_admin: true,
        password: "new-pw".into(),
      },
    )
    .await
    .unwrap();
  assert_eq!(updated.id, w.id);
  assert!(updated.is_admin);

  assert!(s.authenticate("alice@example.com", "old-pw").await.is_err());
  let authed = s
    .authenticate("alice@new.example.com", "new-pw")
    .await
    .unwrap();
  assert_eq!(authed.id, w.id);
}

#[tokio::test]
async fn update_worker_may_keep_its_own_email() {
  let s = store().await;
  let w = s
    .create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();

  let updated = s
    .update_worker(w.id, worker_input("alice@example.com", "pw2"))
    .await
    .unwrap();
  assert_eq!(updated.email, "alice@example.com");
}

#[tokio::test]
async fn update_worker_rejects_anothers_email() {
  let s = store().await;
  s.create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
  let bob = s
    .create_worker(worker_input("bob@example.com", "pw"))
    .await
    .unwrap();

  let err = s
    .update_worker(bob.id, worker_input("alice@example.com", "pw"))
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::DuplicateEmail(_))));
}

#[tokio::test]
async fn update_worker_missing_fails() {
  let s = store().await;
  let err = s
    .update_worker(
      rota_core::worker::WorkerId(7),
      worker_input("ghost@example.com", "pw"),
    )
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::WorkerNotFound(_))));
}

#[tokio::test]
async fn delete_worker_cascades_assignments() {
  let s = store().await;
  let w = s
    .create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
  let shift = s.create_shift(shift_input(2024, 6, 10, 8, 1)).await.unwrap();
  s.create_assignment(w.id, shift.id).await.unwrap();

  s.delete_worker(w.id).await.unwrap();

  let err = s.get_worker(w.id).await.unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::WorkerNotFound(_))));
  assert!(s.list_assignments().await.unwrap().is_empty());
  // The email is free again.
  s.create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
}

// ─── Authentication ──────────────────────────────────────────────────────────

#[tokio::test]
async fn authenticate_with_correct_password() {
  let s = store().await;
  let w = s
    .create_worker(worker_input("alice@example.com", "s3cret"))
    .await
    .unwrap();

  let authed = s.authenticate("alice@example.com", "s3cret").await.unwrap();
  assert_eq!(authed, w);
}

#[tokio::test]
async fn authenticate_rejects_wrong_password() {
  let s = store().await;
  s.create_worker(worker_input("alice@example.com", "s3cret"))
    .await
    .unwrap();

  let err = s.authenticate("alice@example.com", "wrong").await.unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::InvalidCredentials)));
}

#[tokio::test]
async fn authenticate_rejects_unknown_email() {
  let s = store().await;
  let err = s.authenticate("nobody@example.com", "pw").await.unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::InvalidCredentials)));
}

// ─── Shifts ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_shift_round_trip() {
  let s = store().await;
  let input = shift_input(2024, 6, 10, 8, 3);
  let created = s.create_shift(input).await.unwrap();
  assert_eq!(created.start_time, input.start_time);
  assert_eq!(created.end_time, input.end_time);
  assert_eq!(created.capacity, 3);

  let fetched = s.get_shift(created.id).await.unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn update_shift_replaces_fields() {
  let s = store().await;
  let shift = s.create_shift(shift_input(2024, 6, 10, 8, 1)).await.unwrap();

  let updated = s
    .update_shift(shift.id, shift_input(2024, 6, 10, 9, 4))
    .await
    .unwrap();
  assert_eq!(updated.id, shift.id);
  assert_eq!(updated.capacity, 4);
  assert_eq!(s.get_shift(shift.id).await.unwrap(), updated);
}

#[tokio::test]
async fn update_and_delete_missing_shift_fail() {
  let s = store().await;
  let missing = rota_core::shift::ShiftId(9);

  let err = s
    .update_shift(missing, shift_input(2024, 6, 10, 8, 1))
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::ShiftNotFound(_))));

  let err = s.delete_shift(missing).await.unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::ShiftNotFound(_))));
}

#[tokio::test]
async fn delete_shift_cascades_assignments() {
  let s = store().await;
  let w = s
    .create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
  let shift = s.create_shift(shift_input(2024, 6, 10, 8, 1)).await.unwrap();
  s.create_assignment(w.id, shift.id).await.unwrap();

  s.delete_shift(shift.id).await.unwrap();
  assert!(s.list_assignments().await.unwrap().is_empty());
}

// ─── Schedule queries ────────────────────────────────────────────────────────

#[tokio::test]
async fn list_shifts_without_date_returns_everything() {
  let s = store().await;
  s.create_shift(shift_input(2024, 1, 1, 8, 1)).await.unwrap();
  s.create_shift(shift_input(2024, 6, 10, 8, 1)).await.unwrap();
  s.create_shift(shift_input(2024, 12, 31, 8, 1)).await.unwrap();

  let all = s.list_shifts(&ShiftQuery::default()).await.unwrap();
  assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn day_query_uses_open_overlap() {
  let s = store().await;
  // Ends exactly at the window start: excluded.
  s.create_shift(shift_input(2024, 6, 9, 16, 1)).await.unwrap();
  // Straddles midnight into the queried day: included.
  let straddling = s.create_shift(shift_input(2024, 6, 9, 20, 1)).await.unwrap();
  // Fully inside the day: included.
  let inside = s.create_shift(shift_input(2024, 6, 10, 8, 1)).await.unwrap();
  // Starts exactly at the window end: excluded.
  s.create_shift(shift_input(2024, 6, 11, 0, 1)).await.unwrap();

  let query = ShiftQuery {
    date:   Some(chrono::NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
    span:   SpanKind::Day,
    worker: None,
  };
  let mut got: Vec<_> = s
    .list_shifts(&query)
    .await
    .unwrap()
    .into_iter()
    .map(|sh| sh.id)
    .collect();
  got.sort();

  assert_eq!(got, vec![straddling.id, inside.id]);
}

#[tokio::test]
async fn week_query_covers_monday_through_sunday() {
  let s = store().await;
  // The week of Monday 2024-06-10, queried with the Thursday.
  let monday = s.create_shift(shift_input(2024, 6, 10, 8, 1)).await.unwrap();
  let sunday = s.create_shift(shift_input(2024, 6, 16, 8, 1)).await.unwrap();
  s.create_shift(shift_input(2024, 6, 9, 8, 1)).await.unwrap();
  s.create_shift(shift_input(2024, 6, 17, 8, 1)).await.unwrap();

  let query = ShiftQuery {
    date:   Some(chrono::NaiveDate::from_ymd_opt(2024, 6, 13).unwrap()),
    span:   SpanKind::Week,
    worker: None,
  };
  let mut got: Vec<_> = s
    .list_shifts(&query)
    .await
    .unwrap()
    .into_iter()
    .map(|sh| sh.id)
    .collect();
  got.sort();

  assert_eq!(got, vec![monday.id, sunday.id]);
}

#[tokio::test]
async fn worker_filter_restricts_to_assigned_shifts() {
  let s = store().await;
  let alice = s
    .create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
  let assigned = s.create_shift(shift_input(2024, 6, 10, 8, 2)).await.unwrap();
  s.create_shift(shift_input(2024, 6, 11, 8, 2)).await.unwrap();
  s.create_assignment(alice.id, assigned.id).await.unwrap();

  let query = ShiftQuery { worker: Some(alice.id), ..ShiftQuery::default() };
  let got = s.list_shifts(&query).await.unwrap();
  assert_eq!(got.len(), 1);
  assert_eq!(got[0].id, assigned.id);
}

#[tokio::test]
async fn worker_and_date_filters_compose() {
  let s = store().await;
  let alice = s
    .create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
  let this_week = s.create_shift(shift_input(2024, 6, 10, 8, 2)).await.unwrap();
  let next_week = s.create_shift(shift_input(2024, 6, 18, 8, 2)).await.unwrap();
  s.create_assignment(alice.id, this_week.id).await.unwrap();
  s.create_assignment(alice.id, next_week.id).await.unwrap();

  let query = ShiftQuery {
    date:   Some(chrono::NaiveDate::from_ymd_opt(2024, 6, 13).unwrap()),
    span:   SpanKind::Week,
    worker: Some(alice.id),
  };
  let got = s.list_shifts(&query).await.unwrap();
  assert_eq!(got.len(), 1);
  assert_eq!(got[0].id, this_week.id);
}

// ─── Assignment admission ────────────────────────────────────────────────────

#[tokio::test]
async fn admission_success_and_capacity_limit() {
  let s = store().await;
  let alice = s
    .create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
  let bob = s
    .create_worker(worker_input("bob@example.com", "pw"))
    .await
    .unwrap();
  let carol = s
    .create_worker(worker_input("carol@example.com", "pw"))
    .await
    .unwrap();
  let shift = s.create_shift(shift_input(2024, 6, 10, 8, 2)).await.unwrap();

  let a1 = s.create_assignment(alice.id, shift.id).await.unwrap();
  let a2 = s.create_assignment(bob.id, shift.id).await.unwrap();
  assert_ne!(a1.id, a2.id);

  let err = s.create_assignment(carol.id, shift.id).await.unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::ShiftAtCapacity(_))));
  assert_eq!(s.list_assignments().await.unwrap().len(), 2);
}

#[tokio::test]
async fn admission_rejects_second_shift_same_day() {
  let s = store().await;
  let alice = s
    .create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
  let morning = s.create_shift(shift_input(2024, 6, 10, 8, 2)).await.unwrap();
  let evening = s.create_shift(shift_input(2024, 6, 10, 16, 2)).await.unwrap();
  let next_day = s.create_shift(shift_input(2024, 6, 11, 8, 2)).await.unwrap();

  s.create_assignment(alice.id, morning.id).await.unwrap();

  let err = s.create_assignment(alice.id, evening.id).await.unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::TwoShiftsSameDay(_))));

  s.create_assignment(alice.id, next_day.id).await.unwrap();
  assert_eq!(s.list_assignments().await.unwrap().len(), 2);
}

#[tokio::test]
async fn admission_requires_existing_worker_and_shift() {
  let s = store().await;
  let alice = s
    .create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
  let shift = s.create_shift(shift_input(2024, 6, 10, 8, 1)).await.unwrap();

  let err = s
    .create_assignment(rota_core::worker::WorkerId(99), shift.id)
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::WorkerNotFound(_))));

  let err = s
    .create_assignment(alice.id, rota_core::shift::ShiftId(99))
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::ShiftNotFound(_))));

  // Neither failure left anything behind.
  assert!(s.list_assignments().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_assignment_and_missing_assignment() {
  let s = store().await;
  let alice = s
    .create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
  let shift = s.create_shift(shift_input(2024, 6, 10, 8, 1)).await.unwrap();
  s.create_assignment(alice.id, shift.id).await.unwrap();

  s.delete_assignment(alice.id, shift.id).await.unwrap();
  assert!(s.list_assignments().await.unwrap().is_empty());

  let err = s.delete_assignment(alice.id, shift.id).await.unwrap_err();
  assert!(is_core(&err, |e| matches!(e, CoreError::AssignmentNotFound { .. })));
}

#[tokio::test]
async fn freed_capacity_can_be_reassigned() {
  let s = store().await;
  let alice = s
    .create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
  let bob = s
    .create_worker(worker_input("bob@example.com", "pw"))
    .await
    .unwrap();
  let shift = s.create_shift(shift_input(2024, 6, 10, 8, 1)).await.unwrap();

  s.create_assignment(alice.id, shift.id).await.unwrap();
  assert!(s.create_assignment(bob.id, shift.id).await.is_err());

  s.delete_assignment(alice.id, shift.id).await.unwrap();
  s.create_assignment(bob.id, shift.id).await.unwrap();
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_admissions_fill_exactly_to_capacity() {
  let s = Arc::new(store().await);
  let shift = s.create_shift(shift_input(2024, 6, 10, 8, 2)).await.unwrap();

  let mut workers = Vec::new();
  for i in 0..8 {
    let email = format!("w{i}@example.com");
    workers.push(s.create_worker(worker_input(&email, "pw")).await.unwrap());
  }

  let mut handles = Vec::new();
  for w in &workers {
    let s = Arc::clone(&s);
    let (worker_id, shift_id) = (w.id, shift.id);
    handles.push(tokio::spawn(async move {
      s.create_assignment(worker_id, shift_id).await
    }));
  }

  let mut admitted = 0;
  let mut at_capacity = 0;
  for h in handles {
    match h.await.unwrap() {
      Ok(_) => admitted += 1,
      Err(ref e) if is_core(e, |e| matches!(e, CoreError::ShiftAtCapacity(_))) => {
        at_capacity += 1
      }
      Err(e) => panic!("unexpected admission error: {e}"),
    }
  }

  assert_eq!(admitted, 2);
  assert_eq!(at_capacity, 6);
  assert_eq!(s.list_assignments().await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_workers_racing_for_one_seat() {
  let s = Arc::new(store().await);
  let shift = s.create_shift(shift_input(2024, 6, 10, 8, 1)).await.unwrap();
  let alice = s
    .create_worker(worker_input("alice@example.com", "pw"))
    .await
    .unwrap();
  let bob = s
    .create_worker(worker_input("bob@example.com", "pw"))
    .await
    .unwrap();

  let (s1, s2) = (Arc::clone(&s), Arc::clone(&s));
  let shift_id = shift.id;
  let h1 = tokio::spawn(async move { s1.create_assignment(alice.id, shift_id).await });
  let h2 = tokio::spawn(async move { s2.create_assignment(bob.id, shift_id).await });

  let results = [h1.await.unwrap(), h2.await.unwrap()];
  let ok = results.iter().filter(|r| r.is_ok()).count();
  let full = results
    .iter()
    .filter(|r| {
      matches!(r, Err(Error::Core(CoreError::ShiftAtCapacity(_))))
    })
    .count();
  assert_eq!((ok, full), (1, 1));
}

// ─── Durability ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn data_survives_reopen() {
  let path = std::env::temp_dir()
    .join(format!("rota-store-sqlite-reopen-{}.db", std::process::id()));
  let _ = std::fs::remove_file(&path);

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create_worker(worker_input("alice@example.com", "pw"))
      .await
      .unwrap();
    s.create_shift(shift_input(2024, 6, 10, 8, 1)).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.list_workers().await.unwrap().len(), 1);
  assert_eq!(s.list_shifts(&ShiftQuery::default()).await.unwrap().len(), 1);

  let _ = std::fs::remove_file(&path);
}
