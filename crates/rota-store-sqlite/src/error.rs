//! Error type for `rota-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain failure — not found, at capacity, same-day collision, and so
  /// on. Behaviorally identical to what the in-memory backend returns.
  #[error("core error: {0}")]
  Core(#[from] rota_core::Error),

  /// A transient database failure, propagated unchanged for the caller to
  /// decide on.
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
