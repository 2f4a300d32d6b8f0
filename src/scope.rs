//! Transactional scope around a unit of work: commit on success, rollback on
//! error, release the connection on every exit path.

use crate::error::AppError;
use sqlx::postgres::Postgres;
use sqlx::{PgConnection, PgPool, Transaction};
use std::sync::atomic::{AtomicU64, Ordering};

static TX_SEQ: AtomicU64 = AtomicU64::new(1);

/// One transaction acquired from the pool. The caller runs its statements
/// against `conn()` and finishes with exactly one of `commit`/`rollback`;
/// both consume the scope and return the connection to the pool. If neither
/// runs (early `?` return), dropping the scope rolls back.
///
/// Log lines bracket the transaction: one at begin, one at commit or
/// rollback, each carrying the transaction sequence number and the backend
/// connection pid.
pub struct SessionScope {
    tx: Transaction<'static, Postgres>,
    seq: u64,
}

impl SessionScope {
    pub async fn begin(pool: &PgPool) -> Result<Self, AppError> {
        let mut tx = pool.begin().await?;
        let seq = TX_SEQ.fetch_add(1, Ordering::Relaxed);
        let (pid,): (i32,) = sqlx::query_as("SELECT pg_backend_pid()")
            .fetch_one(&mut *tx)
            .await?;
        tracing::info!(transaction = seq, connection = pid, "start transaction");
        Ok(SessionScope { tx, seq })
    }

    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await?;
        tracing::info!(transaction = self.seq, "commit transaction");
        Ok(())
    }

    /// A failed rollback is logged, not raised; the caller's original error
    /// must propagate unchanged.
    pub async fn rollback(self) {
        match self.tx.rollback().await {
            Ok(()) => tracing::info!(transaction = self.seq, "rollback transaction"),
            Err(err) => {
                tracing::warn!(transaction = self.seq, error = %err, "rollback failed")
            }
        }
    }
}
