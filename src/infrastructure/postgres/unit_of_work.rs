use std::panic::{resume_unwind, AssertUnwindSafe};

use async_trait::async_trait;
use futures::FutureExt;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use crate::domain::RequestContext;
use crate::error::{AppError, AppResult};
use crate::unit_of_work::{UnitOfWork, Work};

/// Unit of work over a shared sqlx pool.
///
/// The pool is injected by the caller and outlives every unit of work.
#[derive(Debug, Clone)]
pub struct PgUnitOfWork {
    pool: PgPool,
}

impl PgUnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    type Handle = PgConnection;

    async fn execute<T, F>(&self, ctx: &RequestContext, work: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: for<'h> FnOnce(&'h mut Self::Handle) -> Work<'h, T> + Send + 'static,
    {
        // Dropping the PoolConnection returns it to the pool on every path
        let mut conn = ctx.run(self.pool.acquire()).await??;
        let outcome = ctx.run(work(&mut *conn)).await;
        outcome?
    }

    async fn execute_in_transaction<T, F>(&self, ctx: &RequestContext, work: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: for<'h> FnOnce(&'h mut Self::Handle) -> Work<'h, T> + Send + 'static,
    {
        let mut tx = ctx.run(self.pool.begin()).await??;

        let handle: &mut PgConnection = &mut tx;
        let outcome = ctx
            .run(AssertUnwindSafe(async move { work(handle).await }).catch_unwind())
            .await;

        match outcome {
            Ok(Ok(Ok(_))) if ctx.is_cancelled() => {
                rollback(tx, ctx).await;
                Err(AppError::Cancelled)
            }
            Ok(Ok(Ok(value))) => {
                // Cancellation is honoured only up to here. Once COMMIT is
                // sent its outcome is what the caller must see.
                tx.commit().await?;
                Ok(value)
            }
            Ok(Ok(Err(err))) => {
                rollback(tx, ctx).await;
                Err(err)
            }
            Ok(Err(panic)) => {
                rollback(tx, ctx).await;
                resume_unwind(panic)
            }
            Err(cancelled) => {
                rollback(tx, ctx).await;
                Err(AppError::from(cancelled))
            }
        }
    }
}

/// Roll back explicitly so the outcome is logged. A failed rollback still
/// leaves the transaction unresolved on a connection sqlx will reset.
async fn rollback(tx: Transaction<'static, Postgres>, ctx: &RequestContext) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(
            correlation_id = %ctx.correlation_id,
            error = %e,
            "Transaction rollback failed"
        );
    } else {
        tracing::debug!(correlation_id = %ctx.correlation_id, "Transaction rolled back");
    }
}
