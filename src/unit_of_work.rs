//! Unit of Work
//!
//! Scoped execution of data-access code against one pooled connection.
//! Callers never see begin/commit/rollback: they hand over a function and
//! the manager resolves the connection and transaction on every exit path.

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::domain::RequestContext;
use crate::error::AppResult;

/// Future returned by a unit-of-work function, borrowing the handle for `'h`.
pub type Work<'h, T> = BoxFuture<'h, AppResult<T>>;

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Connection type passed to the function
    type Handle: Send;

    /// Run `work` on one acquired connection, without a transaction.
    ///
    /// The connection is released when this returns, whatever the outcome.
    /// Acquisition and `work` are abandoned with `AppError::Cancelled` when
    /// the context is cancelled.
    async fn execute<T, F>(&self, ctx: &RequestContext, work: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: for<'h> FnOnce(&'h mut Self::Handle) -> Work<'h, T> + Send + 'static;

    /// Run `work` inside a transaction.
    ///
    /// - `work` fails: rollback, the error is returned unchanged
    /// - `work` succeeds: commit, a commit failure is returned
    /// - `work` panics: rollback, then the panic resumes
    /// - context cancelled before COMMIT is sent: rollback, `AppError::Cancelled`
    ///
    /// A commit in flight is always awaited to completion.
    async fn execute_in_transaction<T, F>(&self, ctx: &RequestContext, work: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: for<'h> FnOnce(&'h mut Self::Handle) -> Work<'h, T> + Send + 'static;
}
