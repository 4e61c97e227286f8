//! In-memory adapters
//!
//! A process-local store implementing the same contracts as the PostgreSQL
//! adapters. Transactions stage their writes in a private snapshot that is
//! published on commit. A commit fails when another write landed since the
//! snapshot was taken, which mirrors the optimistic commit-time checks of
//! DSQL at whole-store granularity.

use std::collections::BTreeMap;
use std::panic::{resume_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::domain::{Account, RequestContext, TransferRecord};
use crate::error::{AppError, AppResult};
use crate::repository::{AccountRepository, TransferRecordRepository};
use crate::unit_of_work::{UnitOfWork, Work};

const DEFAULT_MAX_CONNECTIONS: usize = 10;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    accounts: BTreeMap<String, Account>,
    records: Vec<TransferRecord>,
    version: u64,
}

/// Shared in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account outside any unit of work
    pub fn seed(&self, account: Account) {
        let mut state = self.lock();
        state.accounts.insert(account.id.clone(), account);
        state.version += 1;
    }

    pub fn account(&self, id: &str) -> Option<Account> {
        self.lock().accounts.get(id).cloned()
    }

    pub fn balance(&self, id: &str) -> Option<i64> {
        self.account(id).map(|account| account.balance)
    }

    /// All committed transfer records, oldest first
    pub fn records(&self) -> Vec<TransferRecord> {
        self.lock().records.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle passed to in-memory repositories.
///
/// Holds a connection slot for its whole lifetime.
#[derive(Debug)]
pub struct MemorySession {
    db: MemoryDatabase,
    staged: Option<MemoryState>,
    _permit: OwnedSemaphorePermit,
}

impl MemorySession {
    pub fn in_transaction(&self) -> bool {
        self.staged.is_some()
    }

    fn read<R>(&self, f: impl FnOnce(&MemoryState) -> R) -> R {
        match &self.staged {
            Some(staged) => f(staged),
            None => f(&self.db.lock()),
        }
    }

    fn write<R>(&mut self, f: impl FnOnce(&mut MemoryState) -> R) -> R {
        match &mut self.staged {
            Some(staged) => f(staged),
            None => {
                let mut state = self.db.lock();
                state.version += 1;
                f(&mut state)
            }
        }
    }

    fn begin(&mut self) {
        self.staged = Some(self.db.lock().clone());
    }

    fn commit(&mut self) -> AppResult<()> {
        let Some(staged) = self.staged.take() else {
            return Ok(());
        };

        let mut state = self.db.lock();
        if state.version != staged.version {
            return Err(AppError::Persistence(
                "serialization failure: concurrent commit".to_string(),
            ));
        }

        *state = staged;
        state.version += 1;
        Ok(())
    }

    fn rollback(&mut self) {
        self.staged = None;
    }
}

/// Unit of work over a [`MemoryDatabase`] with a bounded number of
/// concurrent sessions.
#[derive(Debug, Clone)]
pub struct MemoryUnitOfWork {
    db: MemoryDatabase,
    connections: Arc<Semaphore>,
}

impl MemoryUnitOfWork {
    pub fn new(db: MemoryDatabase) -> Self {
        Self::with_max_connections(db, DEFAULT_MAX_CONNECTIONS)
    }

    pub fn with_max_connections(db: MemoryDatabase, max_connections: usize) -> Self {
        Self {
            db,
            connections: Arc::new(Semaphore::new(max_connections)),
        }
    }

    pub fn database(&self) -> &MemoryDatabase {
        &self.db
    }

    /// Stop handing out sessions; pending and later acquisitions fail
    pub fn close(&self) {
        self.connections.close();
    }

    async fn acquire(&self, ctx: &RequestContext) -> AppResult<MemorySession> {
        let permit = ctx
            .run(Arc::clone(&self.connections).acquire_owned())
            .await?
            .map_err(|_| AppError::Database(sqlx::Error::PoolClosed))?;

        Ok(MemorySession {
            db: self.db.clone(),
            staged: None,
            _permit: permit,
        })
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    type Handle = MemorySession;

    async fn execute<T, F>(&self, ctx: &RequestContext, work: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: for<'h> FnOnce(&'h mut Self::Handle) -> Work<'h, T> + Send + 'static,
    {
        let mut session = self.acquire(ctx).await?;
        let outcome = ctx.run(work(&mut session)).await;
        outcome?
    }

    async fn execute_in_transaction<T, F>(&self, ctx: &RequestContext, work: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: for<'h> FnOnce(&'h mut Self::Handle) -> Work<'h, T> + Send + 'static,
    {
        let mut session = self.acquire(ctx).await?;
        session.begin();

        let handle = &mut session;
        let outcome = ctx
            .run(AssertUnwindSafe(async move { work(handle).await }).catch_unwind())
            .await;

        match outcome {
            Ok(Ok(Ok(_))) if ctx.is_cancelled() => {
                session.rollback();
                Err(AppError::Cancelled)
            }
            Ok(Ok(Ok(value))) => {
                session.commit()?;
                Ok(value)
            }
            Ok(Ok(Err(err))) => {
                session.rollback();
                Err(err)
            }
            Ok(Err(panic)) => {
                session.rollback();
                resume_unwind(panic)
            }
            Err(cancelled) => {
                session.rollback();
                Err(AppError::from(cancelled))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryAccountRepository;

#[async_trait]
impl AccountRepository<MemorySession> for MemoryAccountRepository {
    async fn find_by_id(&self, handle: &mut MemorySession, id: &str) -> AppResult<Account> {
        handle
            .read(|state| state.accounts.get(id).cloned())
            .ok_or_else(|| AppError::AccountNotFound(id.to_string()))
    }

    async fn update_balance(&self, handle: &mut MemorySession, id: &str, balance: i64) -> AppResult<()> {
        handle.write(|state| match state.accounts.get_mut(id) {
            Some(account) => {
                account.balance = balance;
                Ok(())
            }
            None => Err(AppError::NoRowsAffected(id.to_string())),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryTransferRecordRepository;

#[async_trait]
impl TransferRecordRepository<MemorySession> for MemoryTransferRecordRepository {
    async fn insert(&self, handle: &mut MemorySession, record: &TransferRecord) -> AppResult<()> {
        handle.write(|state| state.records.push(record.clone()));
        Ok(())
    }
}
