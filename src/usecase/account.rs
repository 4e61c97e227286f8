//! Account use cases
//!
//! Account lookup and the transactional money transfer.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    Account, Amount, DomainError, RequestContext, TransferReceipt, TransferRecord,
};
use crate::error::{AppError, AppResult};
use crate::repository::{AccountRepository, TransferRecordRepository};
use crate::service::can_transfer;
use crate::unit_of_work::UnitOfWork;

/// Operations exposed to the CLI and the HTTP API.
#[async_trait]
pub trait AccountUseCase: Send + Sync {
    /// Look up one account without opening a transaction
    async fn find_account(&self, ctx: &RequestContext, id: &str) -> AppResult<Account>;

    /// Move `amount` from `from_id` to `to_id` and record it, atomically
    async fn transfer(
        &self,
        ctx: &RequestContext,
        from_id: &str,
        to_id: &str,
        amount: Amount,
    ) -> AppResult<TransferReceipt>;
}

/// Progress of a transfer, reported through tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    Started,
    FromFetched,
    ToFetched,
    EligibilityChecked,
    Authorized,
    BalancesUpdated,
    RecordInserted,
    Committed,
    Rejected,
    Failed,
}

impl TransferStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStage::Started => "started",
            TransferStage::FromFetched => "from_fetched",
            TransferStage::ToFetched => "to_fetched",
            TransferStage::EligibilityChecked => "eligibility_checked",
            TransferStage::Authorized => "authorized",
            TransferStage::BalancesUpdated => "balances_updated",
            TransferStage::RecordInserted => "record_inserted",
            TransferStage::Committed => "committed",
            TransferStage::Rejected => "rejected",
            TransferStage::Failed => "failed",
        }
    }
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// [`AccountUseCase`] over any unit of work and matching repositories.
pub struct AccountService<U, A, R> {
    unit_of_work: U,
    accounts: Arc<A>,
    records: Arc<R>,
}

impl<U, A, R> AccountService<U, A, R>
where
    U: UnitOfWork,
    A: AccountRepository<U::Handle> + 'static,
    R: TransferRecordRepository<U::Handle> + 'static,
{
    pub fn new(unit_of_work: U, accounts: A, records: R) -> Self {
        Self {
            unit_of_work,
            accounts: Arc::new(accounts),
            records: Arc::new(records),
        }
    }

    pub fn unit_of_work(&self) -> &U {
        &self.unit_of_work
    }
}

#[async_trait]
impl<U, A, R> AccountUseCase for AccountService<U, A, R>
where
    U: UnitOfWork,
    A: AccountRepository<U::Handle> + 'static,
    R: TransferRecordRepository<U::Handle> + 'static,
{
    async fn find_account(&self, ctx: &RequestContext, id: &str) -> AppResult<Account> {
        let accounts = Arc::clone(&self.accounts);
        let id = id.to_string();

        self.unit_of_work
            .execute(ctx, move |handle| {
                Box::pin(async move { accounts.find_by_id(handle, &id).await })
            })
            .await
    }

    async fn transfer(
        &self,
        ctx: &RequestContext,
        from_id: &str,
        to_id: &str,
        amount: Amount,
    ) -> AppResult<TransferReceipt> {
        let correlation_id = ctx.correlation_id;

        if from_id == to_id {
            tracing::info!(
                %correlation_id,
                from_id,
                stage = %TransferStage::Rejected,
                "Transfer rejected: same account"
            );
            return Err(DomainError::SameAccountTransfer.into());
        }

        let accounts = Arc::clone(&self.accounts);
        let records = Arc::clone(&self.records);
        let from = from_id.to_string();
        let to = to_id.to_string();

        let result = self
            .unit_of_work
            .execute_in_transaction(ctx, move |handle| {
                Box::pin(async move {
                    let mut stage = TransferStage::Started;
                    let result = transfer_steps(
                        accounts.as_ref(),
                        records.as_ref(),
                        handle,
                        &from,
                        &to,
                        amount,
                        &mut stage,
                    )
                    .await;

                    if let Err(err) = &result {
                        let outcome = if err.is_rejection() {
                            TransferStage::Rejected
                        } else {
                            TransferStage::Failed
                        };
                        tracing::debug!(
                            %correlation_id,
                            last_stage = %stage,
                            stage = %outcome,
                            error = %err,
                            "Transfer aborted, rolling back"
                        );
                    }

                    result
                })
            })
            .await;

        match &result {
            Ok(receipt) => tracing::info!(
                %correlation_id,
                from_id,
                to_id,
                amount = amount.value(),
                from_balance = receipt.from_balance,
                to_balance = receipt.to_balance,
                stage = %TransferStage::Committed,
                "Transfer committed"
            ),
            Err(err) if err.is_rejection() => tracing::info!(
                %correlation_id,
                from_id,
                to_id,
                amount = amount.value(),
                stage = %TransferStage::Rejected,
                error = %err,
                "Transfer rejected"
            ),
            Err(err) => tracing::warn!(
                %correlation_id,
                from_id,
                to_id,
                amount = amount.value(),
                stage = %TransferStage::Failed,
                error = %err,
                "Transfer failed"
            ),
        }

        result
    }
}

/// The body of a transfer, run inside the transaction. `stage` is left at
/// the last stage reached.
async fn transfer_steps<H, A, R>(
    accounts: &A,
    records: &R,
    handle: &mut H,
    from_id: &str,
    to_id: &str,
    amount: Amount,
    stage: &mut TransferStage,
) -> AppResult<TransferReceipt>
where
    H: Send,
    A: AccountRepository<H> + ?Sized,
    R: TransferRecordRepository<H> + ?Sized,
{
    let from = accounts.find_by_id(handle, from_id).await?;
    *stage = TransferStage::FromFetched;

    let to = accounts.find_by_id(handle, to_id).await?;
    *stage = TransferStage::ToFetched;

    let eligible = can_transfer(&from, amount);
    *stage = TransferStage::EligibilityChecked;
    if !eligible {
        return Err(DomainError::insufficient_funds(amount.value(), from.balance).into());
    }
    *stage = TransferStage::Authorized;

    let from_balance = from.balance - amount.value();
    let to_balance = to
        .balance
        .checked_add(amount.value())
        .ok_or_else(|| AppError::from(DomainError::BalanceOverflow(to.id.clone())))?;

    accounts.update_balance(handle, &from.id, from_balance).await?;
    accounts.update_balance(handle, &to.id, to_balance).await?;
    *stage = TransferStage::BalancesUpdated;

    let record = TransferRecord::new(&from, &to, amount);
    records.insert(handle, &record).await?;
    *stage = TransferStage::RecordInserted;

    Ok(TransferReceipt {
        record,
        from_balance,
        to_balance,
    })
}
