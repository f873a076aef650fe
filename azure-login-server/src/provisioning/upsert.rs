use crate::store::{AccountRecord, AccountStore, AccountUpdate, StoreError};
use log::debug;

/// How an upsert converged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Updated(AccountRecord),
    Created(AccountRecord),
}

impl UpsertOutcome {
    pub fn record(&self) -> &AccountRecord {
        match self {
            UpsertOutcome::Updated(record) | UpsertOutcome::Created(record) => record,
        }
    }
}

/// Steps of the update-then-create account upsert.
///
/// `AttemptUpdate` moves to `Done` on success, to `Create` when the account
/// does not exist and to `Failed` on any other error. `Create` moves to
/// `Done` or `Failed`. There is no way back from `Create` to `AttemptUpdate`.
#[derive(Debug)]
pub enum UpsertStep {
    AttemptUpdate,
    Create,
    Done(UpsertOutcome),
    Failed(StoreError),
}

impl UpsertStep {
    /// Transition taken from `AttemptUpdate` given the update result
    pub fn after_update(result: Result<AccountRecord, StoreError>) -> Self {
        match result {
            Ok(record) => UpsertStep::Done(UpsertOutcome::Updated(record)),
            Err(StoreError::AccountNotFound(_)) => UpsertStep::Create,
            Err(err) => UpsertStep::Failed(err),
        }
    }

    /// Transition taken from `Create` given the create result
    pub fn after_create(result: Result<AccountRecord, StoreError>) -> Self {
        match result {
            Ok(record) => UpsertStep::Done(UpsertOutcome::Created(record)),
            Err(err) => UpsertStep::Failed(err),
        }
    }
}

/// Refreshes the display name of `record.uid`, creating the account from
/// `record` if it does not exist yet.
pub async fn upsert_account(
    store: &dyn AccountStore,
    record: &AccountRecord,
) -> Result<UpsertOutcome, StoreError> {
    let update = AccountUpdate {
        display_name: record.display_name.clone(),
    };

    let mut step = UpsertStep::AttemptUpdate;
    loop {
        step = match step {
            UpsertStep::AttemptUpdate => {
                UpsertStep::after_update(store.update_account(&record.uid, &update).await)
            }
            UpsertStep::Create => {
                debug!("Account {} not found, creating it", record.uid);
                UpsertStep::after_create(store.create_account(record).await)
            }
            UpsertStep::Done(outcome) => return Ok(outcome),
            UpsertStep::Failed(err) => return Err(err),
        };
    }
}
