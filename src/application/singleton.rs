//! Process-wide single account.
//!
//! The first `get_or_create` call constructs the account; every later call
//! returns that same instance and ignores the owner and opening balance it was
//! given. That mirrors how the account behaves when treated as a singleton and
//! is surprising on purpose: callers that need a fresh account in tests must
//! `reset` first.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::{Account, AccountError, Cents};

/// A slot holding at most one account.
pub struct AccountSlot {
    slot: RwLock<Option<Arc<Account>>>,
}

impl AccountSlot {
    pub const fn new() -> Self {
        Self {
            slot: parking_lot::const_rwlock(None),
        }
    }

    /// Return the held account, constructing it on first use.
    ///
    /// Concurrent first calls construct exactly one account: the state is
    /// re-checked after acquiring the write lock.
    pub fn get_or_create(
        &self,
        owner: &str,
        opening_balance: Cents,
    ) -> Result<Arc<Account>, AccountError> {
        if let Some(existing) = self.current() {
            log_ignored(&existing, owner, opening_balance);
            return Ok(existing);
        }

        let mut slot = self.slot.write();
        if let Some(existing) = slot.as_ref() {
            log_ignored(existing, owner, opening_balance);
            return Ok(Arc::clone(existing));
        }

        let account = Arc::new(Account::open(owner, opening_balance)?);
        *slot = Some(Arc::clone(&account));
        info!(owner, opening_balance, "single account instance created");
        Ok(account)
    }

    pub fn get_existing(&self) -> Result<Arc<Account>, AccountError> {
        self.current().ok_or(AccountError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Drop the held account so that the next `get_or_create` builds a new one.
    pub fn reset(&self) {
        if self.slot.write().take().is_some() {
            debug!("single account instance discarded");
        }
    }

    fn current(&self) -> Option<Arc<Account>> {
        self.slot.read().clone()
    }
}

impl Default for AccountSlot {
    fn default() -> Self {
        Self::new()
    }
}

fn log_ignored(existing: &Account, owner: &str, opening_balance: Cents) {
    debug!(
        existing_owner = existing.owner(),
        requested_owner = owner,
        requested_opening = opening_balance,
        "account already exists, construction arguments ignored"
    );
}

static ACCOUNT: AccountSlot = AccountSlot::new();

/// Process-wide `AccountSlot::get_or_create`.
pub fn get_or_create(owner: &str, opening_balance: Cents) -> Result<Arc<Account>, AccountError> {
    ACCOUNT.get_or_create(owner, opening_balance)
}

/// Process-wide account, or `AccountError::NotInitialized`.
pub fn get_existing() -> Result<Arc<Account>, AccountError> {
    ACCOUNT.get_existing()
}

pub fn is_initialized() -> bool {
    ACCOUNT.is_initialized()
}

/// Discard the process-wide account. Intended for test isolation.
pub fn reset() {
    ACCOUNT.reset()
}
