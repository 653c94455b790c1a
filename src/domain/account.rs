use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{AccountError, AccountEvent, Cents, Operation, OperationKind};
use crate::notify::{Listener, NotificationHub};

/// A single bank account: an owner, a balance that never goes negative, and an
/// append-only history of operations.
///
/// Every committed deposit or withdrawal is broadcast to the attached listeners,
/// synchronously and in registration order, after the balance lock is released.
/// Listeners may read the account from `react` but must not call `deposit` or
/// `withdraw` on it.
pub struct Account {
    owner: String,
    state: Mutex<LedgerState>,
    hub: NotificationHub,
}

/// Balance and history live under one lock so that a balance change and its
/// history entry are never observed apart.
#[derive(Debug, Default)]
struct LedgerState {
    balance: Cents,
    history: Vec<Operation>,
}

impl LedgerState {
    /// Apply and record an operation. Callers have already checked that the
    /// new balance is representable and not negative.
    fn record(&mut self, kind: OperationKind, new_balance: Cents, amount: Cents) -> AccountEvent {
        self.balance = new_balance;
        let sequence = self.history.len() as u64 + 1;
        let op = Operation::new(sequence, kind, amount, self.balance);
        let event = AccountEvent::from(&op);
        self.history.push(op);
        event
    }
}

impl Account {
    /// Open an account. A positive opening balance is recorded as an OPENING operation.
    pub fn open(owner: impl Into<String>, opening_balance: Cents) -> Result<Self, AccountError> {
        if opening_balance < 0 {
            return Err(AccountError::InvalidAmount(opening_balance));
        }

        let mut state = LedgerState::default();
        if opening_balance > 0 {
            state.record(OperationKind::Opening, opening_balance, opening_balance);
        }

        let owner = owner.into();
        debug!(owner = %owner, opening_balance, "account opened");

        Ok(Self {
            owner,
            state: Mutex::new(state),
            hub: NotificationHub::new(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn balance(&self) -> Cents {
        self.state.lock().balance
    }

    /// Snapshot of the history. The returned vector is owned by the caller.
    pub fn history(&self) -> Vec<Operation> {
        self.state.lock().history.clone()
    }

    /// Deposit a positive amount and return the new balance.
    ///
    /// If a listener fails during the broadcast the deposit stays committed and
    /// `AccountError::ListenerFailed` is returned.
    pub fn deposit(&self, amount: Cents) -> Result<Cents, AccountError> {
        if amount <= 0 {
            warn!(owner = %self.owner, amount, "deposit rejected: non-positive amount");
            return Err(AccountError::InvalidAmount(amount));
        }

        let event = {
            let mut state = self.state.lock();
            let Some(new_balance) = state.balance.checked_add(amount) else {
                warn!(
                    owner = %self.owner,
                    amount,
                    balance = state.balance,
                    "deposit rejected: balance overflow"
                );
                return Err(AccountError::BalanceOverflow {
                    balance: state.balance,
                    requested: amount,
                });
            };
            state.record(OperationKind::Deposit, new_balance, amount)
        };
        debug!(owner = %self.owner, amount, balance = event.balance, "deposit committed");

        self.hub.broadcast(self, &event)?;
        Ok(event.balance)
    }

    /// Withdraw a positive amount not exceeding the balance and return the new balance.
    pub fn withdraw(&self, amount: Cents) -> Result<Cents, AccountError> {
        if amount <= 0 {
            warn!(owner = %self.owner, amount, "withdrawal rejected: non-positive amount");
            return Err(AccountError::InvalidAmount(amount));
        }

        let event = {
            let mut state = self.state.lock();
            if amount > state.balance {
                warn!(
                    owner = %self.owner,
                    amount,
                    balance = state.balance,
                    "withdrawal rejected: insufficient funds"
                );
                return Err(AccountError::InsufficientFunds {
                    balance: state.balance,
                    requested: amount,
                });
            }
            let new_balance = state.balance - amount;
            state.record(OperationKind::Withdrawal, new_balance, amount)
        };
        debug!(owner = %self.owner, amount, balance = event.balance, "withdrawal committed");

        self.hub.broadcast(self, &event)?;
        Ok(event.balance)
    }

    /// Register a listener. Returns false if it was already attached.
    /// The account keeps only a weak reference; the caller owns the listener.
    pub fn attach<L: Listener + 'static>(&self, listener: &Arc<L>) -> bool {
        self.hub.attach(listener)
    }

    /// Unregister a listener. Returns false if it was not attached.
    pub fn detach<L: Listener + 'static>(&self, listener: &Arc<L>) -> bool {
        self.hub.detach(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.hub.len()
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Account")
            .field("owner", &self.owner)
            .field("balance", &state.balance)
            .field("operations", &state.history.len())
            .field("listeners", &self.hub.len())
            .finish()
    }
}
