use thiserror::Error;

use crate::domain::Cents;
use crate::notify::ListenerError;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Invalid amount: {0} cents (must be positive)")]
    InvalidAmount(Cents),

    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Cents, requested: Cents },

    #[error("Balance overflow: balance {balance}, deposit {requested}")]
    BalanceOverflow { balance: Cents, requested: Cents },

    #[error("Account has not been initialized")]
    NotInitialized,

    /// The mutation was committed, but a listener aborted the notification pass.
    #[error("Listener '{listener}' failed: {reason}")]
    ListenerFailed {
        listener: String,
        #[source]
        reason: ListenerError,
    },
}

impl AccountError {
    /// Returns true if the operation that produced this error left the account unchanged.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, AccountError::ListenerFailed { .. })
    }
}
