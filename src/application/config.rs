use thiserror::Error;

use crate::domain::{Cents, DEFAULT_CURRENCY};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Owner name cannot be empty")]
    EmptyOwner,

    #[error("Opening balance cannot be negative: {0}")]
    NegativeOpening(Cents),

    #[error("Alert threshold cannot be negative: {0}")]
    NegativeThreshold(Cents),

    #[error("Withdrawal limit cannot be negative: {0}")]
    NegativeLimit(Cents),
}

/// Settings used to assemble an account session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountConfig {
    pub owner: String,
    pub opening_balance: Cents,
    pub alert_threshold: Cents,
    /// Withdrawals above this amount are flagged; no guard when `None`
    pub withdrawal_limit: Option<Cents>,
    /// Destination for outbound notifications; no notifier when `None`
    pub notify: Option<String>,
    pub currency: String,
}

impl AccountConfig {
    pub fn new(owner: impl Into<String>, opening_balance: Cents) -> Self {
        Self {
            owner: owner.into(),
            opening_balance,
            alert_threshold: 10000,
            withdrawal_limit: None,
            notify: None,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_alert_threshold(mut self, threshold: Cents) -> Self {
        self.alert_threshold = threshold;
        self
    }

    pub fn with_withdrawal_limit(mut self, limit: Cents) -> Self {
        self.withdrawal_limit = Some(limit);
        self
    }

    pub fn with_notify(mut self, destination: impl Into<String>) -> Self {
        self.notify = Some(destination.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.trim().is_empty() {
            return Err(ConfigError::EmptyOwner);
        }
        if self.opening_balance < 0 {
            return Err(ConfigError::NegativeOpening(self.opening_balance));
        }
        if self.alert_threshold < 0 {
            return Err(ConfigError::NegativeThreshold(self.alert_threshold));
        }
        if let Some(limit) = self.withdrawal_limit.filter(|l| *l < 0) {
            return Err(ConfigError::NegativeLimit(limit));
        }
        Ok(())
    }
}
