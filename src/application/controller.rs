use std::sync::Arc;

use crate::domain::{format_amount, Account, AccountError, Cents, Operation};

/// Result of a command routed through the controller, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    fn ok(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

/// Call surface for clients (CLI, tests): every mutation goes through here.
/// Holds no state of its own beyond the account handle and a currency label.
pub struct AccountController {
    account: Arc<Account>,
    currency: String,
}

impl AccountController {
    pub fn new(account: Arc<Account>, currency: impl Into<String>) -> Self {
        Self {
            account,
            currency: currency.into(),
        }
    }

    pub fn account(&self) -> &Arc<Account> {
        &self.account
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn owner(&self) -> &str {
        self.account.owner()
    }

    pub fn deposit(&self, amount: Cents) -> Outcome {
        let done = format!("Deposit of {} completed", self.amount(amount));
        self.outcome(self.account.deposit(amount), done)
    }

    pub fn withdraw(&self, amount: Cents) -> Outcome {
        let done = format!("Withdrawal of {} completed", self.amount(amount));
        self.outcome(self.account.withdraw(amount), done)
    }

    pub fn balance(&self) -> Cents {
        self.account.balance()
    }

    pub fn history(&self) -> Vec<Operation> {
        self.account.history()
    }

    fn outcome(&self, result: Result<Cents, AccountError>, done: String) -> Outcome {
        match result {
            Ok(_) => Outcome::ok(done),
            Err(AccountError::InvalidAmount(_)) => {
                Outcome::failed("Amount must be positive".to_string())
            }
            Err(AccountError::InsufficientFunds { balance, .. }) => {
                Outcome::failed(format!("Insufficient funds ({})", self.amount(balance)))
            }
            Err(AccountError::BalanceOverflow { .. }) => {
                Outcome::failed("Amount too large for this account".to_string())
            }
            // The mutation is committed even though a listener failed
            Err(err @ AccountError::ListenerFailed { .. }) => {
                Outcome::ok(format!("{} (notification interrupted: {})", done, err))
            }
            Err(err) => Outcome::failed(err.to_string()),
        }
    }

    fn amount(&self, cents: Cents) -> String {
        format_amount(cents, &self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{ExternalNotificationStub, MemorySink};

    fn controller(opening: Cents) -> AccountController {
        let account = Arc::new(Account::open("Imed", opening).unwrap());
        AccountController::new(account, "DT")
    }

    #[test]
    fn test_deposit_outcome() {
        let controller = controller(100000);
        let outcome = controller.deposit(50000);

        assert!(outcome.success);
        assert_eq!(outcome.message, "Deposit of 500.00DT completed");
        assert_eq!(controller.balance(), 150000);
    }

    #[test]
    fn test_withdraw_outcomes() {
        let controller = controller(120000);

        let outcome = controller.withdraw(200000);
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Insufficient funds (1200.00DT)");

        let outcome = controller.withdraw(0);
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Amount must be positive");

        let outcome = controller.withdraw(30000);
        assert!(outcome.success);
        assert_eq!(outcome.message, "Withdrawal of 300.00DT completed");
        assert_eq!(controller.history().len(), 2);
    }

    #[test]
    fn test_listener_failure_reports_committed_mutation() {
        let controller = controller(1000);
        let notifier = Arc::new(ExternalNotificationStub::new("", Arc::new(MemorySink::new())));
        controller.account().attach(&notifier);

        let outcome = controller.deposit(500);
        assert!(outcome.success);
        assert!(
            outcome
                .message
                .starts_with("Deposit of 5.00DT completed (notification interrupted:")
        );
        assert_eq!(controller.balance(), 1500);
    }
}
