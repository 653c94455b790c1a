use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{Listener, ListenerError, Sink};
use crate::domain::{
    format_amount, Account, AccountEvent, Cents, OperationKind, DEFAULT_CURRENCY,
};

/// Renders the current balance after each change.
pub struct BalanceDisplay {
    sink: Arc<dyn Sink>,
    currency: String,
}

impl BalanceDisplay {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self {
            sink,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Full balance view, shown on demand.
    pub fn show(&self, account: &Account) {
        self.sink.emit("ACCOUNT BALANCE");
        self.sink.emit(&format!("Owner: {}", account.owner()));
        self.sink.emit(&format!(
            "Current balance: {}",
            format_amount(account.balance(), &self.currency)
        ));
    }
}

impl Listener for BalanceDisplay {
    fn name(&self) -> &str {
        "display"
    }

    fn react(&self, source: &Account, event: &AccountEvent) -> Result<(), ListenerError> {
        self.sink.emit(&format!(
            "  [Balance] {}: {} -> balance {}",
            event.kind,
            format_amount(event.amount, &self.currency),
            format_amount(source.balance(), &self.currency)
        ));
        Ok(())
    }
}

/// Announces every new history entry.
pub struct HistoryFeed {
    sink: Arc<dyn Sink>,
}

impl HistoryFeed {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self { sink }
    }
}

impl Listener for HistoryFeed {
    fn name(&self) -> &str {
        "history"
    }

    fn react(&self, _source: &Account, event: &AccountEvent) -> Result<(), ListenerError> {
        self.sink.emit(&format!("  [History] New entry: {}", event.kind));
        Ok(())
    }
}

/// Balance classification against an alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Ok,
    /// Below twice the threshold
    Low,
    /// Below the threshold
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Ok => "OK",
            AlertLevel::Low => "low",
            AlertLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Signals when the balance falls below a threshold. Never changes the balance.
pub struct ThresholdAlert {
    threshold: Cents,
    sink: Arc<dyn Sink>,
    currency: String,
    level: Mutex<Option<AlertLevel>>,
}

impl ThresholdAlert {
    pub fn new(threshold: Cents, sink: Arc<dyn Sink>) -> Self {
        Self {
            threshold,
            sink,
            currency: DEFAULT_CURRENCY.to_string(),
            level: Mutex::new(None),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn threshold(&self) -> Cents {
        self.threshold
    }

    pub fn classify(&self, balance: Cents) -> AlertLevel {
        if balance < self.threshold {
            AlertLevel::Critical
        } else if balance < self.threshold.saturating_mul(2) {
            AlertLevel::Low
        } else {
            AlertLevel::Ok
        }
    }

    /// Level observed by the last reaction or check, if any.
    pub fn level(&self) -> Option<AlertLevel> {
        *self.level.lock()
    }

    /// Classify the account now and render the result, including the OK case.
    pub fn check(&self, account: &Account) -> AlertLevel {
        let balance = account.balance();
        let level = self.observe(balance);
        match level {
            AlertLevel::Ok => self.sink.emit(&format!(
                "Balance OK: {}",
                format_amount(balance, &self.currency)
            )),
            _ => self.render(level, balance),
        }
        level
    }

    fn observe(&self, balance: Cents) -> AlertLevel {
        let level = self.classify(balance);
        *self.level.lock() = Some(level);
        level
    }

    fn render(&self, level: AlertLevel, balance: Cents) {
        match level {
            AlertLevel::Critical => self.sink.emit(&format!(
                "  [ALERT] Critical balance! {} < {}",
                format_amount(balance, &self.currency),
                format_amount(self.threshold, &self.currency)
            )),
            AlertLevel::Low => self.sink.emit(&format!(
                "  [ALERT] Low balance: {} < {}",
                format_amount(balance, &self.currency),
                format_amount(self.threshold.saturating_mul(2), &self.currency)
            )),
            AlertLevel::Ok => {}
        }
    }
}

impl Listener for ThresholdAlert {
    fn name(&self) -> &str {
        "alert"
    }

    fn react(&self, source: &Account, _event: &AccountEvent) -> Result<(), ListenerError> {
        let balance = source.balance();
        let level = self.observe(balance);
        self.render(level, balance);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardVerdict {
    Validated,
    /// Withdrawal above the configured limit
    Large,
}

/// Counters kept by the withdrawal guard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlReport {
    pub deposit_count: u64,
    pub deposit_total: Cents,
    pub withdrawal_count: u64,
    pub withdrawal_total: Cents,
    pub large_withdrawals: u64,
}

/// Reviews withdrawals against a per-operation limit and keeps an audit tally.
pub struct WithdrawalGuard {
    limit: Cents,
    sink: Arc<dyn Sink>,
    currency: String,
    report: Mutex<ControlReport>,
}

impl WithdrawalGuard {
    pub fn new(limit: Cents, sink: Arc<dyn Sink>) -> Self {
        Self {
            limit,
            sink,
            currency: DEFAULT_CURRENCY.to_string(),
            report: Mutex::new(ControlReport::default()),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn limit(&self) -> Cents {
        self.limit
    }

    /// Verdict for a withdrawal event; `None` for deposits and openings.
    pub fn assess(&self, event: &AccountEvent) -> Option<GuardVerdict> {
        match event.kind {
            OperationKind::Withdrawal if event.amount > self.limit => Some(GuardVerdict::Large),
            OperationKind::Withdrawal => Some(GuardVerdict::Validated),
            OperationKind::Deposit | OperationKind::Opening => None,
        }
    }

    pub fn report(&self) -> ControlReport {
        self.report.lock().clone()
    }
}

impl Listener for WithdrawalGuard {
    fn name(&self) -> &str {
        "control"
    }

    fn react(&self, _source: &Account, event: &AccountEvent) -> Result<(), ListenerError> {
        let verdict = self.assess(event);
        {
            let mut report = self.report.lock();
            match event.kind {
                OperationKind::Deposit => {
                    report.deposit_count += 1;
                    report.deposit_total = report.deposit_total.saturating_add(event.amount);
                }
                OperationKind::Withdrawal => {
                    report.withdrawal_count += 1;
                    report.withdrawal_total = report.withdrawal_total.saturating_add(event.amount);
                    if verdict == Some(GuardVerdict::Large) {
                        report.large_withdrawals += 1;
                    }
                }
                OperationKind::Opening => {}
            }
        }

        match verdict {
            Some(GuardVerdict::Large) => self.sink.emit(&format!(
                "  [Control] Large withdrawal flagged: {} (limit {})",
                format_amount(event.amount, &self.currency),
                format_amount(self.limit, &self.currency)
            )),
            Some(GuardVerdict::Validated) => self.sink.emit(&format!(
                "  [Control] Withdrawal validated: {}",
                format_amount(event.amount, &self.currency)
            )),
            None => {}
        }
        Ok(())
    }
}

/// A message handed to the outbound notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub destination: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Stand-in for e-mail/SMS delivery: formats one message per event and keeps
/// it in an outbox instead of sending it.
pub struct ExternalNotificationStub {
    destination: String,
    sink: Arc<dyn Sink>,
    currency: String,
    outbox: Mutex<Vec<OutboundMessage>>,
}

impl ExternalNotificationStub {
    pub fn new(destination: impl Into<String>, sink: Arc<dyn Sink>) -> Self {
        Self {
            destination: destination.into(),
            sink,
            currency: DEFAULT_CURRENCY.to_string(),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Messages "sent" so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.outbox.lock().clone()
    }

    fn compose(&self, owner: &str, event: &AccountEvent) -> OutboundMessage {
        let action = match event.kind {
            OperationKind::Opening => "Account opened",
            OperationKind::Deposit => "Deposit",
            OperationKind::Withdrawal => "Withdrawal",
        };
        OutboundMessage {
            destination: self.destination.clone(),
            subject: format!("{} on your account", action),
            body: format!(
                "Hello {}, {} of {} recorded. New balance: {}.",
                owner,
                action.to_lowercase(),
                format_amount(event.amount, &self.currency),
                format_amount(event.balance, &self.currency)
            ),
            sent_at: Utc::now(),
        }
    }
}

impl Listener for ExternalNotificationStub {
    fn name(&self) -> &str {
        "notification"
    }

    fn react(&self, source: &Account, event: &AccountEvent) -> Result<(), ListenerError> {
        if self.destination.trim().is_empty() {
            return Err(ListenerError::new("no destination address configured"));
        }

        let message = self.compose(source.owner(), event);
        self.sink.emit(&format!(
            "  [Notification] To {}: {}",
            message.destination, message.subject
        ));
        self.outbox.lock().push(message);
        Ok(())
    }
}

/// Addresses the owner directly after each deposit or withdrawal.
pub struct OwnerMessage {
    sink: Arc<dyn Sink>,
    currency: String,
}

impl OwnerMessage {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self {
            sink,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

impl Listener for OwnerMessage {
    fn name(&self) -> &str {
        "message"
    }

    fn react(&self, source: &Account, event: &AccountEvent) -> Result<(), ListenerError> {
        let verb = match event.kind {
            OperationKind::Deposit => "deposited",
            OperationKind::Withdrawal => "withdrew",
            OperationKind::Opening => return Ok(()),
        };
        self.sink.emit(&format!(
            "  [Message] {}, you {} {} successfully!",
            source.owner(),
            verb,
            format_amount(event.amount, &self.currency)
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemorySink;

    fn setup(opening: Cents) -> (Account, Arc<MemorySink>) {
        (Account::open("Imed", opening).unwrap(), Arc::new(MemorySink::new()))
    }

    #[test]
    fn test_threshold_levels() {
        let (_, sink) = setup(0);
        let alert = ThresholdAlert::new(20000, sink);

        assert_eq!(alert.classify(120000), AlertLevel::Ok);
        assert_eq!(alert.classify(40000), AlertLevel::Ok);
        assert_eq!(alert.classify(39999), AlertLevel::Low);
        assert_eq!(alert.classify(20000), AlertLevel::Low);
        assert_eq!(alert.classify(19999), AlertLevel::Critical);
    }

    #[test]
    fn test_threshold_alert_reacts_to_withdrawal() {
        let (account, sink) = setup(120000);
        let alert = Arc::new(ThresholdAlert::new(20000, sink.clone()));
        account.attach(&alert);

        assert_eq!(alert.check(&account), AlertLevel::Ok);
        assert_eq!(alert.level().unwrap().to_string(), "OK");
        sink.take();

        account.withdraw(105000).unwrap();

        assert_eq!(alert.level(), Some(AlertLevel::Critical));
        assert_eq!(alert.level().unwrap().to_string(), "critical");
        assert_eq!(
            sink.lines(),
            vec!["  [ALERT] Critical balance! 150.00DT < 200.00DT".to_string()]
        );
        assert_eq!(account.balance(), 15000);
    }

    #[test]
    fn test_display_renders_balance() {
        let (account, sink) = setup(100000);
        let display = Arc::new(BalanceDisplay::new(sink.clone()).with_currency(" EUR"));
        account.attach(&display);

        account.deposit(50000).unwrap();

        assert_eq!(
            sink.take(),
            vec!["  [Balance] DEPOSIT: 500.00 EUR -> balance 1500.00 EUR".to_string()]
        );

        display.show(&account);
        assert_eq!(sink.lines()[2], "Current balance: 1500.00 EUR");
    }

    #[test]
    fn test_withdrawal_guard_flags_large_amounts() {
        let (account, sink) = setup(100000);
        let guard = Arc::new(WithdrawalGuard::new(50000, sink.clone()));
        account.attach(&guard);

        account.deposit(90000).unwrap();
        account.withdraw(20000).unwrap();
        account.withdraw(60000).unwrap();

        assert_eq!(
            sink.lines(),
            vec![
                "  [Control] Withdrawal validated: 200.00DT".to_string(),
                "  [Control] Large withdrawal flagged: 600.00DT (limit 500.00DT)".to_string(),
            ]
        );
        assert_eq!(
            guard.report(),
            ControlReport {
                deposit_count: 1,
                deposit_total: 90000,
                withdrawal_count: 2,
                withdrawal_total: 80000,
                large_withdrawals: 1,
            }
        );
    }

    #[test]
    fn test_withdrawal_guard_totals_saturate() {
        let (account, sink) = setup(i64::MAX);
        let guard = Arc::new(WithdrawalGuard::new(i64::MAX, sink));
        account.attach(&guard);

        account.withdraw(i64::MAX).unwrap();
        account.deposit(i64::MAX).unwrap();
        account.withdraw(i64::MAX).unwrap();
        account.deposit(i64::MAX).unwrap();

        let report = guard.report();
        assert_eq!(report.withdrawal_count, 2);
        assert_eq!(report.withdrawal_total, i64::MAX);
        assert_eq!(report.deposit_total, i64::MAX);
    }

    #[test]
    fn test_withdrawal_guard_ignores_large_deposits() {
        let (_, sink) = setup(0);
        let guard = WithdrawalGuard::new(100, sink);
        let deposit = AccountEvent {
            kind: OperationKind::Deposit,
            amount: 1_000_000,
            balance: 1_000_000,
        };
        let withdrawal = AccountEvent {
            kind: OperationKind::Withdrawal,
            amount: 100,
            balance: 0,
        };

        assert_eq!(guard.assess(&deposit), None);
        assert_eq!(guard.assess(&withdrawal), Some(GuardVerdict::Validated));
    }

    #[test]
    fn test_notification_stub_records_outbox() {
        let (account, sink) = setup(10000);
        let notifier = Arc::new(ExternalNotificationStub::new("imed@example.com", sink.clone()));
        account.attach(&notifier);

        account.deposit(2500).unwrap();
        account.withdraw(500).unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].destination, "imed@example.com");
        assert_eq!(sent[0].subject, "Deposit on your account");
        assert_eq!(
            sent[1].body,
            "Hello Imed, withdrawal of 5.00DT recorded. New balance: 120.00DT."
        );
        assert_eq!(
            sink.lines()[0],
            "  [Notification] To imed@example.com: Deposit on your account"
        );
    }

    #[test]
    fn test_notification_stub_without_destination_fails() {
        let (account, sink) = setup(10000);
        let notifier = Arc::new(ExternalNotificationStub::new("  ", sink));
        account.attach(&notifier);

        let err = account.deposit(100).unwrap_err();
        assert!(err.to_string().contains("no destination address configured"));
        assert!(notifier.sent().is_empty());
        assert_eq!(account.balance(), 10100);
    }

    #[test]
    fn test_owner_message_and_history_feed() {
        let (account, sink) = setup(10000);
        let feed = Arc::new(HistoryFeed::new(sink.clone()));
        let message = Arc::new(OwnerMessage::new(sink.clone()));
        account.attach(&feed);
        account.attach(&message);

        account.withdraw(2500).unwrap();

        assert_eq!(
            sink.lines(),
            vec![
                "  [History] New entry: WITHDRAWAL".to_string(),
                "  [Message] Imed, you withdrew 25.00DT successfully!".to_string(),
            ]
        );
    }
}
