use std::sync::Arc;

use super::{AccountConfig, AccountController};
use crate::domain::Account;
use crate::notify::{
    BalanceDisplay, ExternalNotificationStub, HistoryFeed, OwnerMessage, Sink, ThresholdAlert,
    WithdrawalGuard,
};

/// An account wired to its controller and listeners.
///
/// The session owns the listeners; the account only holds weak references to
/// them, so dropping the session silences all notifications.
pub struct Session {
    pub controller: AccountController,
    pub display: Arc<BalanceDisplay>,
    pub history_feed: Arc<HistoryFeed>,
    pub alert: Arc<ThresholdAlert>,
    pub messages: Arc<OwnerMessage>,
    pub guard: Option<Arc<WithdrawalGuard>>,
    pub notifier: Option<Arc<ExternalNotificationStub>>,
}

impl Session {
    /// Attach the configured listeners to `account`, in display order.
    pub fn assemble(config: &AccountConfig, account: Arc<Account>, sink: Arc<dyn Sink>) -> Self {
        let currency = config.currency.as_str();

        let display = Arc::new(BalanceDisplay::new(sink.clone()).with_currency(currency));
        let history_feed = Arc::new(HistoryFeed::new(sink.clone()));
        let alert = Arc::new(
            ThresholdAlert::new(config.alert_threshold, sink.clone()).with_currency(currency),
        );
        let messages = Arc::new(OwnerMessage::new(sink.clone()).with_currency(currency));
        let guard = config.withdrawal_limit.map(|limit| {
            Arc::new(WithdrawalGuard::new(limit, sink.clone()).with_currency(currency))
        });
        let notifier = config.notify.as_ref().map(|destination| {
            Arc::new(
                ExternalNotificationStub::new(destination.clone(), sink.clone())
                    .with_currency(currency),
            )
        });

        account.attach(&display);
        account.attach(&history_feed);
        account.attach(&alert);
        account.attach(&messages);
        if let Some(guard) = &guard {
            account.attach(guard);
        }
        if let Some(notifier) = &notifier {
            account.attach(notifier);
        }

        Self {
            controller: AccountController::new(account, currency),
            display,
            history_feed,
            alert,
            messages,
            guard,
            notifier,
        }
    }

    pub fn account(&self) -> &Arc<Account> {
        self.controller.account()
    }

    /// Detach every listener this session attached.
    pub fn detach_all(&self) {
        let account = self.account();
        account.detach(&self.display);
        account.detach(&self.history_feed);
        account.detach(&self.alert);
        account.detach(&self.messages);
        if let Some(guard) = &self.guard {
            account.detach(guard);
        }
        if let Some(notifier) = &self.notifier {
            account.detach(notifier);
        }
    }
}
