// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::Arc;

use argentum::application::{AccountConfig, Session};
use argentum::domain::{Account, AccountEvent, Cents};
use argentum::notify::{Listener, ListenerError, MemorySink};
use parking_lot::Mutex;

/// Helper to open a standalone account wrapped for sharing
pub fn test_account(opening: Cents) -> Arc<Account> {
    Arc::new(Account::open("Imed Zayet", opening).expect("valid opening balance"))
}

/// Helper to assemble a session writing listener output to memory
pub fn test_session(config: AccountConfig) -> (Session, Arc<MemorySink>) {
    let account = test_account(config.opening_balance);
    let sink = Arc::new(MemorySink::new());
    let session = Session::assemble(&config, account, sink.clone());
    (session, sink)
}

/// Listener that counts and keeps every event it receives
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<AccountEvent>>,
}

impl EventLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<AccountEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }
}

impl Listener for EventLog {
    fn name(&self) -> &str {
        "event-log"
    }

    fn react(&self, _source: &Account, event: &AccountEvent) -> Result<(), ListenerError> {
        self.events.lock().push(*event);
        Ok(())
    }
}
