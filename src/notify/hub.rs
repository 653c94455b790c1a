use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::warn;

use crate::domain::{Account, AccountError, AccountEvent};

/// Error raised by a listener while reacting to an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Something that reacts to committed account mutations.
///
/// `react` runs synchronously on the thread that performed the mutation.
/// Implementations must treat `source` as read-only: calling `deposit` or
/// `withdraw` from inside `react` is not supported.
pub trait Listener: Send + Sync {
    /// Short label used in logs and error reports.
    fn name(&self) -> &str;

    fn react(&self, source: &Account, event: &AccountEvent) -> Result<(), ListenerError>;
}

/// Registration list of listeners, broadcast in registration order.
///
/// Listeners are held weakly: the hub never keeps a listener alive, and
/// listeners dropped by their owner are pruned on the next access.
#[derive(Default)]
pub struct NotificationHub {
    listeners: Mutex<Vec<Weak<dyn Listener>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. Attaching the same handle twice is a no-op.
    pub fn attach<L: Listener + 'static>(&self, listener: &Arc<L>) -> bool {
        let weak: Weak<L> = Arc::downgrade(listener);
        let weak: Weak<dyn Listener> = weak;
        let mut listeners = self.listeners.lock();
        listeners.retain(|l| l.strong_count() > 0);

        if listeners.iter().any(|l| same_listener(l, &weak)) {
            return false;
        }
        listeners.push(weak);
        true
    }

    /// Remove a listener. Detaching an unknown handle is a no-op.
    pub fn detach<L: Listener + 'static>(&self, listener: &Arc<L>) -> bool {
        let weak: Weak<L> = Arc::downgrade(listener);
        let weak: Weak<dyn Listener> = weak;
        let mut listeners = self.listeners.lock();
        listeners.retain(|l| l.strong_count() > 0);

        match listeners.iter().position(|l| same_listener(l, &weak)) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of live registered listeners.
    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every registered listener in registration order.
    ///
    /// The list is snapshotted before the first call, so attach/detach from
    /// inside a reaction only affects later broadcasts. The first listener
    /// error stops the pass and is returned.
    pub fn broadcast(&self, source: &Account, event: &AccountEvent) -> Result<(), AccountError> {
        let snapshot: Vec<Arc<dyn Listener>> = {
            let mut listeners = self.listeners.lock();
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };

        for listener in snapshot {
            if let Err(reason) = listener.react(source, event) {
                warn!(
                    listener = listener.name(),
                    kind = %event.kind,
                    error = %reason,
                    "listener failed, remaining notifications skipped"
                );
                return Err(AccountError::ListenerFailed {
                    listener: listener.name().to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

/// Identity comparison on the allocation, ignoring vtable metadata.
fn same_listener(a: &Weak<dyn Listener>, b: &Weak<dyn Listener>) -> bool {
    std::ptr::addr_eq(a.as_ptr(), b.as_ptr())
}
