use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type OperationId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    /// Synthetic entry recording a positive opening balance
    Opening,
    /// Money entering the account
    Deposit,
    /// Money leaving the account
    Withdrawal,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Opening => "OPENING",
            OperationKind::Deposit => "DEPOSIT",
            OperationKind::Withdrawal => "WITHDRAWAL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "opening" => Some(OperationKind::Opening),
            "deposit" => Some(OperationKind::Deposit),
            "withdrawal" | "withdraw" => Some(OperationKind::Withdrawal),
            _ => None,
        }
    }

    /// Returns true if this kind of operation increases the balance
    pub fn is_credit(&self) -> bool {
        matches!(self, OperationKind::Opening | OperationKind::Deposit)
    }

    /// Arrow used by history views: up for credits, down for debits
    pub fn arrow(&self) -> &'static str {
        if self.is_credit() { "↑" } else { "↓" }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded balance-changing event. Operations are immutable once appended
/// to an account history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    /// 1-based position in the account history
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: OperationKind,
    /// Amount in cents (always positive)
    pub amount: Cents,
    /// Account balance immediately after this operation
    pub balance_after: Cents,
}

impl Operation {
    /// Create a new operation stamped with the current time.
    pub(crate) fn new(
        sequence: u64,
        kind: OperationKind,
        amount: Cents,
        balance_after: Cents,
    ) -> Self {
        debug_assert!(amount > 0, "operation amount must be positive");
        Self {
            id: Uuid::new_v4(),
            sequence,
            timestamp: Utc::now(),
            kind,
            amount,
            balance_after,
        }
    }

    /// Signed effect of this operation on the balance
    pub fn signed_amount(&self) -> Cents {
        if self.kind.is_credit() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// Payload broadcast to listeners after every committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEvent {
    pub kind: OperationKind,
    pub amount: Cents,
    /// Balance right after the mutation that produced this event
    pub balance: Cents,
}

impl From<&Operation> for AccountEvent {
    fn from(op: &Operation) -> Self {
        Self {
            kind: op.kind,
            amount: op.amount,
            balance: op.balance_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            OperationKind::Opening,
            OperationKind::Deposit,
            OperationKind::Withdrawal,
        ] {
            assert_eq!(OperationKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(OperationKind::from_str("withdraw"), Some(OperationKind::Withdrawal));
        assert_eq!(OperationKind::from_str("transfer"), None);
    }

    #[test]
    fn test_signed_amount() {
        let deposit = Operation::new(1, OperationKind::Deposit, 500, 1500);
        let withdrawal = Operation::new(2, OperationKind::Withdrawal, 300, 1200);

        assert_eq!(deposit.signed_amount(), 500);
        assert_eq!(withdrawal.signed_amount(), -300);
        assert_eq!(deposit.kind.arrow(), "↑");
        assert_eq!(withdrawal.kind.arrow(), "↓");
    }

    #[test]
    fn test_event_from_operation() {
        let op = Operation::new(3, OperationKind::Withdrawal, 300, 1200);
        let event = AccountEvent::from(&op);

        assert_eq!(event.kind, OperationKind::Withdrawal);
        assert_eq!(event.amount, 300);
        assert_eq!(event.balance, 1200);
    }

    #[test]
    fn test_kind_serializes_upper_case() {
        let json = serde_json::to_string(&OperationKind::Withdrawal).unwrap();
        assert_eq!(json, "\"WITHDRAWAL\"");
    }
}
