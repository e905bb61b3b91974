//! Order status state machine
//!
//! ```text
//! pending ──► preparing ──► ready ──► completed
//!    │
//!    └──► cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

/// Rejected status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("order is {0} and can no longer change status")]
    Terminal(OrderStatus),

    #[error("cannot move order from {from} to {to}")]
    NotAllowed { from: OrderStatus, to: OrderStatus },
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Pending, preparing or ready; the kitchen still has work on it.
    pub const fn is_open(&self) -> bool {
        !self.is_terminal()
    }

    /// Statuses reachable in one step from `self`
    pub const fn next_statuses(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Ready],
            OrderStatus::Ready => &[OrderStatus::Completed],
            OrderStatus::Completed | OrderStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.next_statuses().contains(&target)
    }

    /// Validate a status change against the transition table.
    pub fn check_transition(&self, target: OrderStatus) -> Result<(), TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::Terminal(*self));
        }
        if !self.can_transition_to(target) {
            return Err(TransitionError::NotAllowed {
                from: *self,
                to: target,
            });
        }
        Ok(())
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_only_to_preparing_or_cancelled() {
        let from = OrderStatus::Pending;
        for to in OrderStatus::ALL {
            let expected = matches!(to, OrderStatus::Preparing | OrderStatus::Cancelled);
            assert_eq!(from.can_transition_to(to), expected, "pending -> {to}");
        }
    }

    #[test]
    fn test_forward_pipeline() {
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_terminal_rejects_everything() {
        for from in [OrderStatus::Completed, OrderStatus::Cancelled] {
            assert!(from.is_terminal());
            for to in OrderStatus::ALL {
                assert_eq!(
                    from.check_transition(to),
                    Err(TransitionError::Terminal(from))
                );
            }
        }
    }

    #[test]
    fn test_check_transition_not_allowed() {
        assert_eq!(
            OrderStatus::Pending.check_transition(OrderStatus::Ready),
            Err(TransitionError::NotAllowed {
                from: OrderStatus::Pending,
                to: OrderStatus::Ready,
            })
        );
        // self-transition is not a move
        assert!(OrderStatus::Pending.check_transition(OrderStatus::Pending).is_err());
    }

    #[test]
    fn test_parse_and_serialize() {
        assert_eq!("ready".parse::<OrderStatus>(), Ok(OrderStatus::Ready));
        assert!("READY".parse::<OrderStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}
