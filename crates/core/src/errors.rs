use thiserror::Error;

use crate::{domain::order::OrderStatus, flows::FlowTransitionError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid order transition from {from:?} to {to:?}")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },
    #[error(transparent)]
    FlowTransition(#[from] FlowTransitionError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[cfg(test)]
mod tests {
    use crate::domain::order::OrderStatus;
    use crate::errors::DomainError;
    use crate::flows::{ConversationStep, FlowEvent, FlowTransitionError};

    #[test]
    fn flow_errors_convert_into_domain_errors() {
        let error = DomainError::from(FlowTransitionError::InvalidTransition {
            state: ConversationStep::AwaitingName,
            event: FlowEvent::PhoneProvided,
        });

        assert!(matches!(error, DomainError::FlowTransition(_)));
        assert!(error.to_string().contains("AwaitingName"));
    }

    #[test]
    fn order_transition_error_names_both_statuses() {
        let error =
            DomainError::InvalidOrderTransition { from: OrderStatus::Paid, to: OrderStatus::Paid };
        assert_eq!(error.to_string(), "invalid order transition from Paid to Paid");
    }
}
