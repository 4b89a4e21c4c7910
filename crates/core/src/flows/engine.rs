use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditOutcome, AuditSink};
use crate::flows::states::{ConversationStep, FlowEvent, TransitionOutcome};

/// Transition table for a sender's conversation step.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConversationFlow;

impl ConversationFlow {
    pub fn new() -> Self {
        Self
    }

    pub fn initial_step(&self) -> ConversationStep {
        ConversationStep::AwaitingName
    }

    pub fn apply(
        &self,
        current: ConversationStep,
        event: FlowEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition(current, event)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: ConversationStep,
        event: FlowEvent,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    audit
                        .event(
                            "flow.transition_applied",
                            AuditCategory::Flow,
                            AuditOutcome::Success,
                        )
                        .with_metadata("from", format!("{:?}", outcome.from))
                        .with_metadata("to", format!("{:?}", outcome.to))
                        .with_metadata("event", format!("{:?}", outcome.event)),
                );
            }
            Err(error) => {
                sink.emit(
                    audit
                        .event(
                            "flow.transition_rejected",
                            AuditCategory::Flow,
                            AuditOutcome::Rejected,
                        )
                        .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: ConversationStep, event: FlowEvent },
}

fn transition(
    current: ConversationStep,
    event: FlowEvent,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use ConversationStep::{
        AwaitingAddress, AwaitingName, AwaitingOrderCancelSelection, AwaitingPhone, Complete,
    };
    use FlowEvent::{
        AddressProvided, CancelSelectionRequested, CancelSelectionResolved, NameProvided,
        PhoneProvided,
    };

    let to = match (current, event) {
        (AwaitingName, NameProvided) => AwaitingAddress,
        (AwaitingAddress, AddressProvided) => AwaitingPhone,
        (AwaitingPhone, PhoneProvided) => Complete,
        (Complete, CancelSelectionRequested) => AwaitingOrderCancelSelection,
        (AwaitingOrderCancelSelection, CancelSelectionResolved) => Complete,
        _ => return Err(FlowTransitionError::InvalidTransition { state: current, event }),
    };

    Ok(TransitionOutcome { from: current, to, event })
}
