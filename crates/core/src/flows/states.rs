use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationStep {
    AwaitingName,
    AwaitingAddress,
    AwaitingPhone,
    AwaitingOrderCancelSelection,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEvent {
    NameProvided,
    AddressProvided,
    PhoneProvided,
    CancelSelectionRequested,
    CancelSelectionResolved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: ConversationStep,
    pub to: ConversationStep,
    pub event: FlowEvent,
}
