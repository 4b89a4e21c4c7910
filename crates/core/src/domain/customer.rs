use std::fmt;

use serde::{Deserialize, Serialize};

use crate::flows::{ConversationFlow, ConversationStep};

/// Opaque chat identity of the remote party, one per chat thread.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SenderId(pub String);

impl SenderId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub sender: SenderId,
    pub step: ConversationStep,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl CustomerProfile {
    pub fn new(sender: SenderId) -> Self {
        Self {
            sender,
            step: ConversationFlow::new().initial_step(),
            name: None,
            address: None,
            phone: None,
        }
    }

    pub fn is_onboarding(&self) -> bool {
        matches!(
            self.step,
            ConversationStep::AwaitingName
                | ConversationStep::AwaitingAddress
                | ConversationStep::AwaitingPhone
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{CustomerProfile, SenderId};
    use crate::flows::{ConversationFlow, ConversationStep};

    #[test]
    fn new_profile_starts_awaiting_name_without_contact_details() {
        let profile = CustomerProfile::new(SenderId::new("5511999990000@s.whatsapp.net"));

        assert_eq!(profile.step, ConversationStep::AwaitingName);
        assert_eq!(profile.step, ConversationFlow::new().initial_step());
        assert!(profile.is_onboarding());
        assert!(profile.name.is_none() && profile.address.is_none() && profile.phone.is_none());
    }

    #[test]
    fn cancel_selection_is_not_onboarding() {
        let mut profile = CustomerProfile::new(SenderId::new("s-1"));
        profile.step = ConversationStep::AwaitingOrderCancelSelection;
        assert!(!profile.is_onboarding());
    }
}
