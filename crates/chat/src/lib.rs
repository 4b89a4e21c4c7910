//! Chat transport plumbing for the ordering assistant.
//!
//! - **Events** (`events`) - inbound envelopes and the hand-off to the conversation handler
//! - **Runner** (`runner`) - connection loop with reconnection and reply delivery
//! - **Console** (`console`) - stdin/stdout transport for local operation
//!
//! ```text
//! ChatTransport → ChatRunner → EventDispatcher → ConversationHandler
//!                     ↓
//!          send_text / send_image ← OutboundMessage
//! ```

pub mod console;
pub mod events;
pub mod runner;
