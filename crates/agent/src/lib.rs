//! Conversation engine - the ordering assistant's decision logic
//!
//! Every inbound event from a sender flows through one `ConversationService::handle` call:
//! - **Onboarding** - name, address and phone are collected in order (`flows` in core)
//! - **Commands** (`intent`) - catalog, cart, checkout, cancellation and the ledger report
//! - **Receipts** - PDF text is read, the labelled amount parsed and matched against the
//!   sender's first pending order
//! - **Replies** (`replies`) - pt-BR texts, plus the payment QR image on checkout
//!
//! # Key Types
//!
//! - `ConversationService` - routes events and owns the dispatch lock (see `service`)
//! - `ConversationDeps` - injected stores, extractor and audit sink
//! - `Command` - classified text command
//!
//! Failures never escape `handle`: store errors become a generic reply and are logged.

pub mod intent;
pub mod replies;
pub mod service;

pub use intent::{CancelSelection, Command};
pub use service::{ConversationDeps, ConversationError, ConversationService, PaymentQr};
