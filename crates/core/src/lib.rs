pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod receipt;

pub use audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink,
};
pub use domain::cart::{cart_total, CartItem};
pub use domain::catalog::{Catalog, CatalogCode, CatalogItem};
pub use domain::customer::{CustomerProfile, SenderId};
pub use domain::message::{ImageAttachment, InboundEvent, OutboundMessage};
pub use domain::order::{Order, OrderId, OrderStatus};
pub use errors::DomainError;
pub use flows::{ConversationFlow, ConversationStep, FlowEvent, FlowTransitionError};
pub use receipt::{DocumentTextExtractor, PdfTextExtractor, ReceiptError};
