use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use comanda_core::audit::{AuditCategory, AuditContext, AuditOutcome, AuditSink, InMemoryAuditSink};
use comanda_core::config::{ChatConfig, DEFAULT_PAYMENT_QR_CAPTION, DEFAULT_PAYMENT_QR_PATH};
use comanda_core::domain::cart::CartItem;
use comanda_core::domain::catalog::{Catalog, CatalogCode};
use comanda_core::domain::customer::{CustomerProfile, SenderId};
use comanda_core::domain::message::{InboundEvent, OutboundMessage};
use comanda_core::domain::order::Order;
use comanda_core::errors::DomainError;
use comanda_core::flows::{ConversationFlow, ConversationStep, FlowEvent, FlowTransitionError};
use comanda_core::receipt::{
    read_receipt_amount, DocumentTextExtractor, PdfTextExtractor, ReceiptError,
};
use comanda_store::{
    CartStore, InMemoryCartStore, InMemoryOrderLedger, InMemoryProfileStore, OrderLedger,
    ProfileStore, StoreError,
};

use crate::intent::{CancelSelection, Command};
use crate::replies;

const AUDIT_ACTOR: &str = "conversation";

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Flow(#[from] FlowTransitionError),
    #[error("step {0:?} does not collect a profile field")]
    NotOnboarding(ConversationStep),
}

/// Image sent alongside the checkout total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentQr {
    pub path: PathBuf,
    pub caption: String,
}

impl Default for PaymentQr {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PAYMENT_QR_PATH),
            caption: DEFAULT_PAYMENT_QR_CAPTION.to_owned(),
        }
    }
}

impl From<&ChatConfig> for PaymentQr {
    fn from(config: &ChatConfig) -> Self {
        Self { path: config.payment_qr_path.clone(), caption: config.payment_qr_caption.clone() }
    }
}

/// Collaborators the conversation reads and writes through.
#[derive(Clone)]
pub struct ConversationDeps {
    pub profiles: Arc<dyn ProfileStore>,
    pub carts: Arc<dyn CartStore>,
    pub ledger: Arc<dyn OrderLedger>,
    pub extractor: Arc<dyn DocumentTextExtractor>,
    pub audit_sink: Arc<dyn AuditSink>,
}

impl ConversationDeps {
    pub fn in_memory() -> Self {
        Self::in_memory_with(Arc::new(PdfTextExtractor), Arc::new(InMemoryAuditSink::default()))
    }

    pub fn in_memory_with(
        extractor: Arc<dyn DocumentTextExtractor>,
        audit_sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            profiles: Arc::new(InMemoryProfileStore::default()),
            carts: Arc::new(InMemoryCartStore::default()),
            ledger: Arc::new(InMemoryOrderLedger::default()),
            extractor,
            audit_sink,
        }
    }
}

/// Turns one inbound event from one sender into at most one reply.
///
/// Calls are serialized through a single dispatch lock, so every read-then-write against the
/// stores observes the effects of the previous event.
pub struct ConversationService {
    deps: ConversationDeps,
    catalog: Catalog,
    payment_qr: PaymentQr,
    flow: ConversationFlow,
    dispatch_lock: Mutex<()>,
}

impl ConversationService {
    pub fn new(deps: ConversationDeps, catalog: Catalog, payment_qr: PaymentQr) -> Self {
        Self {
            deps,
            catalog,
            payment_qr,
            flow: ConversationFlow::new(),
            dispatch_lock: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn payment_qr(&self) -> &PaymentQr {
        &self.payment_qr
    }

    pub async fn handle(
        &self,
        sender: &SenderId,
        event: InboundEvent,
        correlation_id: &str,
    ) -> Option<OutboundMessage> {
        let _dispatch = self.dispatch_lock.lock().await;
        let audit = AuditContext::new(sender.clone(), correlation_id, AUDIT_ACTOR);

        match self.route(sender, event, &audit).await {
            Ok(message) => Some(message),
            Err(error) => {
                warn!(
                    event_name = "conversation.handle_failed",
                    correlation_id,
                    sender = %sender,
                    error = %error,
                    "conversation handling failed; replying with generic error"
                );
                Some(OutboundMessage::text(replies::PROCESSING_FAILED))
            }
        }
    }

    async fn route(
        &self,
        sender: &SenderId,
        event: InboundEvent,
        audit: &AuditContext,
    ) -> Result<OutboundMessage, ConversationError> {
        let Some(profile) = self.deps.profiles.find(sender).await? else {
            return self.register(sender, audit).await;
        };

        if profile.is_onboarding() {
            return self.onboard(profile, event, audit).await;
        }

        match profile.step {
            ConversationStep::AwaitingOrderCancelSelection => {
                self.resolve_cancel_selection(profile, event, audit).await
            }
            _ => match event {
                InboundEvent::Text(text) => self.run_command(profile, &text, audit).await,
                InboundEvent::Document(bytes) => {
                    self.reconcile_receipt(sender, &bytes, audit).await
                }
                InboundEvent::DocumentUnavailable => Ok(self.document_unavailable(sender, audit)),
            },
        }
    }

    async fn register(
        &self,
        sender: &SenderId,
        audit: &AuditContext,
    ) -> Result<OutboundMessage, ConversationError> {
        let profile = CustomerProfile::new(sender.clone());
        let step = profile.step;
        self.deps.profiles.save(profile).await?;

        info!(
            event_name = "conversation.profile_created",
            correlation_id = %audit.correlation_id,
            sender = %sender,
            "new sender; starting onboarding"
        );
        self.deps.audit_sink.emit(
            audit
                .event("profile.created", AuditCategory::Flow, AuditOutcome::Success)
                .with_metadata("step", format!("{step:?}")),
        );
        Ok(OutboundMessage::text(replies::step_prompt(step)))
    }

    async fn onboard(
        &self,
        mut profile: CustomerProfile,
        event: InboundEvent,
        audit: &AuditContext,
    ) -> Result<OutboundMessage, ConversationError> {
        let InboundEvent::Text(text) = event else {
            debug!(
                event_name = "conversation.onboarding_non_text",
                correlation_id = %audit.correlation_id,
                sender = %profile.sender,
                step = ?profile.step,
                "non-text event during onboarding; repeating prompt"
            );
            return Ok(OutboundMessage::text(replies::step_prompt(profile.step)));
        };

        let value = Some(text.trim().to_owned());
        let flow_event = match profile.step {
            ConversationStep::AwaitingName => {
                profile.name = value;
                FlowEvent::NameProvided
            }
            ConversationStep::AwaitingAddress => {
                profile.address = value;
                FlowEvent::AddressProvided
            }
            ConversationStep::AwaitingPhone => {
                profile.phone = value;
                FlowEvent::PhoneProvided
            }
            step => return Err(ConversationError::NotOnboarding(step)),
        };

        let outcome = self.flow.apply_with_audit(
            profile.step,
            flow_event,
            self.deps.audit_sink.as_ref(),
            audit,
        )?;
        profile.step = outcome.to;
        self.deps.profiles.save(profile).await?;

        info!(
            event_name = "conversation.onboarding_advanced",
            correlation_id = %audit.correlation_id,
            sender = %audit.sender,
            from = ?outcome.from,
            to = ?outcome.to,
            "onboarding step recorded"
        );
        Ok(OutboundMessage::text(replies::step_prompt(outcome.to)))
    }

    async fn resolve_cancel_selection(
        &self,
        mut profile: CustomerProfile,
        event: InboundEvent,
        audit: &AuditContext,
    ) -> Result<OutboundMessage, ConversationError> {
        let selection = match &event {
            InboundEvent::Text(text) => CancelSelection::parse(text),
            InboundEvent::Document(_) | InboundEvent::DocumentUnavailable => {
                CancelSelection::NotANumber
            }
        };
        if selection == CancelSelection::NotANumber {
            return Ok(OutboundMessage::text(replies::SELECTION_NOT_A_NUMBER));
        }

        let pending = self.deps.ledger.pending_for(&profile.sender).await?;
        let Some(position) = selection.position(pending.len()) else {
            debug!(
                event_name = "conversation.cancel_selection_out_of_range",
                correlation_id = %audit.correlation_id,
                sender = %profile.sender,
                selection = ?selection,
                pending = pending.len(),
                "cancel selection outside pending list"
            );
            return Ok(OutboundMessage::text(replies::ORDER_NUMBER_OUT_OF_RANGE));
        };

        let cancelled = self.deps.ledger.remove(pending[position].id).await?;
        let outcome = self.flow.apply_with_audit(
            profile.step,
            FlowEvent::CancelSelectionResolved,
            self.deps.audit_sink.as_ref(),
            audit,
        )?;
        profile.step = outcome.to;
        self.deps.profiles.save(profile).await?;

        info!(
            event_name = "order.cancelled",
            correlation_id = %audit.correlation_id,
            sender = %audit.sender,
            order_id = %cancelled.id,
            total = %cancelled.total,
            "pending order cancelled"
        );
        self.deps.audit_sink.emit(
            audit
                .event("order.cancelled", AuditCategory::Order, AuditOutcome::Success)
                .for_order(cancelled.id)
                .with_metadata("total", replies::money(cancelled.total))
                .with_metadata("position", (position + 1).to_string()),
        );
        Ok(OutboundMessage::text(replies::order_cancelled(position + 1)))
    }

    async fn run_command(
        &self,
        profile: CustomerProfile,
        text: &str,
        audit: &AuditContext,
    ) -> Result<OutboundMessage, ConversationError> {
        let command = Command::classify(text, &self.catalog);
        debug!(
            event_name = "conversation.command_classified",
            correlation_id = %audit.correlation_id,
            sender = %profile.sender,
            command = command.name(),
            read_only = command.is_read_only(),
            "text classified"
        );

        match command {
            Command::ListOrders => self.list_orders().await,
            Command::ShowCatalog => Ok(OutboundMessage::text(replies::catalog_menu(&self.catalog))),
            Command::AddItem(code) => self.add_item(&profile.sender, &code, audit).await,
            Command::Checkout => self.checkout(&profile.sender, audit).await,
            Command::CancelOrders => self.request_cancellation(profile, audit).await,
            Command::Unrecognized => Ok(OutboundMessage::text(replies::NOT_UNDERSTOOD)),
        }
    }

    async fn list_orders(&self) -> Result<OutboundMessage, ConversationError> {
        let orders = self.deps.ledger.list().await?;
        let mut entries = Vec::with_capacity(orders.len());
        for order in orders {
            let profile = self.deps.profiles.find(&order.sender).await?;
            entries.push((order, profile));
        }
        Ok(OutboundMessage::text(replies::order_report(&entries, Local::now())))
    }

    async fn add_item(
        &self,
        sender: &SenderId,
        code: &CatalogCode,
        audit: &AuditContext,
    ) -> Result<OutboundMessage, ConversationError> {
        let item = self.catalog.find(&code.0).ok_or_else(|| {
            DomainError::InvariantViolation(format!("catalog code `{}` vanished", code.0))
        })?;
        let cart_item = CartItem::from(item);
        self.deps.carts.add(sender, cart_item).await?;

        self.deps.audit_sink.emit(
            audit
                .event("cart.item_added", AuditCategory::Cart, AuditOutcome::Success)
                .with_metadata("item_id", code.0.clone())
                .with_metadata("unit_price", replies::money(item.unit_price)),
        );
        Ok(OutboundMessage::text(replies::item_added(&item.name)))
    }

    async fn checkout(
        &self,
        sender: &SenderId,
        audit: &AuditContext,
    ) -> Result<OutboundMessage, ConversationError> {
        let items = self.deps.carts.take(sender).await?;
        if items.is_empty() {
            return Ok(OutboundMessage::text(replies::CART_EMPTY));
        }

        let order = Order::place(sender.clone(), items)?;
        let (order_id, total, item_count) = (order.id, order.total, order.items.len());
        self.deps.ledger.append(order).await?;

        info!(
            event_name = "order.placed",
            correlation_id = %audit.correlation_id,
            sender = %sender,
            order_id = %order_id,
            total = %total,
            item_count,
            "order placed"
        );
        self.deps.audit_sink.emit(
            audit
                .event("order.placed", AuditCategory::Order, AuditOutcome::Success)
                .for_order(order_id)
                .with_metadata("total", replies::money(total))
                .with_metadata("item_count", item_count.to_string()),
        );

        Ok(OutboundMessage::text(replies::checkout_total(total))
            .with_image(self.payment_qr.path.clone(), self.payment_qr.caption.clone()))
    }

    async fn request_cancellation(
        &self,
        mut profile: CustomerProfile,
        audit: &AuditContext,
    ) -> Result<OutboundMessage, ConversationError> {
        let pending = self.deps.ledger.pending_for(&profile.sender).await?;
        if pending.is_empty() {
            return Ok(OutboundMessage::text(replies::NO_PENDING_TO_CANCEL));
        }

        let outcome = self.flow.apply_with_audit(
            profile.step,
            FlowEvent::CancelSelectionRequested,
            self.deps.audit_sink.as_ref(),
            audit,
        )?;
        profile.step = outcome.to;
        self.deps.profiles.save(profile).await?;

        Ok(OutboundMessage::text(replies::pending_orders(&pending)))
    }

    fn document_unavailable(&self, sender: &SenderId, audit: &AuditContext) -> OutboundMessage {
        warn!(
            event_name = "payment.receipt_unavailable",
            correlation_id = %audit.correlation_id,
            sender = %sender,
            "receipt document could not be fetched"
        );
        self.deps.audit_sink.emit(audit.event(
            "payment.receipt_unavailable",
            AuditCategory::Payment,
            AuditOutcome::Failed,
        ));
        OutboundMessage::text(replies::DOCUMENT_UNAVAILABLE)
    }

    async fn reconcile_receipt(
        &self,
        sender: &SenderId,
        payload: &[u8],
        audit: &AuditContext,
    ) -> Result<OutboundMessage, ConversationError> {
        let amount = match read_receipt_amount(self.deps.extractor.as_ref(), payload).await {
            Ok(amount) => amount,
            Err(ReceiptError::Extraction(reason)) => {
                warn!(
                    event_name = "payment.extraction_failed",
                    correlation_id = %audit.correlation_id,
                    sender = %sender,
                    byte_len = payload.len(),
                    error = %reason,
                    "receipt text extraction failed"
                );
                self.deps.audit_sink.emit(
                    audit
                        .event(
                            "payment.receipt_unreadable",
                            AuditCategory::Payment,
                            AuditOutcome::Failed,
                        )
                        .with_metadata("reason", reason),
                );
                return Ok(OutboundMessage::text(replies::EXTRACTION_FAILED));
            }
            Err(ReceiptError::AmountNotFound) => {
                info!(
                    event_name = "payment.amount_not_found",
                    correlation_id = %audit.correlation_id,
                    sender = %sender,
                    "no labelled amount in receipt"
                );
                return Ok(OutboundMessage::text(replies::AMOUNT_NOT_FOUND));
            }
        };

        // Resolved only after extraction has finished.
        let pending = self.deps.ledger.pending_for(sender).await?;
        let Some(order) = pending.into_iter().next() else {
            return Ok(OutboundMessage::text(replies::NO_PENDING_ORDER));
        };

        if amount.round_dp(2) != order.total.round_dp(2) {
            info!(
                event_name = "payment.rejected",
                correlation_id = %audit.correlation_id,
                sender = %sender,
                order_id = %order.id,
                paid = %amount,
                expected = %order.total,
                "receipt amount does not match order total"
            );
            self.deps.audit_sink.emit(
                audit
                    .event("payment.rejected", AuditCategory::Payment, AuditOutcome::Rejected)
                    .for_order(order.id)
                    .with_metadata("paid", replies::money(amount))
                    .with_metadata("expected", replies::money(order.total)),
            );
            return Ok(OutboundMessage::text(replies::payment_mismatch(amount, order.total)));
        }

        let paid = self.deps.ledger.mark_paid(order.id).await?;
        info!(
            event_name = "payment.confirmed",
            correlation_id = %audit.correlation_id,
            sender = %sender,
            order_id = %paid.id,
            total = %paid.total,
            "order paid"
        );
        self.deps.audit_sink.emit(
            audit
                .event("payment.confirmed", AuditCategory::Payment, AuditOutcome::Success)
                .for_order(paid.id)
                .with_metadata("total", replies::money(paid.total)),
        );
        Ok(OutboundMessage::text(replies::payment_confirmed(amount)))
    }
}
