use comanda_core::domain::catalog::{Catalog, CatalogCode};

pub const LIST_ORDERS_COMMAND: &str = "listar pedidos";
pub const CATALOG_COMMAND: &str = "catálogo";
pub const CHECKOUT_COMMAND: &str = "finalizar";
pub const CANCEL_COMMAND: &str = "cancelar";

/// Command carried by a text message from a registered sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    ListOrders,
    ShowCatalog,
    AddItem(CatalogCode),
    Checkout,
    CancelOrders,
    Unrecognized,
}

impl Command {
    /// First match wins, in the order the variants are declared.
    pub fn classify(text: &str, catalog: &Catalog) -> Self {
        let normalized = normalize_command(text);

        match normalized.as_str() {
            LIST_ORDERS_COMMAND => Self::ListOrders,
            CATALOG_COMMAND => Self::ShowCatalog,
            code if catalog.find(code).is_some() => Self::AddItem(CatalogCode(code.to_owned())),
            CHECKOUT_COMMAND => Self::Checkout,
            CANCEL_COMMAND => Self::CancelOrders,
            _ => Self::Unrecognized,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ListOrders => "list_orders",
            Self::ShowCatalog => "show_catalog",
            Self::AddItem(_) => "add_item",
            Self::Checkout => "checkout",
            Self::CancelOrders => "cancel_orders",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Read-only commands never touch profiles, carts or the ledger.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ListOrders | Self::ShowCatalog | Self::Unrecognized)
    }
}

/// Reply to the pending-order selection prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelSelection {
    Number(i64),
    NotANumber,
}

impl CancelSelection {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Self::NotANumber;
        }
        // Integers past i64 saturate, so they stay numbers that match no position.
        let saturated = if text.starts_with('-') { i64::MIN } else { i64::MAX };
        Self::Number(text.parse::<i64>().unwrap_or(saturated))
    }

    /// Zero-based position into the sender's pending orders, if `count` covers it.
    pub fn position(self, count: usize) -> Option<usize> {
        let Self::Number(number) = self else {
            return None;
        };
        let number = usize::try_from(number).ok()?;
        (1..=count).contains(&number).then(|| number - 1)
    }
}

pub fn normalize_command(text: &str) -> String {
    text.trim().to_lowercase()
}
