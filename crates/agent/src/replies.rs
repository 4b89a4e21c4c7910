//! Customer-facing reply texts (pt-BR).

use std::fmt::Write;

use chrono::{DateTime, Local};
use rust_decimal::Decimal;

use comanda_core::domain::catalog::Catalog;
use comanda_core::domain::customer::CustomerProfile;
use comanda_core::domain::order::{Order, OrderStatus};
use comanda_core::flows::ConversationStep;

pub const ASK_NAME: &str = "Olá! Qual é o seu nome?";
pub const ASK_ADDRESS: &str = "Qual é o seu endereço?";
pub const ASK_PHONE: &str = "Por favor, informe seu número de telefone.";
pub const REGISTRATION_COMPLETE: &str =
    "Cadastro concluído! Digite \"catálogo\" para ver as opções.";
pub const SELECT_ORDER_TO_CANCEL: &str = "Digite o número do pedido que deseja cancelar.";

pub const ORDER_NUMBER_OUT_OF_RANGE: &str =
    "⚠️ Número de pedido inválido. Por favor, verifique a lista e tente novamente.";
pub const SELECTION_NOT_A_NUMBER: &str = "❌ Insira um número válido para cancelar o pedido.";
pub const NO_ORDERS: &str = "🚫 Nenhum pedido encontrado.";
pub const CART_EMPTY: &str = "Seu carrinho está vazio. Digite \"catálogo\" para ver as opções.";
pub const NO_PENDING_TO_CANCEL: &str = "🚫 Você não tem pedidos pendentes para cancelar.";
pub const NO_PENDING_ORDER: &str = "⚠️ Nenhum pedido pendente encontrado.";
pub const AMOUNT_NOT_FOUND: &str =
    "❌ Não consegui identificar o valor no comprovante. Envie um comprovante válido.";
pub const DOCUMENT_UNAVAILABLE: &str = "Não consegui baixar o comprovante. Tente novamente.";
pub const EXTRACTION_FAILED: &str = "❌ Erro ao extrair texto do PDF.";
pub const PROCESSING_FAILED: &str = "❌ Erro ao processar o comprovante.";
pub const NOT_UNDERSTOOD: &str =
    "🤖 Desculpe, não entendi. Digite \"catálogo\" para ver os produtos.";

const MISSING_FIELD: &str = "-";

/// Prompt that asks for whatever `step` is waiting on.
pub fn step_prompt(step: ConversationStep) -> &'static str {
    match step {
        ConversationStep::AwaitingName => ASK_NAME,
        ConversationStep::AwaitingAddress => ASK_ADDRESS,
        ConversationStep::AwaitingPhone => ASK_PHONE,
        ConversationStep::AwaitingOrderCancelSelection => SELECT_ORDER_TO_CANCEL,
        ConversationStep::Complete => REGISTRATION_COMPLETE,
    }
}

pub fn catalog_menu(catalog: &Catalog) -> String {
    let mut text = String::from("Aqui está o nosso cardápio:\n");
    for item in catalog.items() {
        let _ = writeln!(text, "{}. {} - R${}", item.code.0, item.name, brl(item.unit_price));
    }
    text.push_str("Digite o número do item para adicionar ao carrinho.");
    text
}

pub fn item_added(item_name: &str) -> String {
    format!(
        "{item_name} adicionada ao seu carrinho. Digite \"finalizar\" para concluir ou \
         \"cancelar\" para cancelar o pedido."
    )
}

pub fn checkout_total(total: Decimal) -> String {
    format!("Total: R${}. Enviando QR Code para pagamento...", money(total))
}

pub fn pending_orders(orders: &[Order]) -> String {
    let mut text = String::from("❌ *Pedidos Pendentes:*\n\n");
    for (index, order) in orders.iter().enumerate() {
        let _ = writeln!(text, "🔢 Pedido {}:", index + 1);
        let _ = writeln!(text, "💰 Valor: R${}", money(order.total));
        let _ = writeln!(text, "📌 Status: {}\n", status_label(order.status));
    }
    text.push_str(SELECT_ORDER_TO_CANCEL);
    text
}

pub fn order_cancelled(number: usize) -> String {
    format!("❌ Pedido número {number} cancelado com sucesso.")
}

/// Ledger report. Each entry pairs an order with its sender's profile, when one exists.
pub fn order_report(entries: &[(Order, Option<CustomerProfile>)], now: DateTime<Local>) -> String {
    if entries.is_empty() {
        return NO_ORDERS.to_owned();
    }

    let date = now.format("%d/%m/%Y");
    let time = now.format("%H:%M:%S");
    let mut text = String::from("📋 *Pedidos Realizados:*\n\n");
    for (index, (order, profile)) in entries.iter().enumerate() {
        let field = |value: Option<&String>| value.map_or(MISSING_FIELD, String::as_str).to_owned();
        let name = field(profile.as_ref().and_then(|profile| profile.name.as_ref()));
        let address = field(profile.as_ref().and_then(|profile| profile.address.as_ref()));
        let phone = field(profile.as_ref().and_then(|profile| profile.phone.as_ref()));

        let _ = writeln!(text, "📝 Pedido {}:", index + 1);
        let _ = writeln!(text, "👤 Nome: {name}");
        let _ = writeln!(text, "🏠 Endereço: {address}");
        let _ = writeln!(text, "📞 Telefone: {phone}");
        let _ = writeln!(text, "💰 Valor: R${}", money(order.total));
        let _ = writeln!(text, "📅 Data: {date}");
        let _ = writeln!(text, "🕒 Hora: {time}");
        let _ = writeln!(text, "📌 Status: {}\n", status_label(order.status));
    }
    text.trim_end().to_owned()
}

pub fn payment_confirmed(amount: Decimal) -> String {
    format!("✅ Pagamento de R${} confirmado! Seu pedido está sendo processado.", money(amount))
}

pub fn payment_mismatch(paid: Decimal, expected: Decimal) -> String {
    format!(
        "❌ O valor pago (R${}) não corresponde ao pedido (R${}). Verifique e tente novamente.",
        money(paid),
        money(expected)
    )
}

pub fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Paid => "Pago ✅",
        OrderStatus::Pending => "Pendente ⏳",
    }
}

/// Two-decimal rendering with a decimal point, e.g. `55.00`.
pub fn money(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}

/// Two-decimal rendering with a decimal comma, e.g. `25,00`.
pub fn brl(amount: Decimal) -> String {
    money(amount).replace('.', ",")
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};
    use rust_decimal::Decimal;

    use comanda_core::domain::cart::CartItem;
    use comanda_core::domain::catalog::Catalog;
    use comanda_core::domain::customer::{CustomerProfile, SenderId};
    use comanda_core::domain::order::{Order, OrderStatus};

    use super::{
        catalog_menu, checkout_total, money, order_report, payment_mismatch, pending_orders,
        NO_ORDERS,
    };

    fn order(sender: &str, codes: &[&str]) -> Order {
        let catalog = Catalog::default();
        let items = codes
            .iter()
            .map(|code| CartItem::from(catalog.find(code).expect("catalog code")))
            .collect();
        Order::place(SenderId::new(sender), items).expect("order")
    }

    #[test]
    fn catalog_menu_uses_decimal_comma() {
        assert_eq!(
            catalog_menu(&Catalog::default()),
            "Aqui está o nosso cardápio:\n1. Refeição - R$25,00\n2. Bebida - R$5,00\n\
             Digite o número do item para adicionar ao carrinho."
        );
    }

    #[test]
    fn money_always_shows_two_decimals() {
        assert_eq!(money(Decimal::new(55, 0)), "55.00");
        assert_eq!(money(Decimal::new(2_501, 2)), "25.01");
        assert_eq!(money(Decimal::new(12_345, 3)), "12.35");
        assert_eq!(
            checkout_total(Decimal::new(5_500, 2)),
            "Total: R$55.00. Enviando QR Code para pagamento..."
        );
    }

    #[test]
    fn mismatch_reports_both_amounts() {
        assert_eq!(
            payment_mismatch(Decimal::new(2_501, 2), Decimal::new(25, 0)),
            "❌ O valor pago (R$25.01) não corresponde ao pedido (R$25.00). Verifique e tente \
             novamente."
        );
    }

    #[test]
    fn pending_list_is_numbered_and_ends_with_prompt() {
        let text = pending_orders(&[order("ana", &["1"]), order("ana", &["2", "2"])]);

        assert!(text.starts_with("❌ *Pedidos Pendentes:*\n\n🔢 Pedido 1:\n💰 Valor: R$25.00\n"));
        assert!(text.contains("🔢 Pedido 2:\n💰 Valor: R$10.00\n📌 Status: Pendente ⏳"));
        assert!(text.ends_with("Digite o número do pedido que deseja cancelar."));
    }

    #[test]
    fn report_includes_profile_fields_date_and_status() {
        let mut paid = order("ana", &["1", "2"]);
        paid.status = OrderStatus::Paid;
        let mut profile = CustomerProfile::new(SenderId::new("ana"));
        profile.name = Some("Ana".to_owned());
        profile.address = Some("Rua A, 10".to_owned());
        profile.phone = Some("11 99999-0000".to_owned());
        let now = Local.with_ymd_and_hms(2024, 3, 9, 18, 5, 7).single().expect("local time");

        let text = order_report(&[(paid, Some(profile)), (order("bia", &["2"]), None)], now);

        assert!(text.starts_with("📋 *Pedidos Realizados:*\n\n📝 Pedido 1:\n👤 Nome: Ana\n"));
        assert!(text.contains("🏠 Endereço: Rua A, 10\n📞 Telefone: 11 99999-0000\n"));
        assert!(text.contains("💰 Valor: R$30.00\n📅 Data: 09/03/2024\n🕒 Hora: 18:05:07\n"));
        assert!(text.contains("📌 Status: Pago ✅"));
        assert!(text.contains("📝 Pedido 2:\n👤 Nome: -\n"));
        assert!(text.ends_with("📌 Status: Pendente ⏳"));
    }

    #[test]
    fn empty_report_says_no_orders() {
        assert_eq!(order_report(&[], Local::now()), NO_ORDERS);
    }
}
