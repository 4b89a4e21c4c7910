//! Monetary amounts written the Brazilian way (`R$ 1.234,56`).
//!
//! An amount only counts when a `valor` or `total` label precedes it:
//!
//! ```text
//! amount   := label ws* sep? ws* currency? ws* number
//! label    := "valor" | "total"          (case-insensitive)
//! sep      := ":" | "-"
//! currency := "R"? "$"?
//! number   := digit{1,3} ("." digit{3})* "," digit{2}
//! ```
//!
//! Only the first match in the text is used.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static LABELLED_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:valor|total)\s*[:\-]?\s*R?\$?\s*([0-9]{1,3}(?:\.[0-9]{3})*,[0-9]{2})")
        .expect("labelled amount pattern compiles")
});

pub fn parse_amount(text: &str) -> Option<Decimal> {
    let captures = LABELLED_AMOUNT.captures(text)?;
    let raw = captures.get(1)?.as_str();
    normalize_amount(raw)
}

fn normalize_amount(raw: &str) -> Option<Decimal> {
    let canonical = raw.replace('.', "").replace(',', ".");
    canonical.parse::<Decimal>().ok().map(|amount| amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::parse_amount;

    #[test]
    fn grouped_amount_after_label_is_parsed() {
        assert_eq!(parse_amount("Valor Total: R$ 1.234,56"), Some(Decimal::new(123_456, 2)));
    }

    #[test]
    fn label_match_is_case_insensitive() {
        assert_eq!(parse_amount("VALOR R$25,00"), Some(Decimal::new(2_500, 2)));
        assert_eq!(parse_amount("total - 5,00"), Some(Decimal::new(500, 2)));
    }

    #[test]
    fn currency_marker_and_separator_are_optional() {
        assert_eq!(parse_amount("valor 55,00"), Some(Decimal::new(5_500, 2)));
        assert_eq!(parse_amount("valor:$ 55,00"), Some(Decimal::new(5_500, 2)));
        assert_eq!(parse_amount("Valor: R 55,00"), Some(Decimal::new(5_500, 2)));
    }

    #[test]
    fn several_thousand_groups_are_collapsed() {
        assert_eq!(
            parse_amount("Comprovante Pix Valor: R$ 1.000.000,01 Data 01/02/2025"),
            Some(Decimal::new(100_000_001, 2))
        );
    }

    #[test]
    fn unlabelled_numbers_are_ignored() {
        assert_eq!(parse_amount("Pagamento de R$ 25,00 recebido"), None);
        assert_eq!(parse_amount("R$ 1.234,56"), None);
    }

    #[test]
    fn first_labelled_amount_wins() {
        assert_eq!(
            parse_amount("Valor: R$ 25,00 Tarifa 0,00 Total: R$ 30,00"),
            Some(Decimal::new(2_500, 2))
        );
    }

    #[test]
    fn amounts_without_two_cent_digits_do_not_match() {
        assert_eq!(parse_amount("valor: R$ 25"), None);
        assert_eq!(parse_amount("valor: R$ 25,5"), None);
    }

    #[test]
    fn parsed_amount_compares_equal_to_catalog_totals() {
        let parsed = parse_amount("valor: R$ 25,00").expect("amount");
        assert_eq!(parsed, Decimal::new(25, 0));
        assert_eq!(parsed.to_string(), "25.00");
    }
}
