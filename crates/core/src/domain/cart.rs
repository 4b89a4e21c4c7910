use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{CatalogCode, CatalogItem};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub item_id: CatalogCode,
    pub name: String,
    pub unit_price: Decimal,
}

impl From<&CatalogItem> for CartItem {
    fn from(item: &CatalogItem) -> Self {
        Self { item_id: item.code.clone(), name: item.name.clone(), unit_price: item.unit_price }
    }
}

pub fn cart_total(items: &[CartItem]) -> Decimal {
    items.iter().map(|item| item.unit_price).sum()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{cart_total, CartItem};
    use crate::domain::catalog::Catalog;

    #[test]
    fn total_sums_every_item_including_repeats() {
        let catalog = Catalog::default();
        let items = ["1", "1", "2"]
            .iter()
            .filter_map(|code| catalog.find(code))
            .map(CartItem::from)
            .collect::<Vec<_>>();

        assert_eq!(cart_total(&items), Decimal::new(5_500, 2));
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }
}
