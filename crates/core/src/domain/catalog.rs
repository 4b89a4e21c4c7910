use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogCode(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub code: CatalogCode,
    pub name: String,
    pub unit_price: Decimal,
}

impl CatalogItem {
    pub fn new(code: impl Into<String>, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self { code: CatalogCode(code.into()), name: name.into(), unit_price }
    }
}

/// Fixed menu offered to every sender. Items keep their listing order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn find(&self, code: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.code.0 == code)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(vec![
            CatalogItem::new("1", "Refeição", Decimal::new(2_500, 2)),
            CatalogItem::new("2", "Bebida", Decimal::new(500, 2)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::Catalog;

    #[test]
    fn default_catalog_lists_meal_then_drink() {
        let catalog = Catalog::default();
        let names = catalog.items().iter().map(|item| item.name.as_str()).collect::<Vec<_>>();

        assert_eq!(names, vec!["Refeição", "Bebida"]);
        assert_eq!(catalog.find("1").map(|item| item.unit_price), Some(Decimal::new(2_500, 2)));
        assert_eq!(catalog.find("2").map(|item| item.unit_price), Some(Decimal::new(500, 2)));
    }

    #[test]
    fn unknown_codes_are_not_found() {
        let catalog = Catalog::default();
        assert!(catalog.find("3").is_none());
        assert!(catalog.find(" 1").is_none());
    }
}
