use comanda_agent::replies;
use comanda_core::domain::catalog::Catalog;
use serde_json::json;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let catalog = Catalog::default();
    let items = catalog
        .items()
        .iter()
        .map(|item| {
            json!({
                "code": item.code.0,
                "name": item.name,
                "unit_price": replies::money(item.unit_price),
            })
        })
        .collect::<Vec<_>>();

    CommandResult::success_with_details(
        "catalog",
        replies::catalog_menu(&catalog),
        Some(json!({ "items": items })),
    )
}
