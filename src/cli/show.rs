use super::ui;
use crate::core::snapshot::{is_meta_field, last_modified};
use crate::core::{PriceSnapshot, SnapshotKind, SnapshotStore};
use anyhow::Result;
use comfy_table::Cell;
use serde_json::Value;

/// Reads a rate that may be stored as a number or a digit string like `"61,500"`.
fn as_rate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.replace(',', "").trim().parse().ok(),
        _ => None,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders `current` next to `previous` with the change between them.
pub fn render_prices(current: &PriceSnapshot, previous: &PriceSnapshot) -> String {
    if current.is_empty() {
        return ui::style_text(
            "No current prices stored yet. Run `sync` and `seed` first.",
            ui::StyleType::Subtle,
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Current"),
        ui::header_cell("Previous"),
        ui::header_cell("Change"),
    ]);

    for (key, value) in current.iter().filter(|(key, _)| !is_meta_field(key)) {
        let previous_value = previous.get(key);
        let change = match (as_rate(value), previous_value.and_then(as_rate)) {
            (Some(now), Some(before)) if before > 0.0 => {
                ui::change_cell(((now - before) / before) * 100.0)
            }
            _ => ui::na_cell(),
        };
        table.add_row(vec![
            Cell::new(key),
            ui::value_cell(&display_value(value)),
            previous_value.map_or_else(ui::na_cell, |v| ui::value_cell(&display_value(v))),
            change,
        ]);
    }

    let mut output = format!(
        "Prices as of {}\n",
        ui::style_text(last_modified(current).unwrap_or("N/A"), ui::StyleType::Title)
    );
    if let Some(ts) = last_modified(previous) {
        output.push_str(&ui::style_text(
            &format!("Compared with {ts}\n"),
            ui::StyleType::Subtle,
        ));
    }
    output.push('\n');
    output.push_str(&table.to_string());
    output
}

pub fn run(store: &dyn SnapshotStore) -> Result<()> {
    let current = store.load(SnapshotKind::Current)?;
    let previous = store.load(SnapshotKind::Previous)?;
    println!("{}", render_prices(&current, &previous));
    Ok(())
}
