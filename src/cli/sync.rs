use super::ui;
use crate::sync::SnapshotSync;
use anyhow::Result;

/// Runs one sync and reports what changed.
pub async fn run(sync: &SnapshotSync) -> Result<()> {
    let pb = ui::new_spinner("Fetching prices...");
    let result = sync.run().await;
    pb.finish_and_clear();

    let report = result?;
    let summary = match (report.current_updated, report.previous_updated) {
        (false, false) => "Prices unchanged".to_string(),
        (true, false) => "Current prices updated".to_string(),
        (false, true) => "Previous prices rolled over".to_string(),
        (true, true) => "Current prices updated, previous prices rolled over".to_string(),
    };
    println!("{}", ui::style_text(&summary, ui::StyleType::Success));
    Ok(())
}

/// Seeds empty snapshots from the last fetch.
pub fn seed(sync: &SnapshotSync) -> Result<()> {
    let message = if sync.seed()? {
        ui::style_text("Seeded snapshots from the last fetch", ui::StyleType::Success)
    } else {
        ui::style_text(
            "Snapshots already populated, nothing to seed",
            ui::StyleType::Subtle,
        )
    };
    println!("{message}");
    Ok(())
}
