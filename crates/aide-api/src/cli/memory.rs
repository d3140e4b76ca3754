//! Memory browsing CLI command.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use aide_core::memory::MemoryStore;
use aide_types::memory::MemoryCategory;

use crate::state::AppState;

/// List persisted memory records, optionally filtered by category.
///
/// # Examples
///
/// ```bash
/// aide memories
/// aide memories --category goal
/// aide memories --json
/// ```
pub async fn list_memories(state: &AppState, category: Option<&str>, json: bool) -> Result<()> {
    let records = match category {
        Some(raw) => {
            let category: MemoryCategory = raw
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            state.store.list_by_category(category).await?
        }
        None => state.store.list_all().await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!(
            "  {} No memories yet. Memories are extracted from conversations.",
            style("i").blue().bold(),
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Content").fg(Color::White),
        Cell::new("Category").fg(Color::White),
        Cell::new("Source").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for record in &records {
        let content_display = if record.content.len() > 60 {
            format!("{}...", &record.content[..57])
        } else {
            record.content.clone()
        };

        let category_cell = match record.category {
            MemoryCategory::Attribute => Cell::new("attribute").fg(Color::Cyan),
            MemoryCategory::Goal => Cell::new("goal").fg(Color::Yellow),
            MemoryCategory::Memory => Cell::new("memory").fg(Color::Blue),
            MemoryCategory::Request => Cell::new("request").fg(Color::Magenta),
        };

        let source = match record.session_id {
            Some(session_id) => format!("session:{}", &session_id.to_string()[..8]),
            None => "manual".to_string(),
        };

        let updated = record.updated_at.format("%Y-%m-%d").to_string();

        table.add_row(vec![
            Cell::new(content_display).fg(Color::White),
            category_cell,
            Cell::new(source).fg(Color::DarkGrey),
            Cell::new(updated).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} memor{}",
        style(records.len()).bold(),
        if records.len() == 1 { "y" } else { "ies" }
    );
    println!();

    Ok(())
}
