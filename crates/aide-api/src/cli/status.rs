//! System status command.

use anyhow::Result;
use console::style;

use aide_core::memory::MemoryStore;
use aide_types::memory::MemoryCategory;

use crate::state::AppState;

/// Display assistant status: record counts per category, data directory,
/// configured model.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let records = state.store.list_all().await?;
    let count_of = |category: MemoryCategory| {
        records.iter().filter(|r| r.category == category).count()
    };

    let attributes = count_of(MemoryCategory::Attribute);
    let goals = count_of(MemoryCategory::Goal);
    let memories = count_of(MemoryCategory::Memory);
    let requests = count_of(MemoryCategory::Request);

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "model": state.config.model,
            "records": {
                "total": records.len(),
                "attributes": attributes,
                "goals": goals,
                "memories": memories,
                "requests": requests,
            },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Aide v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("  Data dir:  {}", style(state.data_dir.display()).dim());
    println!("  Model:     {}", style(&state.config.model).cyan());
    println!();
    println!("  Memory records: {}", style(records.len()).bold());
    println!("    attributes  {attributes}");
    println!("    goals       {goals}");
    println!("    memories    {memories}");
    println!("    requests    {requests}");
    println!();

    Ok(())
}
