//! The `assess import` command.

use std::path::Path;

use anyhow::{Context as _, Result};
use comfy_table::{Cell, Table};

use super::Context;

pub fn execute(ctx: &Context, file: &Path, json: bool) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let outcome = ctx.service.import_upload(&file_name, &bytes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!(
        "Imported {} record(s) from {} ({} rejected, {} blank row(s) skipped)",
        outcome.imported(),
        file_name,
        outcome.rejected.len(),
        outcome.skipped_blank
    );

    if !outcome.rejected.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Row", "Reason"]);
        for rejected in &outcome.rejected {
            table.add_row(vec![
                Cell::new(rejected.row),
                Cell::new(&rejected.error),
            ]);
        }
        println!("{table}");
    }
    Ok(())
}
