//! The `assess report` command.

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::Local;

use assessment_report::{compose, render, report_file_name, write_report, Locale};

use super::Context;

pub fn execute(
    ctx: &Context,
    locale: Option<String>,
    out: Option<PathBuf>,
    format: &str,
) -> Result<()> {
    let locale: Locale = locale
        .as_deref()
        .unwrap_or(&ctx.config.default_locale)
        .parse()?;
    let summary = ctx.service.statistics()?;
    let records = ctx.service.list()?;

    match format {
        "pdf" => {
            let bytes = render(&summary, &records, locale)?;
            let path = out.unwrap_or_else(|| {
                ctx.config
                    .report_dir
                    .join(report_file_name(Local::now().date_naive()))
            });
            write_report(&path, &bytes)?;
            println!("Report written to {}", path.display());
        }
        "markdown" | "md" => {
            let markdown =
                compose(&summary, &records, locale, Local::now().naive_local()).to_markdown();
            match out {
                Some(path) => {
                    write_report(&path, markdown.as_bytes())?;
                    println!("Report written to {}", path.display());
                }
                None => print!("{markdown}"),
            }
        }
        other => bail!("unknown report format '{other}', expected pdf or markdown"),
    }
    Ok(())
}
