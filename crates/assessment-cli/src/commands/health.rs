//! The `assess health` command.

use anyhow::Result;

use super::Context;

pub fn execute(ctx: &Context, json: bool) -> Result<()> {
    let health = ctx.service.health()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        println!("status:  {}", health.status);
        println!("date:    {}", health.date);
        println!("version: {}", health.version);
        println!("records: {}", health.total_assessments);
        println!("data:    {}", ctx.config.data_file.display());
    }
    Ok(())
}
