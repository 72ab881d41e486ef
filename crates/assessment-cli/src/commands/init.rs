//! The `assess init` command.

use std::path::Path;

use anyhow::Result;

use assessment_core::config::{LOCAL_CONFIG_FILE, SAMPLE_CONFIG};

pub fn execute() -> Result<()> {
    if Path::new(LOCAL_CONFIG_FILE).exists() {
        println!("{LOCAL_CONFIG_FILE} already exists, skipping.");
    } else {
        std::fs::write(LOCAL_CONFIG_FILE, SAMPLE_CONFIG)?;
        println!("Created {LOCAL_CONFIG_FILE}");
    }

    println!("\nNext steps:");
    println!("  1. Edit {LOCAL_CONFIG_FILE} to choose the data file and report locale");
    println!("  2. Run: assess import scores.xlsx");
    println!("  3. Run: assess report");

    Ok(())
}
