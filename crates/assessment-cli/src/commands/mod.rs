//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use assessment_core::config::{load_config_from, AssessmentConfig};
use assessment_core::model::AssessmentRecord;
use assessment_core::service::AssessmentService;
use assessment_core::store::JsonFileRepository;

pub mod health;
pub mod import;
pub mod init;
pub mod records;
pub mod report;
pub mod stats;

/// Loaded config plus a service over the configured data file.
pub struct Context {
    pub config: AssessmentConfig,
    pub service: AssessmentService,
}

impl Context {
    pub fn open(config_path: Option<&Path>, data_file: Option<PathBuf>) -> Result<Self> {
        let mut config = load_config_from(config_path)?;
        if let Some(path) = data_file {
            config.data_file = path;
        }
        let repository = JsonFileRepository::open(config.data_file.clone())?;
        let service = AssessmentService::new(Arc::new(repository))
            .with_max_upload_bytes(config.max_upload_bytes);
        Ok(Self { config, service })
    }
}

/// Print records as JSON views (with the derived task rate) or as a table.
pub fn print_records(records: &[AssessmentRecord], json: bool) -> Result<()> {
    if json {
        let views: Vec<_> = records.iter().map(AssessmentRecord::view).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No assessments found.");
        return Ok(());
    }

    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Student",
        "Date",
        "Discipline",
        "Skill %",
        "Tasks",
        "Task %",
    ]);
    for r in records {
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.student_name),
            Cell::new(r.assessment_date),
            Cell::new(format!("{}/5", r.discipline_score)),
            Cell::new(format!("{:.1}%", r.skill_completion_rate)),
            Cell::new(format!("{}/{}", r.tasks_completed, r.total_tasks)),
            Cell::new(format!("{:.1}%", r.task_completion_rate())),
        ]);
    }
    println!("{table}");
    println!("{} assessment(s)", records.len());
    Ok(())
}
