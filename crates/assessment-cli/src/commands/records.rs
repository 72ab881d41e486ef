//! Record commands: list, show, create, update, delete, and the queries.

use anyhow::Result;
use chrono::NaiveDate;

use assessment_core::model::NewAssessment;

use super::{print_records, Context};

pub fn list(ctx: &Context, json: bool) -> Result<()> {
    print_records(&ctx.service.list()?, json)
}

pub fn show(ctx: &Context, id: u64, json: bool) -> Result<()> {
    let record = ctx.service.get(id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&record.view())?);
    } else {
        print_records(std::slice::from_ref(&record), false)?;
    }
    Ok(())
}

pub fn create(ctx: &Context, new: NewAssessment) -> Result<()> {
    let record = ctx.service.create(new)?;
    println!(
        "Created assessment {} for {} on {}",
        record.id, record.student_name, record.assessment_date
    );
    Ok(())
}

pub fn update(ctx: &Context, id: u64, new: NewAssessment) -> Result<()> {
    let record = ctx.service.update(id, new)?;
    println!("Updated assessment {} ({})", record.id, record.student_name);
    Ok(())
}

pub fn delete(ctx: &Context, id: u64) -> Result<()> {
    ctx.service.delete(id)?;
    println!("Deleted assessment {id}");
    Ok(())
}

pub fn student(ctx: &Context, name: &str, json: bool) -> Result<()> {
    print_records(&ctx.service.by_student(name)?, json)
}

pub fn search(ctx: &Context, keyword: &str, json: bool) -> Result<()> {
    print_records(&ctx.service.search(keyword)?, json)
}

pub fn range(ctx: &Context, from: NaiveDate, to: NaiveDate, json: bool) -> Result<()> {
    if from > to {
        tracing::warn!("--from {from} is after --to {to}, nothing can match");
    }
    print_records(&ctx.service.by_date_range(from, to)?, json)
}

pub fn excellent(ctx: &Context, json: bool) -> Result<()> {
    print_records(&ctx.service.excellent()?, json)
}
