//! The `assess stats` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use assessment_core::model::{Metric, StatisticsSummary};

use super::Context;

pub fn execute(ctx: &Context, json: bool) -> Result<()> {
    let summary = ctx.service.statistics()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &StatisticsSummary) {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Average"]);
    table.add_row(vec![
        Cell::new("Discipline score"),
        Cell::new(format!("{:.2}", summary.average_discipline_score)),
    ]);
    table.add_row(vec![
        Cell::new("Skill completion rate"),
        Cell::new(format!("{:.1}%", summary.average_skill_completion_rate)),
    ]);
    table.add_row(vec![
        Cell::new("Task completion rate"),
        Cell::new(format!("{:.1}%", summary.average_task_completion_rate)),
    ]);
    table.add_row(vec![
        Cell::new("Total assessments"),
        Cell::new(summary.total_assessments),
    ]);
    println!("{table}");

    if summary.discipline_trend.is_empty() {
        return;
    }

    let mut trends = Table::new();
    trends.set_header(vec!["Date", "Discipline", "Skill %", "Task %"]);
    let series: Vec<_> = Metric::ALL.iter().map(|m| summary.trend(*m)).collect();
    // all three series share the same date keys
    for (i, point) in series[0].iter().enumerate() {
        let mut row = vec![Cell::new(&point.date), Cell::new(format!("{:.2}", point.value))];
        for s in &series[1..] {
            row.push(Cell::new(format!("{:.1}", s[i].value)));
        }
        trends.add_row(row);
    }
    println!("\nDaily trends:\n{trends}");
}
