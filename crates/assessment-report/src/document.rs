//! Report composition.
//!
//! A [`ReportDocument`] is a flat list of typed blocks. [`compose`] builds the
//! localized four-section report; [`compose_fallback`] builds the reduced
//! ASCII summary used when the localized document cannot be rendered. Both
//! are pure and deterministic for a given timestamp.

use std::fmt::Write as _;

use chrono::NaiveDateTime;

use assessment_core::model::{AssessmentRecord, StatisticsSummary};

use crate::locale::Locale;

/// One layout unit of a report.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(String),
    Paragraph(String),
    Table(Table),
    Bullets(Vec<String>),
}

/// A table with a header row and relative column widths.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Fractions of the available width, one per column.
    pub widths: Vec<f32>,
}

impl Table {
    pub fn new<S: Into<String>>(header: impl IntoIterator<Item = S>, widths: &[f32]) -> Self {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            widths: widths.to_vec(),
        }
    }

    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }
}

/// A composed report, ready for PDF or Markdown output.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    /// Selects the font family of the PDF output.
    pub locale: Locale,
    pub title: String,
    pub blocks: Vec<Block>,
}

/// Qualitative band of an average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

/// Discipline averages have no "fair" band.
pub fn discipline_tier(average: f64) -> Tier {
    if average >= 4.0 {
        Tier::Excellent
    } else if average >= 3.0 {
        Tier::Good
    } else {
        Tier::NeedsImprovement
    }
}

/// Band of a skill or task completion percentage.
pub fn rate_tier(average: f64) -> Tier {
    if average >= 90.0 {
        Tier::Excellent
    } else if average >= 80.0 {
        Tier::Good
    } else if average >= 70.0 {
        Tier::Fair
    } else {
        Tier::NeedsImprovement
    }
}

/// A line of the recommendations section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Discipline,
    SkillTraining,
    TaskSupport,
    AssessMoreOften,
    ReviewRegularly,
    RewardExcellence,
}

/// Recommendations for `summary`, in report order. The last two are always present.
pub fn recommendations(summary: &StatisticsSummary) -> Vec<Recommendation> {
    let mut out = Vec::new();
    if summary.average_discipline_score < 4.0 {
        out.push(Recommendation::Discipline);
    }
    if summary.average_skill_completion_rate < 85.0 {
        out.push(Recommendation::SkillTraining);
    }
    if summary.average_task_completion_rate < 85.0 {
        out.push(Recommendation::TaskSupport);
    }
    if summary.total_assessments < 10 {
        out.push(Recommendation::AssessMoreOften);
    }
    out.push(Recommendation::ReviewRegularly);
    out.push(Recommendation::RewardExcellence);
    out
}

impl Recommendation {
    pub fn text(self, locale: Locale) -> &'static str {
        use Recommendation::*;
        match locale {
            Locale::ZhCn => match self {
                Discipline => "加强纪律管理，建立更完善的行为规范体系",
                SkillTraining => "优化技能培训方案，增加实践操作机会",
                TaskSupport => "改进任务分配机制，提供更多支持和指导",
                AssessMoreOften => "建议增加评估频次，获得更全面的数据支撑",
                ReviewRegularly => "定期回顾评估结果，持续优化管理策略",
                RewardExcellence => "建立激励机制，鼓励优秀表现",
            },
            Locale::En => match self {
                Discipline => "Strengthen discipline management with clearer rules of conduct",
                SkillTraining => "Refine the skills training plan and add hands-on practice",
                TaskSupport => "Improve task allocation and give more support and guidance",
                AssessMoreOften => "Assess more often to build a fuller picture",
                ReviewRegularly => "Review assessment results regularly and adjust management",
                RewardExcellence => "Set up incentives that reward outstanding performance",
            },
        }
    }
}

fn discipline_judgment(locale: Locale, tier: Tier) -> &'static str {
    match (locale, tier) {
        (Locale::ZhCn, Tier::Excellent) => "整体表现优秀",
        (Locale::ZhCn, Tier::Good) => "整体表现良好",
        (Locale::ZhCn, _) => "需要改进",
        (Locale::En, Tier::Excellent) => "excellent overall",
        (Locale::En, Tier::Good) => "good overall",
        (Locale::En, _) => "needs improvement",
    }
}

fn skill_judgment(locale: Locale, tier: Tier) -> &'static str {
    match (locale, tier) {
        (Locale::ZhCn, Tier::Excellent) => "技能掌握优秀",
        (Locale::ZhCn, Tier::Good) => "技能掌握良好",
        (Locale::ZhCn, Tier::Fair) => "技能掌握一般",
        (Locale::ZhCn, Tier::NeedsImprovement) => "需要加强技能训练",
        (Locale::En, Tier::Excellent) => "excellent skill mastery",
        (Locale::En, Tier::Good) => "good skill mastery",
        (Locale::En, Tier::Fair) => "fair skill mastery",
        (Locale::En, Tier::NeedsImprovement) => "skill training needs strengthening",
    }
}

fn task_judgment(locale: Locale, tier: Tier) -> &'static str {
    match (locale, tier) {
        (Locale::ZhCn, Tier::Excellent) => "执行能力优秀",
        (Locale::ZhCn, Tier::Good) => "执行能力良好",
        (Locale::ZhCn, Tier::Fair) => "执行能力一般",
        (Locale::ZhCn, Tier::NeedsImprovement) => "需要提升执行能力",
        (Locale::En, Tier::Excellent) => "excellent execution",
        (Locale::En, Tier::Good) => "good execution",
        (Locale::En, Tier::Fair) => "fair execution",
        (Locale::En, Tier::NeedsImprovement) => "execution needs improvement",
    }
}

const SUMMARY_WIDTHS: [f32; 2] = [0.5, 0.5];
const DETAIL_WIDTHS: [f32; 6] = [0.22, 0.18, 0.15, 0.15, 0.15, 0.15];

/// Compose the full localized report.
///
/// Detail rows follow the order of `records`.
pub fn compose(
    summary: &StatisticsSummary,
    records: &[AssessmentRecord],
    locale: Locale,
    generated_at: NaiveDateTime,
) -> ReportDocument {
    let s = locale.strings();
    let mut blocks = vec![Block::Paragraph(format!(
        "{}: {}",
        s.generated_at,
        generated_at.format(locale.timestamp_format())
    ))];

    // Overview
    blocks.push(Block::Heading(s.overview.to_string()));
    let mut overview = Table::new([s.metric_header, s.value_header], &SUMMARY_WIDTHS);
    let (points, count) = match locale {
        Locale::ZhCn => (" 分", " 条"),
        Locale::En => ("", ""),
    };
    overview.push_row([
        s.discipline.to_string(),
        format!("{:.2}{points}", summary.average_discipline_score),
    ]);
    overview.push_row([
        s.skill.to_string(),
        format!("{:.1}%", summary.average_skill_completion_rate),
    ]);
    overview.push_row([
        s.task.to_string(),
        format!("{:.1}%", summary.average_task_completion_rate),
    ]);
    overview.push_row([
        s.total.to_string(),
        format!("{}{count}", summary.total_assessments),
    ]);
    blocks.push(Block::Table(overview));

    // Details
    blocks.push(Block::Heading(s.details.to_string()));
    if records.is_empty() {
        blocks.push(Block::Paragraph(s.no_data.to_string()));
    } else {
        let mut details = Table::new(s.detail_columns, &DETAIL_WIDTHS);
        for r in records {
            details.push_row([
                r.student_name.clone(),
                r.assessment_date.format("%Y-%m-%d").to_string(),
                format!("{}/5", r.discipline_score),
                format!("{:.1}%", r.skill_completion_rate),
                r.tasks_completed.to_string(),
                r.total_tasks.to_string(),
            ]);
        }
        blocks.push(Block::Table(details));
    }

    // Analysis
    blocks.push(Block::Heading(s.analysis.to_string()));
    blocks.extend(analysis(summary, locale).into_iter().map(Block::Paragraph));

    // Recommendations
    blocks.push(Block::Heading(s.recommendations.to_string()));
    blocks.push(Block::Bullets(
        recommendations(summary)
            .into_iter()
            .map(|r| r.text(locale).to_string())
            .collect(),
    ));

    ReportDocument {
        locale,
        title: s.title.to_string(),
        blocks,
    }
}

fn analysis(summary: &StatisticsSummary, locale: Locale) -> Vec<String> {
    let discipline = summary.average_discipline_score;
    let skill = summary.average_skill_completion_rate;
    let task = summary.average_task_completion_rate;
    let dj = discipline_judgment(locale, discipline_tier(discipline));
    let sj = skill_judgment(locale, rate_tier(skill));
    let tj = task_judgment(locale, rate_tier(task));

    match locale {
        Locale::ZhCn => vec![
            format!(
                "基于当前{}条评估记录的分析结果：",
                summary.total_assessments
            ),
            format!("1. 纪律表现：平均{discipline:.2}分，{dj}"),
            format!("2. 技能发展：平均达标率{skill:.1}%，{sj}"),
            format!("3. 任务执行：平均完成率{task:.1}%，{tj}"),
        ],
        Locale::En => vec![
            format!(
                "Based on the current {} assessment records:",
                summary.total_assessments
            ),
            format!("1. Discipline: average {discipline:.2} points, {dj}."),
            format!("2. Skills: average completion {skill:.1}%, {sj}."),
            format!("3. Tasks: average completion {task:.1}%, {tj}."),
        ],
    }
}

/// Compose the reduced ASCII-only summary report.
pub fn compose_fallback(
    summary: &StatisticsSummary,
    generated_at: NaiveDateTime,
) -> ReportDocument {
    let mut table = Table::new(["Metric", "Value"], &[0.6, 0.4]);
    table.push_row([
        "Average Discipline Score".to_string(),
        format!("{:.2}", summary.average_discipline_score),
    ]);
    table.push_row([
        "Average Skill Rate".to_string(),
        format!("{:.1}%", summary.average_skill_completion_rate),
    ]);
    table.push_row([
        "Average Task Rate".to_string(),
        format!("{:.1}%", summary.average_task_completion_rate),
    ]);
    table.push_row([
        "Total Records".to_string(),
        summary.total_assessments.to_string(),
    ]);

    ReportDocument {
        locale: Locale::En,
        title: "Assessment System Report".to_string(),
        blocks: vec![
            Block::Heading("Summary Statistics:".to_string()),
            Block::Table(table),
            Block::Paragraph(format!(
                "Generated: {}",
                generated_at.format("%Y-%m-%d %H:%M:%S")
            )),
        ],
    }
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n', '\t'], " ")
}

impl ReportDocument {
    /// Render as GitHub-flavored Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n", self.title);
        for block in &self.blocks {
            out.push('\n');
            match block {
                Block::Heading(text) => {
                    let _ = writeln!(out, "## {text}");
                }
                Block::Paragraph(text) => {
                    let _ = writeln!(out, "{text}");
                }
                Block::Table(table) => {
                    let header: Vec<_> = table.header.iter().map(|c| escape_cell(c)).collect();
                    let _ = writeln!(out, "| {} |", header.join(" | "));
                    let _ = writeln!(out, "|{}", "---|".repeat(table.header.len()));
                    for row in &table.rows {
                        let cells: Vec<_> = row.iter().map(|c| escape_cell(c)).collect();
                        let _ = writeln!(out, "| {} |", cells.join(" | "));
                    }
                }
                Block::Bullets(items) => {
                    for item in items {
                        let _ = writeln!(out, "- {item}");
                    }
                }
            }
        }
        out
    }

    /// All text the document will draw, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.title.as_str()).chain(self.blocks.iter().flat_map(|b| {
            let items: Vec<&str> = match b {
                Block::Heading(t) | Block::Paragraph(t) => vec![t.as_str()],
                Block::Table(t) => t
                    .header
                    .iter()
                    .chain(t.rows.iter().flatten())
                    .map(String::as_str)
                    .collect(),
                Block::Bullets(items) => items.iter().map(String::as_str).collect(),
            };
            items
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap()
    }

    fn summary(discipline: f64, skill: f64, task: f64, total: u64) -> StatisticsSummary {
        StatisticsSummary {
            average_discipline_score: discipline,
            average_skill_completion_rate: skill,
            average_task_completion_rate: task,
            total_assessments: total,
            ..StatisticsSummary::empty()
        }
    }

    fn record(id: u64, name: &str) -> AssessmentRecord {
        AssessmentRecord {
            id,
            student_name: name.into(),
            assessment_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            discipline_score: 4,
            skill_completion_rate: 87.5,
            tasks_completed: 3,
            total_tasks: 4,
        }
    }

    fn headings(doc: &ReportDocument) -> Vec<&str> {
        doc.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let doc = compose(&summary(4.0, 90.0, 90.0, 12), &[record(1, "Ann")], Locale::ZhCn, at());
        assert_eq!(doc.title, "评估系统统计报告");
        assert_eq!(
            headings(&doc),
            vec!["一、数据概述", "二、详细评估记录", "三、数据分析", "四、改进建议"]
        );
        assert_eq!(
            doc.blocks[0],
            Block::Paragraph("报告生成时间: 2024年03月05日 14:07:09".into())
        );
    }

    #[test]
    fn summary_table_formats_values() {
        let doc = compose(&summary(3.456, 85.04, 72.36, 7), &[], Locale::ZhCn, at());
        let Block::Table(table) = &doc.blocks[2] else {
            panic!("expected summary table");
        };
        assert_eq!(table.header, vec!["评估项目", "平均分/完成率"]);
        let values: Vec<_> = table.rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(values, vec!["3.46 分", "85.0%", "72.4%", "7 条"]);

        let en = compose(&summary(3.456, 85.04, 72.36, 7), &[], Locale::En, at());
        let Block::Table(table) = &en.blocks[2] else {
            panic!("expected summary table");
        };
        assert_eq!(table.rows[0][1], "3.46");
        assert_eq!(table.rows[3][1], "7");
    }

    #[test]
    fn detail_rows_keep_fetch_order() {
        let records = vec![record(2, "Zed"), record(1, "Amy")];
        let doc = compose(&summary(4.0, 90.0, 90.0, 2), &records, Locale::En, at());
        let Block::Table(details) = &doc.blocks[4] else {
            panic!("expected details table");
        };
        assert_eq!(details.header.len(), 6);
        assert_eq!(details.rows[0], vec!["Zed", "2024-01-02", "4/5", "87.5%", "3", "4"]);
        assert_eq!(details.rows[1][0], "Amy");
    }

    #[test]
    fn empty_details_become_no_data_line() {
        let doc = compose(&summary(0.0, 0.0, 0.0, 0), &[], Locale::ZhCn, at());
        assert_eq!(doc.blocks[4], Block::Paragraph("暂无评估数据".into()));
    }

    #[test]
    fn tiers_use_inclusive_thresholds() {
        assert_eq!(discipline_tier(4.0), Tier::Excellent);
        assert_eq!(discipline_tier(3.99), Tier::Good);
        assert_eq!(discipline_tier(3.0), Tier::Good);
        assert_eq!(discipline_tier(2.99), Tier::NeedsImprovement);
        assert_eq!(rate_tier(90.0), Tier::Excellent);
        assert_eq!(rate_tier(80.0), Tier::Good);
        assert_eq!(rate_tier(70.0), Tier::Fair);
        assert_eq!(rate_tier(69.9), Tier::NeedsImprovement);
    }

    #[test]
    fn analysis_lines_carry_judgments() {
        let doc = compose(&summary(3.5, 91.0, 65.0, 20), &[], Locale::ZhCn, at());
        let paragraphs: Vec<_> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.as_str()),
                _ => None,
            })
            .collect();
        assert!(paragraphs.contains(&"基于当前20条评估记录的分析结果："));
        assert!(paragraphs.contains(&"1. 纪律表现：平均3.50分，整体表现良好"));
        assert!(paragraphs.contains(&"2. 技能发展：平均达标率91.0%，技能掌握优秀"));
        assert!(paragraphs.contains(&"3. 任务执行：平均完成率65.0%，需要提升执行能力"));
    }

    #[test]
    fn recommendations_are_conditional() {
        use Recommendation::*;
        assert_eq!(
            recommendations(&summary(4.0, 85.0, 85.0, 10)),
            vec![ReviewRegularly, RewardExcellence]
        );
        assert_eq!(
            recommendations(&summary(3.9, 84.9, 84.9, 9)),
            vec![
                Discipline,
                SkillTraining,
                TaskSupport,
                AssessMoreOften,
                ReviewRegularly,
                RewardExcellence
            ]
        );
        assert_eq!(
            recommendations(&summary(4.5, 50.0, 95.0, 30)),
            vec![SkillTraining, ReviewRegularly, RewardExcellence]
        );
    }

    #[test]
    fn recommendations_block_is_last() {
        use Recommendation::*;
        let doc = compose(&summary(4.5, 95.0, 95.0, 30), &[], Locale::En, at());
        assert_eq!(
            doc.blocks.last(),
            Some(&Block::Bullets(vec![
                ReviewRegularly.text(Locale::En).to_string(),
                RewardExcellence.text(Locale::En).to_string(),
            ]))
        );
    }

    #[test]
    fn fallback_is_ascii_summary() {
        let doc = compose_fallback(&summary(2.0, 50.0, 75.0, 3), at());
        assert_eq!(doc.title, "Assessment System Report");
        assert!(doc.texts().all(|t| t.is_ascii()));
        let Block::Table(table) = &doc.blocks[1] else {
            panic!("expected summary table");
        };
        assert_eq!(table.rows[0], vec!["Average Discipline Score", "2.00"]);
        assert_eq!(table.rows[3], vec!["Total Records", "3"]);
        assert_eq!(
            doc.blocks.last(),
            Some(&Block::Paragraph("Generated: 2024-03-05 14:07:09".into()))
        );
    }

    #[test]
    fn markdown_rendering() {
        let doc = compose(&summary(4.0, 90.0, 90.0, 1), &[record(1, "A|B")], Locale::En, at());
        let md = doc.to_markdown();
        assert!(md.starts_with("# Assessment System Statistics Report\n"));
        assert!(md.contains("## 1. Overview"));
        assert!(md.contains("| Metric | Average / Rate |\n|---|---|\n"));
        assert!(md.contains("| A\\|B | 2024-01-02 | 4/5 |"));
        assert!(md.contains("- Review assessment results regularly"));
    }

    #[test]
    fn markdown_cells_stay_on_one_line() {
        let doc = compose(&summary(4.0, 90.0, 90.0, 1), &[record(1, "Ann\nLee")], Locale::En, at());
        assert!(doc.to_markdown().contains("| Ann Lee | 2024-01-02 |"));
    }

    #[test]
    fn texts_cover_every_cell() {
        let doc = compose(&summary(4.0, 90.0, 90.0, 1), &[record(1, "Ann")], Locale::En, at());
        assert!(doc.texts().any(|t| t == "Ann"));
        assert!(doc.texts().any(|t| t == doc.title));
    }
}
