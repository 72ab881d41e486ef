//! Report locales and their fixed strings.

use std::fmt;
use std::str::FromStr;

/// Output language of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    /// Simplified Chinese, rendered with a CJK font.
    #[default]
    ZhCn,
    /// English, rendered with a standard Latin font.
    En,
}

impl Locale {
    pub fn tag(self) -> &'static str {
        match self {
            Locale::ZhCn => "zh-CN",
            Locale::En => "en",
        }
    }

    /// The fixed strings for this locale.
    pub fn strings(self) -> &'static Strings {
        match self {
            Locale::ZhCn => &ZH_CN,
            Locale::En => &EN,
        }
    }

    /// Timestamp layout of the report header.
    pub(crate) fn timestamp_format(self) -> &'static str {
        match self {
            Locale::ZhCn => "%Y年%m月%d日 %H:%M:%S",
            Locale::En => "%Y-%m-%d %H:%M:%S",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown locale '{0}', expected zh-CN or en")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "zh" | "zh-cn" => Ok(Locale::ZhCn),
            "en" | "en-us" => Ok(Locale::En),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

/// Labels and fixed sentences of a localized report.
#[derive(Debug)]
pub struct Strings {
    pub title: &'static str,
    pub generated_at: &'static str,

    pub overview: &'static str,
    pub metric_header: &'static str,
    pub value_header: &'static str,
    pub discipline: &'static str,
    pub skill: &'static str,
    pub task: &'static str,
    pub total: &'static str,

    pub details: &'static str,
    pub detail_columns: [&'static str; 6],
    pub no_data: &'static str,

    pub analysis: &'static str,
    pub recommendations: &'static str,
}

const ZH_CN: Strings = Strings {
    title: "评估系统统计报告",
    generated_at: "报告生成时间",
    overview: "一、数据概述",
    metric_header: "评估项目",
    value_header: "平均分/完成率",
    discipline: "纪律遵守度",
    skill: "技能达标率",
    task: "任务完成率",
    total: "评估总数",
    details: "二、详细评估记录",
    detail_columns: [
        "学生姓名",
        "评估日期",
        "纪律遵守度",
        "技能达标率",
        "已完成任务",
        "总任务数",
    ],
    no_data: "暂无评估数据",
    analysis: "三、数据分析",
    recommendations: "四、改进建议",
};

const EN: Strings = Strings {
    title: "Assessment System Statistics Report",
    generated_at: "Report generated",
    overview: "1. Overview",
    metric_header: "Metric",
    value_header: "Average / Rate",
    discipline: "Discipline score",
    skill: "Skill completion rate",
    task: "Task completion rate",
    total: "Total assessments",
    details: "2. Assessment Records",
    detail_columns: [
        "Student",
        "Date",
        "Discipline",
        "Skill rate",
        "Completed",
        "Total tasks",
    ],
    no_data: "No assessment data",
    analysis: "3. Analysis",
    recommendations: "4. Recommendations",
};
