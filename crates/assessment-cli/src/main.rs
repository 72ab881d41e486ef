//! Command-line front end of the assessment tracker.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use assessment_core::model::NewAssessment;

mod commands;

#[derive(Parser)]
#[command(name = "assess", version, about = "Student assessment tracker")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data file, overriding the configured one
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Fields of an assessment as given on the command line.
#[derive(Args)]
struct RecordArgs {
    /// Student name
    #[arg(long)]
    name: String,

    /// Assessment date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Discipline score, 1 to 5
    #[arg(long)]
    discipline: i32,

    /// Skill completion rate in percent
    #[arg(long, allow_negative_numbers = true)]
    skill: f64,

    /// Tasks completed
    #[arg(long, allow_negative_numbers = true)]
    completed: i32,

    /// Total tasks
    #[arg(long, allow_negative_numbers = true)]
    total: i32,
}

impl From<RecordArgs> for NewAssessment {
    fn from(args: RecordArgs) -> Self {
        NewAssessment {
            student_name: args.name,
            assessment_date: args.date,
            discipline_score: args.discipline,
            skill_completion_rate: args.skill,
            tasks_completed: args.completed,
            total_tasks: args.total,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config file
    Init,

    /// List all assessments
    List {
        #[arg(long)]
        json: bool,
    },

    /// Show one assessment
    Show {
        id: u64,
        #[arg(long)]
        json: bool,
    },

    /// Record a new assessment
    Create {
        #[command(flatten)]
        record: RecordArgs,
    },

    /// Replace every field of an assessment
    Update {
        id: u64,
        #[command(flatten)]
        record: RecordArgs,
    },

    /// Delete an assessment
    Delete { id: u64 },

    /// Assessments of one student, oldest first
    Student {
        name: String,
        #[arg(long)]
        json: bool,
    },

    /// Assessments whose student name contains a keyword
    Search {
        keyword: String,
        #[arg(long)]
        json: bool,
    },

    /// Assessments dated within a range (inclusive)
    Range {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        #[arg(long)]
        json: bool,
    },

    /// Averages and per-day trends
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Assessments with discipline >= 4 and skill rate >= 80%
    Excellent {
        #[arg(long)]
        json: bool,
    },

    /// Import assessments from an .xlsx/.xls file
    Import {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Generate the statistics report
    Report {
        /// Report locale: zh-CN or en (default from config)
        #[arg(long)]
        locale: Option<String>,

        /// Output path (default: <report_dir>/assessment_report_<YYYYMMDD>.pdf)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output format: pdf, markdown
        #[arg(long, default_value = "pdf")]
        format: String,
    },

    /// Check that the data store is readable
    Health {
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("assess=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let open = || commands::Context::open(cli.config.as_deref(), cli.data_file.clone());

    match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::List { json } => commands::records::list(&open()?, json),
        Commands::Show { id, json } => commands::records::show(&open()?, id, json),
        Commands::Create { record } => commands::records::create(&open()?, record.into()),
        Commands::Update { id, record } => commands::records::update(&open()?, id, record.into()),
        Commands::Delete { id } => commands::records::delete(&open()?, id),
        Commands::Student { name, json } => commands::records::student(&open()?, &name, json),
        Commands::Search { keyword, json } => commands::records::search(&open()?, &keyword, json),
        Commands::Range { from, to, json } => commands::records::range(&open()?, from, to, json),
        Commands::Excellent { json } => commands::records::excellent(&open()?, json),
        Commands::Stats { json } => commands::stats::execute(&open()?, json),
        Commands::Import { file, json } => commands::import::execute(&open()?, &file, json),
        Commands::Report {
            locale,
            out,
            format,
        } => commands::report::execute(&open()?, locale, out, &format),
        Commands::Health { json } => commands::health::execute(&open()?, json),
    }
}
