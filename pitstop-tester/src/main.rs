mod reports;
mod scenarios;
mod tester;
mod util;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use scenarios::{expand_scenarios, get_scenario, list_scenarios};
use tester::{ScenarioResult, ScenarioRunner};
use util::{parse_seeds, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "pitstop-tester", version)]
#[command(about = "Automated QA scenarios for the Manual Pitstop site controls")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, decimal or 0x hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    let start_time = Instant::now();
    let seeds = parse_seeds(&args.seeds)?;
    anyhow::ensure!(!seeds.is_empty(), "at least one seed is required");

    if args.report == ReportFormat::Console {
        announce_banner();
    }
    let results = run_scenarios(&args, &seeds);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🏁 Pitstop Automated Tester".bright_cyan().bold());
    println!("{}", "============================".cyan());
}

fn run_scenarios(args: &Args, seeds: &[u64]) -> Vec<ScenarioResult> {
    let runner = ScenarioRunner::new(args.verbose);
    let mut results = Vec::new();
    for key in expand_scenarios(&split_csv(&args.scenarios)) {
        match get_scenario(&key) {
            Some(scenario) => {
                results.extend(runner.run_scenario(&scenario, seeds, args.iterations));
            }
            None => eprintln!("⚠️  Unknown scenario: {}", key.yellow()),
        }
    }
    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let generated_at = Utc::now();

    match args.report {
        ReportFormat::Json => {
            reports::generate_json_report(output_target.writer(), results, generated_at)?;
        }
        ReportFormat::Markdown => {
            reports::generate_markdown_report(output_target.writer(), results, generated_at)?;
        }
        ReportFormat::Console => {
            reports::generate_console_report(
                output_target.writer(),
                results,
                start_time.elapsed(),
            )?;
            writeln!(output_target.writer())?;
            writeln!(output_target.writer(), "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            scenarios: "font-bounds,preferences".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 2,
            report: ReportFormat::Json,
            output: None,
            verbose: false,
        }
    }

    #[test]
    fn args_parse_report_formats() {
        let args = Args::try_parse_from([
            "pitstop-tester",
            "--report",
            "markdown",
            "--seeds",
            "1,2",
        ])
        .expect("valid args");
        assert_eq!(args.report, ReportFormat::Markdown);
        assert_eq!(args.scenarios, "all");
        assert!(Args::try_parse_from(["pitstop-tester", "--report", "csv"]).is_err());
    }

    #[test]
    fn run_scenarios_skips_unknown_keys() {
        let mut args = base_args();
        args.scenarios = "font-bounds,warp-drive".to_string();
        let results = run_scenarios(&args, &[1, 2]);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn write_reports_to_file() {
        let path = std::env::temp_dir().join(format!(
            "pitstop-report-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let mut args = base_args();
        args.output = Some(path.clone());
        let results = run_scenarios(&args, &[7]);
        write_reports(&args, &results, Instant::now()).expect("write report");
        let body = std::fs::read_to_string(&path).expect("report written");
        assert!(body.contains("\"Preference Storage Round Trip\""));
        let _ = std::fs::remove_file(path);
    }
}
