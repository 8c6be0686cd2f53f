//! sheetgrade CLI: scan answer sheets and grade answer vectors.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use sheetgrade::{AnswerKeySection, RecognitionResult, ScanConfig, Scanner, SheetTemplate};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "sheetgrade")]
#[command(about = "Read fixed-layout bubble answer sheets and grade them against an answer key")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one answer-sheet photo.
    Scan(CliScanArgs),

    /// Grade a decoded or hand-corrected answer vector.
    Grade(CliGradeArgs),

    /// Print canonical geometry of the sheet template.
    TemplateInfo {
        /// Template JSON (`sheetgrade.template.v1`); built-in sheet when omitted.
        #[arg(long)]
        template: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
struct CliScanArgs {
    /// Path to the sheet photo.
    #[arg(long)]
    image: PathBuf,

    /// Path to write the recognition result (JSON). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Template JSON (`sheetgrade.template.v1`); built-in sheet when omitted.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Scan configuration JSON; missing keys take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Route results below this overall confidence to manual review.
    #[arg(long, default_value_t = ReviewPolicy::DEFAULT_MIN_CONFIDENCE)]
    min_confidence: f32,
}

#[derive(Debug, Clone, Args)]
struct CliGradeArgs {
    /// Answers JSON: a bare array of 30 values or a scan result with an `answers` field.
    #[arg(long)]
    answers: PathBuf,

    /// Answer key JSON: array of sections.
    #[arg(long)]
    key: PathBuf,

    /// Path to write the graded result (JSON). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Decides whether a recognition result needs a human operator.
#[derive(Debug, Clone, Copy)]
struct ReviewPolicy {
    min_confidence: f32,
}

impl ReviewPolicy {
    const DEFAULT_MIN_CONFIDENCE: f32 = 0.8;

    fn needs_review(&self, result: &RecognitionResult) -> bool {
        !result.errors.is_empty() || result.confidence < self.min_confidence
    }
}

/// Scan output: the recognition result plus the review decision.
#[derive(serde::Serialize)]
struct ScanReport<'a> {
    #[serde(flatten)]
    result: &'a RecognitionResult,
    review_needed: bool,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum AnswersInput {
    Vector(Vec<u8>),
    ScanResult { answers: Vec<u8> },
}

impl AnswersInput {
    fn into_answers(self) -> Vec<u8> {
        match self {
            Self::Vector(v) | Self::ScanResult { answers: v } => v,
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => run_scan(&args),
        Commands::Grade(args) => run_grade(&args),
        Commands::TemplateInfo { template } => run_template_info(template.as_deref()),
    }
}

fn load_template(path: Option<&Path>) -> CliResult<SheetTemplate> {
    match path {
        Some(p) => {
            tracing::info!("Loading template: {}", p.display());
            Ok(SheetTemplate::from_json_file(p)?)
        }
        None => Ok(SheetTemplate::default()),
    }
}

fn write_json<T: serde::Serialize>(value: &T, out: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            std::fs::write(path, &json)?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

// ── scan ───────────────────────────────────────────────────────────────

fn run_scan(args: &CliScanArgs) -> CliResult<()> {
    let template = load_template(args.template.as_deref())?;
    let config = match &args.config {
        Some(p) => ScanConfig::from_json_file(p)?,
        None => ScanConfig::default(),
    };
    let scanner = Scanner::with_config(template, config);

    tracing::info!("Scanning image: {}", args.image.display());
    let result = scanner.scan_path(&args.image)?;
    let policy = ReviewPolicy {
        min_confidence: args.min_confidence,
    };
    let review_needed = policy.needs_review(&result);

    tracing::info!(
        "Scanned sheet: confidence={:.3}, {} error(s), review_needed={}",
        result.confidence,
        result.errors.len(),
        review_needed,
    );
    for err in &result.errors {
        tracing::warn!("{}", err);
    }

    write_json(
        &ScanReport {
            result: &result,
            review_needed,
        },
        args.out.as_deref(),
    )
}

// ── grade ──────────────────────────────────────────────────────────────

fn run_grade(args: &CliGradeArgs) -> CliResult<()> {
    let answers: AnswersInput = serde_json::from_str(&std::fs::read_to_string(&args.answers)?)?;
    let key: Vec<AnswerKeySection> = serde_json::from_str(&std::fs::read_to_string(&args.key)?)?;

    let graded = sheetgrade::grade(&answers.into_answers(), &key)?;
    tracing::info!("Overall score: {}", graded.overall_score);
    for task in &graded.tasks {
        tracing::info!("Section {}: {:?}", task.section_number, task.tier);
    }

    write_json(&graded, args.out.as_deref())
}

// ── template-info ──────────────────────────────────────────────────────

fn run_template_info(path: Option<&Path>) -> CliResult<()> {
    let template = load_template(path)?;
    let px = template.pixels();
    let [w, h] = px.canonical_size;

    println!("sheetgrade template: {}", template.name);
    println!(
        "  page:              {}x{} mm",
        template.page_size_mm[0], template.page_size_mm[1]
    );
    println!("  canonical raster:  {}x{} px", w, h);
    println!("  bubble radius:     {} px", px.bubble_radius);
    println!(
        "  identifier region: ({}, {}) size {} px",
        px.identifier_region.x, px.identifier_region.y, px.identifier_region.size
    );
    println!(
        "  ID prefixes:       '{}' at ({}, {}), '{}' at ({}, {})",
        template.id_prefixes[0],
        px.id_prefix[0][0],
        px.id_prefix[0][1],
        template.id_prefixes[1],
        px.id_prefix[1][0],
        px.id_prefix[1][1]
    );
    println!(
        "  first answer:      q1 choice 1 at ({}, {})",
        px.answers[0][0][0], px.answers[0][0][1]
    );
    let last = px.answers.len() - 1;
    println!(
        "  last answer:       q{} choice 5 at ({}, {})",
        last + 1,
        px.answers[last][4][0],
        px.answers[last][4][1]
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(errors: Vec<String>, confidence: f32) -> RecognitionResult {
        serde_json::from_value(serde_json::json!({
            "identifier": "T1",
            "student_id": "h12345",
            "answers": vec![1; 30],
            "confidence": confidence,
            "errors": errors,
            "field_confidence": {
                "identifier": 1.0,
                "student_id": confidence,
                "answers": vec![confidence; 30],
            },
        }))
        .expect("valid result json")
    }

    #[test]
    fn review_needed_on_errors_or_low_confidence() {
        let policy = ReviewPolicy {
            min_confidence: 0.8,
        };
        assert!(!policy.needs_review(&result(vec![], 0.95)));
        assert!(policy.needs_review(&result(vec![], 0.5)));
        assert!(policy.needs_review(&result(vec!["1 questions not marked".into()], 0.95)));
    }

    #[test]
    fn answers_input_accepts_vector_or_scan_result() {
        let bare: AnswersInput = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(bare.into_answers(), vec![1, 2, 3]);

        let scan: AnswersInput =
            serde_json::from_str(r#"{"answers":[0,5],"confidence":0.4,"errors":[]}"#).unwrap();
        assert_eq!(scan.into_answers(), vec![0, 5]);
    }

    #[test]
    fn scan_of_missing_image_reports_io_error() {
        let args = CliScanArgs {
            image: PathBuf::from("/nonexistent/sheet.png"),
            out: None,
            template: None,
            config: None,
            min_confidence: ReviewPolicy::DEFAULT_MIN_CONFIDENCE,
        };
        let err = run_scan(&args).expect_err("missing image must fail");
        assert!(matches!(
            err.downcast_ref::<sheetgrade::ScanError>(),
            Some(sheetgrade::ScanError::Io(_))
        ));
    }

    #[test]
    fn scan_report_flattens_result() {
        let r = result(vec![], 0.9);
        let json = serde_json::to_value(ScanReport {
            result: &r,
            review_needed: false,
        })
        .unwrap();
        assert_eq!(json["student_id"], "h12345");
        assert_eq!(json["review_needed"], false);
    }
}
