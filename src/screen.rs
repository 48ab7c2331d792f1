use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::warn;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::oracle::{JudgmentOracle, OpenAiOracle, PlainTextExtractor, TextExtractor};
use crate::telemetry;
use crate::workflows::screening::{
    DocumentSource, FilterOptions, QuestionDraft, ScreeningService, ScreeningStatus, SortSpec,
    EXPORT_FILE_NAME,
};

#[derive(Args, Debug)]
pub(crate) struct ScreenArgs {
    /// JSON file containing the question set
    #[arg(long)]
    pub(crate) questions: PathBuf,
    /// Directory of candidate documents (.txt) to screen
    #[arg(long)]
    pub(crate) documents: PathBuf,
    /// Free-text guidance forwarded to the scoring oracle
    #[arg(long, default_value = "")]
    pub(crate) guidance: String,
    /// Where to write the CSV results
    #[arg(long, default_value = EXPORT_FILE_NAME)]
    pub(crate) output: PathBuf,
}

pub(crate) async fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let drafts = load_question_file(&args.questions)?;
    let documents = load_documents(&args.documents)?;
    if documents.is_empty() {
        println!(
            "No readable .txt documents found in {}",
            args.documents.display()
        );
        return Ok(());
    }

    let oracle = OpenAiOracle::from_config(&config.oracle)?;
    let service = ScreeningService::new(oracle);

    let question_count = service.configure(drafts, args.guidance.clone())?;
    let admitted = service.admit(documents)?;
    println!("Screening {admitted} candidates against {question_count} questions");

    service.run_batch().await?;

    print_summary(&service);

    let csv = service.export_csv()?;
    fs::write(&args.output, csv)?;
    println!("\nResults written to {}", args.output.display());

    Ok(())
}

fn print_summary<O: JudgmentOracle>(service: &ScreeningService<O>) {
    let ranked = service.results(&FilterOptions::default(), &SortSpec::default());
    let snapshot = service.roster().snapshot();

    let completed = snapshot
        .iter()
        .filter(|candidate| candidate.status == ScreeningStatus::Completed)
        .count();
    let errored = snapshot.len() - completed;
    let excluded = snapshot
        .iter()
        .filter(|candidate| candidate.is_excluded())
        .count();

    println!(
        "\nBatch finished: {completed} completed, {errored} failed, {excluded} excluded by filters"
    );

    println!("\nRanking");
    for view in &ranked {
        match view.status {
            "completed" => {
                let score = view.score.as_deref().unwrap_or("0/0");
                let exclusion_note = match &view.excluded_reason {
                    Some(reason) => format!(" [excluded: {reason}]"),
                    None => String::new(),
                };
                println!(
                    "- {}: {} ({:.0}%){}",
                    view.name, score, view.percentage, exclusion_note
                );
            }
            "error" => {
                let reason = view.error.as_deref().unwrap_or("unknown failure");
                println!("- {}: failed ({reason})", view.name);
            }
            other => println!("- {}: {other}", view.name),
        }
    }
}

fn load_question_file(path: &Path) -> Result<Vec<QuestionDraft>, AppError> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| AppError::QuestionFile {
        path: path.display().to_string(),
        source,
    })
}

/// Ingest every `.txt` document in the directory. Extraction failures are
/// per item: a bad document is skipped with a warning, never fatal.
fn load_documents(dir: &Path) -> Result<Vec<DocumentSource>, AppError> {
    let extractor = PlainTextExtractor;

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("txt"))
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("document")
            .to_string();
        let bytes = fs::read(&path)?;

        match extractor.extract(&name, &bytes) {
            Ok(text) => documents.push(DocumentSource { name, text }),
            Err(err) => warn!(%err, path = %path.display(), "skipping document"),
        }
    }

    Ok(documents)
}
