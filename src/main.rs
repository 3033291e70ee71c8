// src/main.rs
mod extractors;
mod storage;
mod utils;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use extractors::{
    extract_text, load_document, Clock, DocumentFormat, ExtractionResult, FactExtractor,
    FixedClock, Vocabulary, YearMonth,
};
use storage::{ExtractionMetadata, StorageManager};
use utils::humanize::time_ago;
use utils::AppError;

const VOCABULARY_ENV: &str = "RESUME_VOCABULARY";

/// Extracts skills, experience, education and job titles from résumé documents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Résumé files to process (.pdf, .docx, .doc)
    #[arg(required_unless_present = "history")]
    files: Vec<PathBuf>,

    /// Output directory for extracted profiles
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// JSON vocabulary override (falls back to $RESUME_VOCABULARY)
    #[arg(long)]
    vocabulary: Option<PathBuf>,

    /// Resolve "Present" date ranges against this month instead of today (YYYY-MM)
    #[arg(long)]
    as_of: Option<String>,

    /// Print profiles without saving them
    #[arg(long)]
    no_save: bool,

    /// List previously stored extractions and exit
    #[arg(long)]
    history: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting with args: {:?}", args);

    if args.history {
        return print_history(&args.output_dir);
    }

    // 3. Resolve configuration
    let vocabulary = match args
        .vocabulary
        .clone()
        .or_else(|| std::env::var_os(VOCABULARY_ENV).map(PathBuf::from))
    {
        Some(path) => Vocabulary::from_json_file(path)?,
        None => Vocabulary::default(),
    };
    let vocabulary = Arc::new(vocabulary);

    let as_of = args
        .as_of
        .as_deref()
        .map(str::parse::<YearMonth>)
        .transpose()
        .map_err(AppError::Config)?;

    // 4. Run with the requested clock
    match as_of {
        Some(month) => {
            tracing::info!("Resolving open-ended date ranges against {}", month);
            run(&args, FactExtractor::with_clock(vocabulary, FixedClock(month))).await
        }
        None => run(&args, FactExtractor::new(vocabulary)).await,
    }
}

async fn run<C: Clock + 'static>(args: &Args, extractor: FactExtractor<C>) -> Result<(), AppError> {
    let storage = if args.no_save {
        None
    } else {
        Some(StorageManager::new(&args.output_dir)?)
    };
    let extractor = Arc::new(extractor);

    let mut success_count = 0;
    let mut failure_count = 0;
    let mut claimed_keys = HashSet::new();

    for path in &args.files {
        tracing::info!("Processing {}", path.display());

        match process_file(path, Arc::clone(&extractor)).await {
            Ok((format, result)) => {
                success_count += 1;
                let profile = result.to_profile_record();

                match serde_json::to_string_pretty(&profile) {
                    Ok(json) => println!("{}", json),
                    Err(e) => tracing::error!("Failed to serialize profile: {}", e),
                }

                if let Some(storage) = &storage {
                    let key = StorageManager::claim_document_key(path, &mut claimed_keys);
                    let metadata = ExtractionMetadata::new(&key, path, format, &result, Utc::now());

                    if let Err(e) = storage.save_profile(&key, &profile) {
                        tracing::error!("Failed to save profile: {}", e);
                    }
                    if let Err(e) = storage.save_metadata(&key, &metadata) {
                        tracing::error!("Failed to save metadata: {}", e);
                    }
                }
            }
            Err(e) => {
                tracing::error!("Failed to extract {}: {}", path.display(), e);
                failure_count += 1;
            }
        }
    }

    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "Failed to extract any profile from {} file(s)",
            failure_count
        )));
    }

    Ok(())
}

/// Reads the file asynchronously, then decodes and extracts on the blocking pool.
async fn process_file<C: Clock + 'static>(
    path: &Path,
    extractor: Arc<FactExtractor<C>>,
) -> Result<(DocumentFormat, ExtractionResult), AppError> {
    let document = load_document(path).await?;
    let format = document.format;

    let result = tokio::task::spawn_blocking(move || {
        let text = extract_text(&document)?;
        extractor.extract(&text)
    })
    .await
    .map_err(|e| AppError::Processing(format!("Extraction task failed: {}", e)))??;

    Ok((format, result))
}

fn print_history(output_dir: &str) -> Result<(), AppError> {
    let storage = StorageManager::new(output_dir)?;
    let history = storage.list_history()?;

    if history.is_empty() {
        println!("No stored extractions in {}", output_dir);
        return Ok(());
    }

    let now = Utc::now();
    for entry in history {
        let age = entry
            .extracted_at()
            .map(|at| time_ago(at, now))
            .unwrap_or_else(|| "Recently".to_string());
        let key = if entry.document_key.is_empty() {
            StorageManager::document_key(Path::new(&entry.source_file))
        } else {
            entry.document_key.clone()
        };
        let skills = storage
            .load_profile(&key)
            .map(|profile| profile.skills)
            .unwrap_or_else(|_| format!("{} skills", entry.skills_count));
        println!(
            "{} [{}] experience: {} | education: {} | titles: {} | skills: {} | {}",
            entry.source_file,
            entry.format,
            entry.experience_years,
            entry.education,
            entry.job_titles.join(", "),
            skills,
            age
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
            .collect();
        let xml = format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn fixed_extractor() -> Arc<FactExtractor<FixedClock>> {
        let today = YearMonth::new(2025, 6).unwrap();
        Arc::new(FactExtractor::with_clock(Arc::new(Vocabulary::default()), FixedClock(today)))
    }

    #[tokio::test]
    async fn test_process_docx_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jane.docx");
        std::fs::write(
            &path,
            docx_bytes(&[
                "Jane Doe",
                "Professional Experience",
                "Software Engineer at Acme",
                "Sep 2020 – Present",
                "Education",
                "Master of Science, 2020",
                "Skills: Python, Docker",
            ]),
        )
        .unwrap();

        let (format, result) = process_file(&path, fixed_extractor()).await.unwrap();
        assert_eq!(format, DocumentFormat::Docx);

        let profile = result.to_profile_record();
        assert_eq!(profile.experience_years, "5");
        assert_eq!(profile.education, "Master's Degree");
        assert_eq!(profile.skills, "Python, Docker");
        assert_eq!(profile.job_titles, "Engineer");
    }

    #[tokio::test]
    async fn test_process_rejects_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Experience\nJan 2020 - Dec 2023").unwrap();

        let err = process_file(&path, fixed_extractor()).await.unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_run_saves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cv.docx");
        std::fs::write(&input, docx_bytes(&["Experience", "Jan 2020 - Dec 2023"])).unwrap();
        let output_dir = dir.path().join("out");

        let args = Args {
            files: vec![input],
            output_dir: output_dir.display().to_string(),
            vocabulary: None,
            as_of: None,
            no_save: false,
            history: false,
        };
        let extractor = FactExtractor::with_clock(
            Arc::new(Vocabulary::default()),
            FixedClock(YearMonth::new(2025, 6).unwrap()),
        );
        run(&args, extractor).await.unwrap();

        let storage = StorageManager::new(&output_dir).unwrap();
        assert_eq!(storage.load_profile("cv").unwrap().experience_years, "4");
        assert_eq!(storage.list_history().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_run_keeps_inputs_sharing_a_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        let first = dir.path().join("a").join("cv.docx");
        let second = dir.path().join("b").join("cv.docx");
        std::fs::write(&first, docx_bytes(&["Experience", "Jan 2020 - Dec 2023"])).unwrap();
        std::fs::write(&second, docx_bytes(&["Experience", "Mar 2025 - May 2025"])).unwrap();
        let output_dir = dir.path().join("out");

        let args = Args {
            files: vec![first, second],
            output_dir: output_dir.display().to_string(),
            vocabulary: None,
            as_of: None,
            no_save: false,
            history: false,
        };
        let extractor = FactExtractor::with_clock(
            Arc::new(Vocabulary::default()),
            FixedClock(YearMonth::new(2025, 6).unwrap()),
        );
        run(&args, extractor).await.unwrap();

        let storage = StorageManager::new(&output_dir).unwrap();
        assert_eq!(storage.load_profile("cv").unwrap().experience_years, "4");
        assert_eq!(storage.load_profile("cv_2").unwrap().experience_years, "0 (2 months)");

        let mut keys: Vec<String> = storage
            .list_history()
            .unwrap()
            .into_iter()
            .map(|meta| meta.document_key)
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["cv", "cv_2"]);
    }

    #[tokio::test]
    async fn test_run_fails_when_every_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            files: vec![dir.path().join("missing.pdf")],
            output_dir: dir.path().display().to_string(),
            vocabulary: None,
            as_of: None,
            no_save: true,
            history: false,
        };
        let err = run(&args, FactExtractor::new(Arc::new(Vocabulary::default())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Processing(_)));
    }

    #[test]
    fn test_args_require_files_unless_history() {
        assert!(Args::try_parse_from(["resume_extractor"]).is_err());
        let args = Args::try_parse_from(["resume_extractor", "--history"]).unwrap();
        assert!(args.history);
        let args = Args::try_parse_from(["resume_extractor", "a.pdf", "--as-of", "2025-06"]).unwrap();
        assert_eq!(args.files, vec![PathBuf::from("a.pdf")]);
        assert_eq!(args.as_of.as_deref(), Some("2025-06"));
    }
}
