use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use repaso_client::{DriveClient, HostedCaptioner, QuizGenerator};
use repaso_core::{ImageCaptioner, Language, NoCaptioner};
use repaso_extract::PageSelection;

mod output;

use output::ColorMode;

/// Repaso - Generate Kahoot quizzes from OneDrive study notes and textbooks
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a quiz from a notes DOCX and/or a textbook PDF
    Generate {
        /// Path to the notes DOCX
        #[arg(long)]
        notes: Option<PathBuf>,

        /// Path to the textbook PDF
        #[arg(long)]
        book: Option<PathBuf>,

        /// Book pages to include, e.g. "1,2,5-10" (default: all pages)
        #[arg(long)]
        pages: Option<String>,

        /// Restrict the notes to this unit heading (repeatable)
        #[arg(long = "unit")]
        units: Vec<String>,

        /// Number of questions to generate (1-50)
        #[arg(short = 'n', long)]
        count: Option<u32>,

        /// Per-question time limit in seconds
        #[arg(short = 't', long)]
        time_limit: Option<u32>,

        /// Question language (es or en)
        #[arg(long)]
        language: Option<String>,

        /// Quiz generator endpoint URL
        #[arg(long)]
        generator_url: Option<String>,

        /// Image captioner endpoint URL
        #[arg(long)]
        caption_url: Option<String>,

        /// Skip image captioning entirely
        #[arg(long)]
        no_caption: bool,

        /// Directory to archive the raw generator reply into
        #[arg(long)]
        save_raw: Option<PathBuf>,

        /// Path to write the Kahoot CSV
        #[arg(short, long, default_value = "kahoot.csv")]
        output: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// List the unit headings found in a notes DOCX
    Units {
        /// Path to the notes DOCX
        notes: PathBuf,
    },

    /// Validate an archived generator reply and export it as Kahoot CSV
    Export {
        /// Path to the raw generator reply (JSON)
        responses: PathBuf,

        /// Per-question time limit in seconds
        #[arg(short = 't', long)]
        time_limit: Option<u32>,

        /// Path to write the Kahoot CSV
        #[arg(short, long, default_value = "kahoot.csv")]
        output: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Download documents from a OneDrive folder
    Fetch {
        /// Drive folder, e.g. /COLEGIO/ASIGNATURAS (default: configured notes folder)
        folder: Option<String>,

        /// Directory to download into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Microsoft Graph access token (or GRAPH_TOKEN env var)
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            notes,
            book,
            pages,
            units,
            count,
            time_limit,
            language,
            generator_url,
            caption_url,
            no_caption,
            save_raw,
            output,
            no_color,
        } => {
            generate(
                notes,
                book,
                pages,
                units,
                count,
                time_limit,
                language,
                generator_url,
                caption_url,
                no_caption,
                save_raw,
                output,
                no_color,
            )
            .await
        }
        Command::Units { notes } => list_units(notes).await,
        Command::Export {
            responses,
            time_limit,
            output,
            no_color,
        } => export(responses, time_limit, output, no_color),
        Command::Fetch {
            folder,
            output_dir,
            token,
        } => fetch(folder, output_dir, token).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn generate(
    notes: Option<PathBuf>,
    book: Option<PathBuf>,
    pages: Option<String>,
    units: Vec<String>,
    count: Option<u32>,
    time_limit: Option<u32>,
    language: Option<String>,
    generator_url: Option<String>,
    caption_url: Option<String>,
    no_caption: bool,
    save_raw: Option<PathBuf>,
    output: PathBuf,
    no_color: bool,
) -> anyhow::Result<()> {
    if notes.is_none() && book.is_none() {
        anyhow::bail!("Nothing to extract: pass --notes and/or --book");
    }

    // Resolve configuration: CLI flags > env vars > config file
    let config = repaso_core::load_config();
    let generator_url = generator_url
        .or_else(|| std::env::var("REPASO_GENERATOR_URL").ok())
        .or_else(|| {
            config
                .endpoints
                .as_ref()
                .and_then(|e| e.generator_url.clone())
        });
    let Some(generator_url) = generator_url else {
        anyhow::bail!(
            "No generator endpoint configured. Pass --generator-url, set REPASO_GENERATOR_URL, \
             or add generator_url under [endpoints] in the config file."
        );
    };
    let caption_url = caption_url
        .or_else(|| std::env::var("REPASO_CAPTION_URL").ok())
        .or_else(|| config.endpoints.as_ref().and_then(|e| e.caption_url.clone()));

    let defaults = config.defaults.clone().unwrap_or_default();
    let count = count.or(defaults.question_count).unwrap_or(10);
    if !(1..=repaso_core::MAX_QUESTIONS).contains(&count) {
        anyhow::bail!(
            "Question count must be between 1 and {}",
            repaso_core::MAX_QUESTIONS
        );
    }
    let time_limit = time_limit.or(defaults.time_limit_secs).unwrap_or(20);
    if !repaso_core::TIME_OPTIONS.contains(&time_limit) {
        anyhow::bail!(
            "Time limit {}s is not supported (allowed: {:?})",
            time_limit,
            repaso_core::TIME_OPTIONS
        );
    }
    let language: Language = match language.or(defaults.language) {
        Some(s) => s.parse().map_err(anyhow::Error::msg)?,
        None => Language::default(),
    };

    let selection = PageSelection::parse(pages.as_deref())?;

    let captioning = !no_caption && caption_url.is_some();
    let captioner: Arc<dyn ImageCaptioner> = if let Some(url) = caption_url.filter(|_| !no_caption)
    {
        let token = std::env::var("REPASO_CAPTION_TOKEN").ok();
        Arc::new(HostedCaptioner::new(url, token)?)
    } else {
        Arc::new(NoCaptioner)
    };

    let color = ColorMode(!no_color);
    let mut writer = std::io::stdout();
    let mut corpus_parts: Vec<String> = Vec::new();

    if let Some(ref notes_path) = notes {
        let name = display_name(notes_path);
        let bytes = std::fs::read(notes_path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", notes_path.display(), e))?;
        let captioner = Arc::clone(&captioner);
        // Extraction is synchronous (blocking captioner calls included)
        let extraction =
            tokio::task::spawn_blocking(move || repaso_extract::docx::extract(&bytes, captioner.as_ref()))
                .await??;
        output::print_extraction_summary(
            &mut writer,
            &name,
            extraction.text.segments.len(),
            &extraction.warnings,
            color,
        )?;
        let mut text = extraction.text.corpus();
        if !units.is_empty() {
            text = repaso_extract::scope_to_units(&text, &units);
        }
        corpus_parts.push(text);
    }

    if let Some(ref book_path) = book {
        let name = display_name(book_path);
        let captioner = Arc::clone(&captioner);
        let selection = selection.clone();
        let path = book_path.clone();
        let extraction = tokio::task::spawn_blocking(move || {
            // The mupdf text walk never yields embedded images; captioned
            // runs need the lopdf backend, which does.
            let backend: Box<dyn repaso_core::PdfBackend> = if captioning {
                Box::new(repaso_pdf_lopdf::LopdfBackend::new())
            } else {
                Box::new(repaso_pdf_mupdf::MupdfBackend::new())
            };
            repaso_extract::pdf::extract(&path, backend.as_ref(), &selection, captioner.as_ref())
        })
        .await??;
        output::print_extraction_summary(
            &mut writer,
            &name,
            extraction.text.segments.len(),
            &extraction.warnings,
            color,
        )?;
        corpus_parts.push(extraction.text.corpus());
    }

    let corpus = corpus_parts.join("\n");
    if corpus.trim().is_empty() {
        anyhow::bail!("Extraction produced no text; nothing to generate a quiz from");
    }
    let corpus = repaso_extract::truncate_corpus(&corpus);

    let generator = QuizGenerator::new(generator_url)?;
    let raw = generator.generate(corpus, count, time_limit, language).await?;

    if let Some(ref dir) = save_raw {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("quiz-{}.json", output::utc_timestamp_slug()));
        std::fs::write(&path, &raw)?;
        writeln!(writer, "Raw reply archived to {}", path.display())?;
    }

    let report = repaso_core::validate_response(&raw)?;
    output::print_validation_summary(&mut writer, &report, color)?;
    if report.accepted.is_empty() {
        anyhow::bail!("No questions survived validation; nothing to export");
    }

    let rows = repaso_core::to_export_rows(&report.accepted, time_limit)?;
    std::fs::write(&output, repaso_core::write_csv(&rows))?;
    writeln!(writer, "Wrote {} questions to {}", rows.len(), output.display())?;
    Ok(())
}

async fn list_units(notes: PathBuf) -> anyhow::Result<()> {
    let bytes = std::fs::read(&notes)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", notes.display(), e))?;
    let extraction =
        tokio::task::spawn_blocking(move || repaso_extract::docx::extract(&bytes, &NoCaptioner))
            .await??;
    let units = repaso_extract::extract_units(&extraction.text.corpus());
    output::print_units(&mut std::io::stdout(), &units)?;
    Ok(())
}

fn export(
    responses: PathBuf,
    time_limit: Option<u32>,
    output: PathBuf,
    no_color: bool,
) -> anyhow::Result<()> {
    let config = repaso_core::load_config();
    let time_limit = time_limit
        .or_else(|| config.defaults.as_ref().and_then(|d| d.time_limit_secs))
        .unwrap_or(20);

    let raw = std::fs::read_to_string(&responses)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", responses.display(), e))?;

    let color = ColorMode(!no_color);
    let mut writer = std::io::stdout();

    let report = repaso_core::validate_response(&raw)?;
    output::print_validation_summary(&mut writer, &report, color)?;
    if report.accepted.is_empty() {
        anyhow::bail!("No questions survived validation; nothing to export");
    }

    let rows = repaso_core::to_export_rows(&report.accepted, time_limit)?;
    std::fs::write(&output, repaso_core::write_csv(&rows))?;
    writeln!(writer, "Wrote {} questions to {}", rows.len(), output.display())?;
    Ok(())
}

async fn fetch(
    folder: Option<String>,
    output_dir: PathBuf,
    token: Option<String>,
) -> anyhow::Result<()> {
    let config = repaso_core::load_config();
    let folder = folder
        .or_else(|| config.drive.as_ref().and_then(|d| d.notes_path.clone()))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No drive folder given. Pass one or set notes_path under [drive] in the config file."
            )
        })?;
    let token = token
        .or_else(|| std::env::var("GRAPH_TOKEN").ok())
        .ok_or_else(|| anyhow::anyhow!("No Graph access token. Pass --token or set GRAPH_TOKEN."))?;

    let client = DriveClient::new(token)?;
    let items = client.list_children(&folder).await?;
    std::fs::create_dir_all(&output_dir)?;

    let mut downloaded = 0usize;
    for item in items {
        let lower = item.name.to_lowercase();
        if !(lower.ends_with(".docx") || lower.ends_with(".pdf")) {
            tracing::debug!(name = %item.name, "skipping non-document item");
            continue;
        }
        let bytes = client.download(&item.id).await?;
        let dest = output_dir.join(&item.name);
        std::fs::write(&dest, &bytes)?;
        println!("Downloaded {} ({} bytes)", dest.display(), bytes.len());
        downloaded += 1;
    }
    println!("Fetched {} documents from {}", downloaded, folder);
    Ok(())
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
