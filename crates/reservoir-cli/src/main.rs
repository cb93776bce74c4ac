use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reservoir_config::Config;
use reservoir_engine::{
    Block, DocxPackage, ExtractRequest, Extractor, ExtractorSettings, QuestionRecord,
    QuestionType, TargetSet, answer_key, strip_answers,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "reservoir")]
#[command(about = "Extract structured questions from exam documents")]
struct Cli {
    /// Config file to use instead of ~/.config/reservoir/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory extracted images are written into
    #[arg(long, global = true)]
    media_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List question numbers and types without writing images
    Analyze {
        file: PathBuf,
    },
    /// Extract question records as JSON
    Extract {
        file: PathBuf,
        /// Only return these questions, e.g. "1-5,8"
        #[arg(long)]
        ids: Option<String>,
        /// Do not copy images out of the document
        #[arg(long)]
        no_images: bool,
        /// Subdirectory of the media root for this run's images
        #[arg(long)]
        staging: Option<String>,
    },
    /// Print the answer key, five letters per line
    Answers {
        file: PathBuf,
    },
    /// Print the paper with answers and analyses removed
    Strip {
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct Summary {
    num: u32,
    #[serde(rename = "type")]
    subject: QuestionType,
}

#[derive(Serialize)]
struct Listing<T> {
    count: usize,
    questions: Vec<T>,
}

impl<T> Listing<T> {
    fn new(questions: Vec<T>) -> Self {
        Self {
            count: questions.len(),
            questions,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(media_root) = cli.media_root {
        config.media_root = media_root;
    }
    log::debug!("Media root: {}", config.media_root.display());

    match cli.command {
        Command::Analyze { file } => {
            let records = extractor(&config).extract_file(&file, &ExtractRequest::scan_only())?;
            let summaries = records
                .into_iter()
                .map(|r| Summary {
                    num: r.original_num,
                    subject: r.subject,
                })
                .collect();
            print_json(&Listing::<Summary>::new(summaries))?;
        }
        Command::Extract {
            file,
            ids,
            no_images,
            staging,
        } => {
            let request = ExtractRequest {
                targets: ids.as_deref().map(TargetSet::parse).transpose()?,
                extract_images: !no_images,
                staging,
            };
            let records = extractor(&config).extract_file(&file, &request)?;
            print_json(&Listing::<QuestionRecord>::new(records))?;
        }
        Command::Answers { file } => {
            let package = open(&file)?;
            let key = answer_key(package.blocks()?)?;
            log::info!("Found {} answers", key.len());
            for line in format_answer_key(&key) {
                println!("{line}");
            }
        }
        Command::Strip { file } => {
            let package = open(&file)?;
            let kept = strip_answers(package.blocks()?, config.cleanup_continuity)?;
            for block in &kept {
                println!("{}", block_line(block));
            }
        }
    }

    Ok(())
}

fn extractor(config: &Config) -> Extractor {
    Extractor::new(ExtractorSettings {
        media_root: config.media_root.clone(),
        public_prefix: config.public_prefix.clone(),
        continuity: config.continuity,
    })
}

fn open(path: &Path) -> Result<DocxPackage> {
    DocxPackage::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_answer_key(key: &[char]) -> Vec<String> {
    key.chunks(5)
        .map(|chunk| {
            chunk
                .iter()
                .map(char::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// One output line per block; tables print their flattened cell text.
fn block_line(block: &Block) -> String {
    block.text().trim_end().replace('\n', " ")
}
