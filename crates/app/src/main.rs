use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use pdf_qa_core::{
    AnswerConfig, CharacterNgramEmbedder, Embedder, HttpEmbedder, HttpEmbedderConfig,
    LopdfSource, Session, DEFAULT_CHUNK_WORDS, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_FALLBACK_MESSAGE, DEFAULT_MODEL_DIMENSIONS, DEFAULT_THRESHOLD,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-qa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Embedding backend
    #[arg(long, env = "PDF_QA_EMBEDDER", value_enum, default_value_t = EmbedderKind::Http)]
    embedder: EmbedderKind,

    /// Base URL of an OpenAI-compatible embeddings API
    #[arg(long, env = "PDF_QA_EMBEDDING_URL", default_value = "http://localhost:8080/v1")]
    embedding_url: String,

    /// Sentence-embedding model name
    #[arg(long, env = "PDF_QA_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// Bearer token for the embeddings API
    #[arg(long, env = "PDF_QA_EMBEDDING_API_KEY", hide_env_values = true)]
    embedding_api_key: Option<String>,

    /// Vector length produced by the embedding model
    #[arg(long, env = "PDF_QA_EMBEDDING_DIMENSIONS", default_value_t = DEFAULT_MODEL_DIMENSIONS)]
    embedding_dimensions: usize,

    /// Embedding request timeout in seconds
    #[arg(long, default_value = "30")]
    embedding_timeout_secs: u64,

    /// Word budget per chunk
    #[arg(long, env = "PDF_QA_CHUNK_WORDS", default_value_t = DEFAULT_CHUNK_WORDS)]
    chunk_words: usize,

    /// Chunk similarity at or below this value returns the fallback reply
    #[arg(long, env = "PDF_QA_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Reply used for low-confidence questions
    #[arg(long, env = "PDF_QA_FALLBACK", default_value = DEFAULT_FALLBACK_MESSAGE)]
    fallback: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EmbedderKind {
    /// Sentence-embedding model behind an HTTP endpoint.
    Http,
    /// Offline character-trigram embedder.
    Ngram,
}

#[derive(Subcommand)]
enum Command {
    /// Load a PDF and answer one or more questions about it.
    Ask {
        /// PDF to load.
        #[arg(long)]
        pdf: PathBuf,
        /// Question to answer; repeat for several.
        #[arg(long = "query", required = true)]
        queries: Vec<String>,
    },
    /// Interactive session: `:load PATH`, `:clear`, `:quit`, anything else is a question.
    Chat {
        /// PDF to load before the first prompt.
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
}

impl Cli {
    fn answer_config(&self) -> AnswerConfig {
        AnswerConfig {
            target_words: self.chunk_words,
            threshold: self.threshold,
            fallback_message: self.fallback.clone(),
        }
    }

    fn build_embedder(&self) -> anyhow::Result<Box<dyn Embedder>> {
        let embedder: Box<dyn Embedder> = match self.embedder {
            EmbedderKind::Http => {
                let embedder = HttpEmbedder::new(HttpEmbedderConfig {
                    base_url: self.embedding_url.clone(),
                    model: self.embedding_model.clone(),
                    api_key: self.embedding_api_key.clone(),
                    dimensions: self.embedding_dimensions,
                    timeout: Duration::from_secs(self.embedding_timeout_secs),
                })
                .context("failed to configure embedding client")?;
                info!(
                    endpoint = %embedder.endpoint(),
                    model = embedder.model(),
                    "using http embedder"
                );
                Box::new(embedder)
            }
            EmbedderKind::Ngram => {
                info!("using offline trigram embedder");
                Box::new(CharacterNgramEmbedder::default())
            }
        };
        Ok(embedder)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "pdf-qa boot"
    );

    tokio::task::spawn_blocking(move || run(cli))
        .await
        .context("session worker panicked")?
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let embedder = cli.build_embedder()?;
    let session = Session::with_embedder(embedder, cli.answer_config())
        .context("invalid answer configuration")?;

    match cli.command {
        Command::Ask { pdf, queries } => {
            println!("{}", upload(&session, &pdf));
            if !session.has_document() {
                anyhow::bail!("no document loaded from {}", pdf.display());
            }

            for query in queries {
                println!("question: {query}");
                println!("answer: {}", session.respond_to_query(&query));
            }
        }
        Command::Chat { pdf } => {
            if let Some(pdf) = pdf {
                println!("{}", upload(&session, &pdf));
            }
            chat(&session)?;
        }
    }

    Ok(())
}

fn upload(session: &Session<Box<dyn Embedder>>, path: &Path) -> String {
    let reply = session.respond_to_pdf(&LopdfSource, path);
    match session.current_document() {
        Some(document) => info!(
            path = %path.display(),
            document_id = %document.report().document_id,
            chunks = document.report().chunk_count,
            "pdf ready"
        ),
        _ => warn!(path = %path.display(), reply = %reply, "no document loaded"),
    }
    reply
}

fn chat(session: &Session<Box<dyn Embedder>>) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(char::is_whitespace) {
            Some((":load", path)) => println!("{}", upload(session, Path::new(path.trim()))),
            None if line == ":load" => println!("usage: :load PATH"),
            None if line == ":clear" => {
                session.clear();
                println!("document cleared");
            }
            None if line == ":quit" || line == ":exit" => break,
            _ => println!("{}", session.respond_to_query(line)),
        }
    }

    Ok(())
}
