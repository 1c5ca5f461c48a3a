use clap::{Parser, Subcommand, ValueEnum};

mod analyze;
mod serve;

use analyze::{run_analyze_image, run_analyze_text, run_check};
use serve::{ServeArgs, run_serve};

#[derive(Parser, Debug)]
#[command(name = "emotionfad", version)]
#[command(about = "EmotionFAD - fraud activity detection from facial emotion and chat sentiment")]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP and WebSocket server
    Serve(ServeArgs),
    /// Scan a chat message for fraud signals
    AnalyzeText {
        /// Text to analyze
        text: String,
        /// Fraud risk above which the text is suspicious
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Analyze the faces in an image file
    AnalyzeImage {
        /// Path to a JPEG, PNG, GIF, BMP or WebP file
        path: std::path::PathBuf,
        /// Emotion model server (overrides EMOTIONFAD_DETECTOR_URL)
        #[arg(long)]
        detector_url: Option<String>,
        /// Report every face instead of scoring the first one
        #[arg(long)]
        all_faces: bool,
        /// Chat text to combine with the facial analysis into a report
        #[arg(long)]
        text: Option<String>,
    },
    /// Validate configuration from the environment
    Check,
}

/// Failures surfaced by CLI commands
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] emotionfad_http::ConfigError),

    #[error(transparent)]
    Analysis(#[from] emotionfad_core::AnalysisError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter, // fallback to default if parsing fails
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let result = match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::AnalyzeText { text, threshold } => run_analyze_text(&text, threshold),
        Commands::AnalyzeImage {
            path,
            detector_url,
            all_faces,
            text,
        } => run_analyze_image(&path, detector_url, all_faces, text.as_deref()).await,
        Commands::Check => run_check(),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}
