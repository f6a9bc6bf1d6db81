use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "vidscribe",
    about = "vidscribe - Fetch transcripts for YouTube, TikTok and X/Twitter videos",
    version,
    long_about = "An HTTP service (and CLI) that detects the platform of a video URL, fetches its transcript from a transcript API or YouTube captions, and returns plain or timestamped text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch one transcript and print it
    Fetch {
        /// Video URL or YouTube id
        #[arg(value_name = "URL")]
        url: String,

        /// Preferred language, repeat for more (default: configured languages)
        #[arg(short, long = "language", value_name = "LANG")]
        languages: Vec<String>,

        /// Prefix each segment with [MM:SS]
        #[arg(long)]
        timestamps: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show which platform a URL belongs to
    Classify {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Show the effective configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported platforms
    Platforms,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// The same JSON the HTTP API returns
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
