//! vidscribe - transcripts for YouTube, TikTok and X/Twitter videos
//!
//! A URL is classified into a [`platform::VideoReference`], handed to the
//! [`transcript::FallbackOrchestrator`] which walks an ordered list of
//! backend and language strategies, and the first usable transcript is
//! normalized into a [`transcript::TranscriptResult`]. The [`server`] module
//! exposes this over HTTP; the binary also offers it on the command line.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod platform;
pub mod server;
pub mod sources;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use error::{ErrorKind, TranscriptError};
pub use platform::{classify, Platform, VideoReference};
pub use transcript::{FallbackOrchestrator, Resolution, TranscriptResult};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;
