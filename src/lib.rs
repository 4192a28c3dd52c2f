//! Hent - YouTube to MP3
//!
//! A single-purpose web utility: paste a YouTube link into a browser form and
//! get the audio back as an MP3 (or one zip archive when a link yields
//! several files).
//!
//! The name "Hent" comes from the Norwegian word for "fetch."
//!
//! # Overview
//!
//! Hent allows you to:
//! - Turn a YouTube link into an MP3 through a local web page
//! - Download whole playlists, bundled into a single zip
//! - Watch download progress as it happens
//!
//! The heavy lifting is delegated to external tools: yt-dlp fetches the media
//! and its ffmpeg postprocessor transcodes it. Hent validates input, drives
//! the tools, packages the results, and serves them back.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `validate` - Link validation
//! - `downloader` - yt-dlp invocation and progress parsing
//! - `packager` - Output collection and zip bundling
//! - `workspace` - Per-request directories and cleanup
//! - `progress` - Progress reporting abstraction
//! - `jobs` - Job tracking for the web layer
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use hent::config::Settings;
//! use hent::orchestrator::Orchestrator;
//! use hent::progress::NullSink;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings);
//!
//!     let delivery = orchestrator
//!         .download_music("https://youtu.be/dQw4w9WgXcQ", &NullSink)
//!         .await;
//!     println!("{}", delivery.status);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod jobs;
pub mod orchestrator;
pub mod packager;
pub mod progress;
pub mod validate;
pub mod workspace;

pub use error::{HentError, Result};
