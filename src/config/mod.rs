//! Configuration module for Hent.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    CleanupPolicy, CleanupSettings, DownloadSettings, GeneralSettings, ServerSettings, Settings,
};
