//! Configuration module for Lese.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    AssistantSettings, CatalogSettings, CoverSettings, GeneralSettings, Settings,
};
