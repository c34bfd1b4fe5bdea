use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::builder::BuilderConfig;
use super::search::AStarConfig;

pub const AI_CONFIG_PATH: &str = "assets/ai_config.ron";

/// Tuning for hierarchy construction and path queries. Read once at startup.
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub builder: BuilderConfig,
    pub search: AStarConfig,
}

impl AiConfig {
    /// Reads the RON file at `path`, falling back to defaults when it is
    /// missing or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match ron::from_str::<AiConfig>(&contents) {
                Ok(config) => {
                    info!("Loaded AI config from {}", path.display());
                    config
                }
                Err(e) => {
                    error!("Failed to parse AI config {}: {}", path.display(), e);
                    error!("Using default AiConfig");
                    AiConfig::default()
                }
            },
            Err(e) => {
                warn!("Could not read AI config {}: {}", path.display(), e);
                warn!("Using default AiConfig");
                AiConfig::default()
            }
        }
    }
}
