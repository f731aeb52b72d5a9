use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::audit::{AuditConfig, DeviceClass, ScanDepth};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PersistentSettings {
    pub delay_scale: Option<f64>,
    pub device: Option<DeviceClass>,
    pub depth: Option<ScanDepth>,
    pub location: Option<String>,
}

impl PersistentSettings {
    /// Initial enhanced-form state, with any saved overrides applied.
    pub fn default_config(&self) -> AuditConfig {
        let mut config = AuditConfig::default();
        if let Some(device) = self.device {
            config.device = device;
        }
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(location) = &self.location {
            config.location = location.clone();
        }
        config
    }
}

pub fn load_settings(path: &Path) -> PersistentSettings {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring unreadable settings in {:?}: {}", path, e);
            PersistentSettings::default()
        }),
        Err(_) => PersistentSettings::default(),
    }
}

pub fn save_settings(path: &Path, settings: &PersistentSettings) {
    match serde_json::to_string_pretty(settings) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                warn!("Failed to save settings to {:?}: {}", path, e);
            }
        }
        Err(e) => {
            warn!("Failed to serialize settings: {}", e);
        }
    }
}
