use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::audit::{Category, DeviceClass, ScanDepth};
use crate::settings::PersistentSettings;

/// Site Audit: simulated website security, performance, SEO and accessibility audits.
#[derive(Parser, Debug, Clone)]
#[command(name = "site-audit", version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Also write logs to this file
    #[arg(short = 'l', long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    /// JSON settings file with form defaults and pacing
    #[arg(short = 's', long = "settings", global = true)]
    pub settings: Option<PathBuf>,

    /// Multiplier applied to every simulated step delay (0 disables pacing)
    #[arg(long = "delay-scale", global = true)]
    pub delay_scale: Option<f64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the audit API over HTTP
    Serve {
        /// HTTP port
        #[arg(long = "port", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Address to bind
        #[arg(long = "bind", default_value = DEFAULT_BIND)]
        bind: String,
    },

    /// Run a single audit in the terminal and print the report
    Run {
        /// Website to audit
        url: String,

        /// Use the configurable audit flow
        #[arg(short = 'e', long = "enhanced")]
        enhanced: bool,

        /// Device class to emulate (enhanced only)
        #[arg(long = "device")]
        device: Option<DeviceClass>,

        /// Scan depth (enhanced only)
        #[arg(long = "depth")]
        depth: Option<ScanDepth>,

        /// Test location (enhanced only)
        #[arg(long = "location")]
        location: Option<String>,

        /// Disable an audit category; repeatable (enhanced only)
        #[arg(long = "skip")]
        skip: Vec<Category>,

        /// Print the result as JSON instead of a report
        #[arg(long = "json")]
        json: bool,
    },
}

/// Runtime configuration of the HTTP service.
#[derive(Debug, Clone)]
pub struct AuditServiceConfig {
    pub port: u16,
    pub bind: String,
    pub delay_scale: f64,
    /// `--delay-scale` as given on the command line; pins pacing against settings updates.
    pub delay_scale_override: Option<f64>,
    pub settings_path: Option<PathBuf>,
}

// Server constants
pub const DEFAULT_PORT: u16 = 9890;
pub const DEFAULT_BIND: &str = "0.0.0.0";

// Step pacing constants
pub const BASIC_STEP_BASE_MS: u64 = 1000;
pub const ENHANCED_STEP_BASE_MS: u64 = 1500;
pub const ENHANCED_HEAVY_STEP_BASE_MS: u64 = 2000;
pub const STEP_JITTER_MS: u64 = 1000;
pub const DEFAULT_DELAY_SCALE: f64 = 1.0;

// Log constants
pub const LOG_BUFFER_SIZE: usize = 500;
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// CLI flag wins over the settings file, which wins over the default.
pub fn resolve_delay_scale(cli: Option<f64>, settings: &PersistentSettings) -> f64 {
    cli.or(settings.delay_scale).unwrap_or(DEFAULT_DELAY_SCALE)
}

impl AuditServiceConfig {
    pub fn new(
        port: u16,
        bind: impl Into<String>,
        delay_scale: f64,
        settings_path: Option<PathBuf>,
    ) -> Self {
        AuditServiceConfig {
            port,
            bind: bind.into(),
            delay_scale,
            delay_scale_override: None,
            settings_path,
        }
    }

    pub fn with_delay_scale_override(mut self, scale: Option<f64>) -> Self {
        self.delay_scale_override = scale;
        self
    }

    /// Pacing in effect for `settings`, honouring the command-line override.
    pub fn effective_delay_scale(&self, settings: &PersistentSettings) -> f64 {
        let scale = resolve_delay_scale(self.delay_scale_override, settings);
        if scale.is_finite() {
            scale.max(0.0)
        } else {
            0.0
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for AuditServiceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, DEFAULT_BIND, DEFAULT_DELAY_SCALE, None)
    }
}
