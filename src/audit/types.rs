use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// --- Request types ---

/// Which form drove the audit: the plain URL form or the configurable one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditVariant {
    #[default]
    Basic,
    Enhanced,
}

impl fmt::Display for AuditVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditVariant::Basic => write!(f, "basic"),
            AuditVariant::Enhanced => write!(f, "enhanced"),
        }
    }
}

impl FromStr for AuditVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" | "simple" => Ok(AuditVariant::Basic),
            "enhanced" | "advanced" => Ok(AuditVariant::Enhanced),
            other => Err(format!("unknown audit variant: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Security,
    Performance,
    Seo,
    Accessibility,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Security,
        Category::Performance,
        Category::Seo,
        Category::Accessibility,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Security => "Security",
            Category::Performance => "Performance",
            Category::Seo => "SEO",
            Category::Accessibility => "Accessibility",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "security" => Ok(Category::Security),
            "performance" => Ok(Category::Performance),
            "seo" => Ok(Category::Seo),
            "accessibility" | "a11y" => Ok(Category::Accessibility),
            other => Err(format!("unknown audit category: {}", other)),
        }
    }
}

/// Per-category enable toggles. The generator does not consult these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditTypes {
    pub security: bool,
    pub performance: bool,
    pub seo: bool,
    pub accessibility: bool,
}

impl Default for AuditTypes {
    fn default() -> Self {
        Self {
            security: true,
            performance: true,
            seo: true,
            accessibility: true,
        }
    }
}

impl AuditTypes {
    pub fn none() -> Self {
        Self {
            security: false,
            performance: false,
            seo: false,
            accessibility: false,
        }
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Security => self.security,
            Category::Performance => self.performance,
            Category::Seo => self.seo,
            Category::Accessibility => self.accessibility,
        }
    }

    pub fn set(&mut self, category: Category, enabled: bool) {
        match category {
            Category::Security => self.security = enabled,
            Category::Performance => self.performance = enabled,
            Category::Seo => self.seo = enabled,
            Category::Accessibility => self.accessibility = enabled,
        }
    }

    pub fn enabled_count(&self) -> usize {
        Category::ALL
            .iter()
            .filter(|c| self.is_enabled(**c))
            .count()
    }

    pub fn any_enabled(&self) -> bool {
        self.enabled_count() > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Desktop,
    Mobile,
    Tablet,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Desktop => write!(f, "desktop"),
            DeviceClass::Mobile => write!(f, "mobile"),
            DeviceClass::Tablet => write!(f, "tablet"),
        }
    }
}

impl FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "desktop" => Ok(DeviceClass::Desktop),
            "mobile" => Ok(DeviceClass::Mobile),
            "tablet" => Ok(DeviceClass::Tablet),
            other => Err(format!("unknown device class: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanDepth {
    Shallow,
    #[default]
    Medium,
    Deep,
}

impl ScanDepth {
    /// Rough page count a scan of this depth covers.
    pub fn page_hint(self) -> &'static str {
        match self {
            ScanDepth::Shallow => "1-2 pages",
            ScanDepth::Medium => "5-10 pages",
            ScanDepth::Deep => "20+ pages",
        }
    }
}

impl fmt::Display for ScanDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanDepth::Shallow => write!(f, "shallow"),
            ScanDepth::Medium => write!(f, "medium"),
            ScanDepth::Deep => write!(f, "deep"),
        }
    }
}

impl FromStr for ScanDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shallow" => Ok(ScanDepth::Shallow),
            "medium" => Ok(ScanDepth::Medium),
            "deep" => Ok(ScanDepth::Deep),
            other => Err(format!("unknown scan depth: {}", other)),
        }
    }
}

pub const DEFAULT_LOCATION: &str = "us-east";

/// Options collected by the enhanced form. Frozen once a run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditConfig {
    pub url: String,
    pub audit_types: AuditTypes,
    pub device: DeviceClass,
    pub location: String,
    pub depth: ScanDepth,
    /// Opaque header block, never parsed.
    pub custom_headers: String,
    pub ignore_certificate_errors: bool,
    pub follow_redirects: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            audit_types: AuditTypes::default(),
            device: DeviceClass::default(),
            location: DEFAULT_LOCATION.to_string(),
            depth: ScanDepth::default(),
            custom_headers: String::new(),
            ignore_certificate_errors: false,
            follow_redirects: true,
        }
    }
}

impl AuditConfig {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Input to a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AuditRequest {
    Basic {
        #[serde(default)]
        url: String,
    },
    Enhanced(AuditConfig),
}

impl AuditRequest {
    pub fn basic(url: impl Into<String>) -> Self {
        AuditRequest::Basic { url: url.into() }
    }

    pub fn enhanced(config: AuditConfig) -> Self {
        AuditRequest::Enhanced(config)
    }

    pub fn url(&self) -> &str {
        match self {
            AuditRequest::Basic { url } => url,
            AuditRequest::Enhanced(config) => &config.url,
        }
    }

    pub fn config(&self) -> Option<&AuditConfig> {
        match self {
            AuditRequest::Basic { .. } => None,
            AuditRequest::Enhanced(config) => Some(config),
        }
    }

    pub fn variant(&self) -> AuditVariant {
        match self {
            AuditRequest::Basic { .. } => AuditVariant::Basic,
            AuditRequest::Enhanced(_) => AuditVariant::Enhanced,
        }
    }
}

// --- Result types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub score: u8,
    pub vulnerabilities: Vec<Vulnerability>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub score: u8,
    /// Simulated page load, in seconds.
    pub load_time: f64,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub score: u8,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub security: SecurityReport,
    pub performance: PerformanceReport,
    pub seo: CategoryReport,
    pub accessibility: CategoryReport,
}

impl AuditResult {
    pub fn score(&self, category: Category) -> u8 {
        match category {
            Category::Security => self.security.score,
            Category::Performance => self.performance.score,
            Category::Seo => self.seo.score,
            Category::Accessibility => self.accessibility.score,
        }
    }

    pub fn scores(&self) -> [(Category, u8); 4] {
        Category::ALL.map(|c| (c, self.score(c)))
    }

    /// Rounded mean of the four category scores.
    pub fn overall_score(&self) -> u8 {
        let sum: u32 = self.scores().iter().map(|(_, s)| u32::from(*s)).sum();
        (f64::from(sum) / 4.0).round() as u8
    }

    pub fn severity_breakdown(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for vuln in &self.security.vulnerabilities {
            *counts.entry(vuln.severity).or_insert(0) += 1;
        }
        counts
    }

    /// Vulnerabilities plus issues across every category.
    pub fn finding_count(&self) -> usize {
        self.security.vulnerabilities.len()
            + self.performance.issues.len()
            + self.seo.issues.len()
            + self.accessibility.issues.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStatus {
    Excellent,
    Good,
    NeedsImprovement,
    Poor,
}

impl ScoreStatus {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => ScoreStatus::Excellent,
            75..=89 => ScoreStatus::Good,
            60..=74 => ScoreStatus::NeedsImprovement,
            _ => ScoreStatus::Poor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreStatus::Excellent => "excellent",
            ScoreStatus::Good => "good",
            ScoreStatus::NeedsImprovement => "needs improvement",
            ScoreStatus::Poor => "poor",
        }
    }
}
