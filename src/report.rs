//! Terminal rendering for `site-audit run`.

use async_trait::async_trait;
use colored::{ColoredString, Colorize};
use std::fmt::Write;

use crate::audit::{
    AuditResult, Category, Issue, ProgressObserver, ScoreStatus, Severity, StepProgress,
};
use crate::error::ValidationError;

fn paint_score(score: u8) -> ColoredString {
    let text = score.to_string();
    match score {
        90..=u8::MAX => text.green().bold(),
        70..=89 => text.yellow().bold(),
        _ => text.red().bold(),
    }
}

fn paint_severity(severity: Severity) -> ColoredString {
    let text = severity.to_string().to_uppercase();
    match severity {
        Severity::Critical | Severity::High => text.red().bold(),
        Severity::Medium => text.yellow(),
        Severity::Low => text.dimmed(),
    }
}

/// Vulnerability counts, most severe first, e.g. `1 high / 2 medium / 1 low`.
pub fn severity_summary(result: &AuditResult) -> String {
    let parts: Vec<String> = result
        .severity_breakdown()
        .iter()
        .rev()
        .map(|(severity, count)| format!("{} {}", count, severity))
        .collect();
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(" / ")
    }
}

fn write_issues(out: &mut String, issues: &[Issue]) {
    for issue in issues {
        let _ = writeln!(out, "  - {}", issue.kind.bold());
        let _ = writeln!(out, "    {}", issue.description);
        let _ = writeln!(out, "    Recommendation: {}", issue.recommendation);
    }
}

/// Human-readable report: header, score table, then findings per category.
pub fn render_report(result: &AuditResult) -> String {
    let mut out = String::new();
    let overall = result.overall_score();

    let _ = writeln!(out, "{}", "Audit Report".bold().underline());
    let _ = writeln!(out, "URL:       {}", result.url);
    let _ = writeln!(out, "Generated: {}", result.timestamp.to_rfc3339());
    let _ = writeln!(
        out,
        "Overall:   {} ({})",
        paint_score(overall),
        ScoreStatus::from_score(overall).label()
    );
    let _ = writeln!(out);

    for (category, score) in result.scores() {
        let _ = writeln!(
            out,
            "{:<15}{:>5}  {}",
            category.label(),
            paint_score(score),
            ScoreStatus::from_score(score).label()
        );
    }
    let _ = writeln!(
        out,
        "{:<15}{:>4.1}s",
        "Load time",
        result.performance.load_time
    );

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} ({})",
        Category::Security.label().bold(),
        result.security.vulnerabilities.len()
    );
    let _ = writeln!(out, "  Severity: {}", severity_summary(result));
    for vuln in &result.security.vulnerabilities {
        let _ = writeln!(
            out,
            "  - [{}] {}",
            paint_severity(vuln.severity),
            vuln.kind.bold()
        );
        let _ = writeln!(out, "    {}", vuln.description);
        let _ = writeln!(out, "    Recommendation: {}", vuln.recommendation);
    }

    for (category, issues) in [
        (Category::Performance, &result.performance.issues),
        (Category::Seo, &result.seo.issues),
        (Category::Accessibility, &result.accessibility.issues),
    ] {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} ({})", category.label().bold(), issues.len());
        write_issues(&mut out, issues);
    }

    out
}

/// Prints each step boundary to stderr.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    pub steps_seen: usize,
}

#[async_trait]
impl ProgressObserver for ConsoleProgress {
    async fn on_step(&mut self, progress: &StepProgress) {
        self.steps_seen += 1;
        eprintln!(
            "[{}/{}] {:>3}% {}",
            progress.index + 1,
            progress.total,
            progress.percent(),
            progress.label
        );
    }

    async fn on_complete(&mut self, result: &AuditResult) {
        eprintln!(
            "{} {} ({} findings)",
            "Audit completed:".green(),
            result.url,
            result.finding_count()
        );
    }

    async fn on_rejected(&mut self, error: &ValidationError) {
        eprintln!("{} {}", "Audit rejected:".red(), error);
    }
}
