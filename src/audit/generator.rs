use chrono::Utc;
use rand::Rng;
use std::ops::Range;

use super::types::{
    AuditRequest, AuditResult, AuditVariant, CategoryReport, Issue, PerformanceReport,
    SecurityReport, Severity, Vulnerability,
};

/// Builds the result payload at the end of a run. Implementations must not fail.
pub trait ResultGenerator: Send + Sync {
    fn generate(&self, request: &AuditRequest) -> AuditResult;
}

/// Placeholder findings with randomized scores. Content never depends on the
/// target or on the enhanced toggles; all four categories are always produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockResultGenerator;

impl ResultGenerator for MockResultGenerator {
    fn generate(&self, request: &AuditRequest) -> AuditResult {
        self.generate_with_rng(request, &mut rand::thread_rng())
    }
}

impl MockResultGenerator {
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        request: &AuditRequest,
        rng: &mut R,
    ) -> AuditResult {
        let url = request.url().to_string();
        match request.variant() {
            AuditVariant::Basic => basic_result(url, rng),
            AuditVariant::Enhanced => enhanced_result(url, rng),
        }
    }
}

// --- Score ranges (upper bounds exclusive) ---

pub const BASIC_SECURITY_SCORE: Range<u8> = 60..100;
pub const BASIC_PERFORMANCE_SCORE: Range<u8> = 70..100;
pub const BASIC_SEO_SCORE: Range<u8> = 75..100;
pub const BASIC_ACCESSIBILITY_SCORE: Range<u8> = 80..100;
pub const BASIC_LOAD_TIME_SECS: Range<f64> = 1.0..4.0;

pub const ENHANCED_BASE_SCORE: Range<u8> = 70..90;
pub const ENHANCED_SECURITY_BONUS: Range<u8> = 0..10;
pub const ENHANCED_PERFORMANCE_BONUS: Range<u8> = 0..15;
pub const ENHANCED_SEO_BONUS: Range<u8> = 0..12;
pub const ENHANCED_ACCESSIBILITY_BONUS: Range<u8> = 0..8;
pub const ENHANCED_LOAD_TIME_SECS: Range<f64> = 1.2..3.2;

pub const MAX_SCORE: u8 = 100;

fn basic_result<R: Rng + ?Sized>(url: String, rng: &mut R) -> AuditResult {
    AuditResult {
        url,
        timestamp: Utc::now(),
        security: SecurityReport {
            score: rng.gen_range(BASIC_SECURITY_SCORE),
            vulnerabilities: instantiate_vulnerabilities(BASIC_VULNERABILITIES),
        },
        performance: PerformanceReport {
            score: rng.gen_range(BASIC_PERFORMANCE_SCORE),
            load_time: rng.gen_range(BASIC_LOAD_TIME_SECS),
            issues: instantiate_issues(BASIC_PERFORMANCE_ISSUES),
        },
        seo: CategoryReport {
            score: rng.gen_range(BASIC_SEO_SCORE),
            issues: instantiate_issues(BASIC_SEO_ISSUES),
        },
        accessibility: CategoryReport {
            score: rng.gen_range(BASIC_ACCESSIBILITY_SCORE),
            issues: instantiate_issues(BASIC_ACCESSIBILITY_ISSUES),
        },
    }
}

fn enhanced_result<R: Rng + ?Sized>(url: String, rng: &mut R) -> AuditResult {
    let base = rng.gen_range(ENHANCED_BASE_SCORE);
    let mut offset_score = |bonus: Range<u8>| -> u8 {
        base.saturating_add(rng.gen_range(bonus)).min(MAX_SCORE)
    };

    let security = offset_score(ENHANCED_SECURITY_BONUS);
    let performance = offset_score(ENHANCED_PERFORMANCE_BONUS);
    let seo = offset_score(ENHANCED_SEO_BONUS);
    let accessibility = offset_score(ENHANCED_ACCESSIBILITY_BONUS);

    AuditResult {
        url,
        timestamp: Utc::now(),
        security: SecurityReport {
            score: security,
            vulnerabilities: instantiate_vulnerabilities(ENHANCED_VULNERABILITIES),
        },
        performance: PerformanceReport {
            score: performance,
            load_time: rng.gen_range(ENHANCED_LOAD_TIME_SECS),
            issues: instantiate_issues(ENHANCED_PERFORMANCE_ISSUES),
        },
        seo: CategoryReport {
            score: seo,
            issues: instantiate_issues(ENHANCED_SEO_ISSUES),
        },
        accessibility: CategoryReport {
            score: accessibility,
            issues: instantiate_issues(ENHANCED_ACCESSIBILITY_ISSUES),
        },
    }
}

// --- Finding templates ---

struct VulnerabilityTemplate {
    kind: &'static str,
    severity: Severity,
    description: &'static str,
    recommendation: &'static str,
}

struct IssueTemplate {
    kind: &'static str,
    description: &'static str,
    recommendation: &'static str,
}

fn instantiate_vulnerabilities(templates: &[VulnerabilityTemplate]) -> Vec<Vulnerability> {
    templates
        .iter()
        .map(|t| Vulnerability {
            kind: t.kind.to_string(),
            severity: t.severity,
            description: t.description.to_string(),
            recommendation: t.recommendation.to_string(),
        })
        .collect()
}

fn instantiate_issues(templates: &[IssueTemplate]) -> Vec<Issue> {
    templates
        .iter()
        .map(|t| Issue {
            kind: t.kind.to_string(),
            description: t.description.to_string(),
            recommendation: t.recommendation.to_string(),
        })
        .collect()
}

const BASIC_VULNERABILITIES: &[VulnerabilityTemplate] = &[
    VulnerabilityTemplate {
        kind: "Missing HTTPS",
        severity: Severity::Medium,
        description: "Website is not using HTTPS encryption",
        recommendation: "Implement SSL certificate and redirect HTTP traffic to HTTPS",
    },
    VulnerabilityTemplate {
        kind: "Outdated Dependencies",
        severity: Severity::High,
        description: "JavaScript libraries contain known vulnerabilities",
        recommendation: "Update all dependencies to latest secure versions",
    },
];

const BASIC_PERFORMANCE_ISSUES: &[IssueTemplate] = &[
    IssueTemplate {
        kind: "Large Images",
        description: "Unoptimized images are slowing down page load",
        recommendation: "Compress images and use modern formats like WebP",
    },
    IssueTemplate {
        kind: "Render Blocking Resources",
        description: "CSS and JavaScript are blocking page rendering",
        recommendation: "Defer non-critical resources and inline critical CSS",
    },
];

const BASIC_SEO_ISSUES: &[IssueTemplate] = &[
    IssueTemplate {
        kind: "Missing Meta Description",
        description: "Page lacks meta description tag",
        recommendation: "Add descriptive meta description under 160 characters",
    },
    IssueTemplate {
        kind: "No Structured Data",
        description: "Missing schema markup for search engines",
        recommendation: "Implement JSON-LD structured data for better SEO",
    },
];

const BASIC_ACCESSIBILITY_ISSUES: &[IssueTemplate] = &[
    IssueTemplate {
        kind: "Missing Alt Text",
        description: "Images missing descriptive alt attributes",
        recommendation: "Add meaningful alt text to all images",
    },
    IssueTemplate {
        kind: "Low Color Contrast",
        description: "Text contrast ratio below WCAG guidelines",
        recommendation: "Increase contrast between text and background colors",
    },
];

const ENHANCED_VULNERABILITIES: &[VulnerabilityTemplate] = &[
    VulnerabilityTemplate {
        kind: "Missing Content Security Policy",
        severity: Severity::High,
        description: "No CSP header found, making the site vulnerable to XSS attacks",
        recommendation:
            "Implement a comprehensive Content Security Policy header to prevent XSS attacks",
    },
    VulnerabilityTemplate {
        kind: "Weak SSL Configuration",
        severity: Severity::Medium,
        description: "SSL certificate uses weak cipher suites",
        recommendation:
            "Update SSL configuration to use only strong cipher suites and disable weak protocols",
    },
    VulnerabilityTemplate {
        kind: "Missing Security Headers",
        severity: Severity::Medium,
        description:
            "Several security headers are missing (X-Frame-Options, X-Content-Type-Options)",
        recommendation: "Add comprehensive security headers to protect against common attacks",
    },
    VulnerabilityTemplate {
        kind: "Exposed Server Information",
        severity: Severity::Low,
        description: "Server banner reveals version information",
        recommendation: "Configure server to hide version information in HTTP headers",
    },
];

const ENHANCED_PERFORMANCE_ISSUES: &[IssueTemplate] = &[
    IssueTemplate {
        kind: "Large Bundle Size",
        description: "JavaScript bundle size exceeds recommended limits",
        recommendation: "Implement code splitting and tree shaking to reduce bundle size",
    },
    IssueTemplate {
        kind: "Unoptimized Images",
        description: "Images are not using modern formats or proper compression",
        recommendation: "Convert images to WebP format and implement responsive image loading",
    },
    IssueTemplate {
        kind: "Missing Resource Hints",
        description: "Critical resources lack preload hints",
        recommendation: "Add preload hints for critical fonts, CSS, and JavaScript files",
    },
    IssueTemplate {
        kind: "Inefficient Caching",
        description: "Static resources have suboptimal cache headers",
        recommendation: "Implement long-term caching for static assets with proper versioning",
    },
];

const ENHANCED_SEO_ISSUES: &[IssueTemplate] = &[
    IssueTemplate {
        kind: "Missing Schema Markup",
        description: "No structured data found for better search visibility",
        recommendation: "Implement JSON-LD schema markup for organization, articles, and products",
    },
    IssueTemplate {
        kind: "Suboptimal Meta Tags",
        description: "Meta descriptions and titles need optimization",
        recommendation: "Craft unique, keyword-rich meta descriptions under 160 characters",
    },
    IssueTemplate {
        kind: "Missing Open Graph Tags",
        description: "Social media sharing tags are incomplete",
        recommendation: "Add comprehensive Open Graph and Twitter Card meta tags",
    },
    IssueTemplate {
        kind: "Internal Linking Issues",
        description: "Poor internal link structure affects page authority distribution",
        recommendation: "Implement strategic internal linking with descriptive anchor text",
    },
];

const ENHANCED_ACCESSIBILITY_ISSUES: &[IssueTemplate] = &[
    IssueTemplate {
        kind: "Missing ARIA Labels",
        description: "Interactive elements lack proper ARIA labeling",
        recommendation: "Add ARIA labels and descriptions to all interactive components",
    },
    IssueTemplate {
        kind: "Color Contrast Issues",
        description: "Several text elements fail WCAG AA contrast requirements",
        recommendation: "Ensure all text has a contrast ratio of at least 4.5:1 with background",
    },
    IssueTemplate {
        kind: "Keyboard Navigation Problems",
        description: "Some elements are not accessible via keyboard navigation",
        recommendation:
            "Ensure all interactive elements are reachable and usable with keyboard only",
    },
    IssueTemplate {
        kind: "Missing Skip Links",
        description: "No skip navigation links for screen readers",
        recommendation: "Add skip links to main content and navigation sections",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::types::{AuditConfig, AuditTypes};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_basic_template_order_is_fixed() {
        let mut rng = StdRng::seed_from_u64(11);
        let result =
            MockResultGenerator.generate_with_rng(&AuditRequest::basic("https://x.io"), &mut rng);
        assert_eq!(result.security.vulnerabilities[0].kind, "Missing HTTPS");
        assert_eq!(result.security.vulnerabilities[1].severity, Severity::High);
        assert_eq!(result.performance.issues[1].kind, "Render Blocking Resources");
        assert_eq!(result.accessibility.issues[0].kind, "Missing Alt Text");
    }

    #[test]
    fn test_enhanced_scores_never_exceed_max() {
        let mut rng = StdRng::seed_from_u64(5);
        let request = AuditRequest::enhanced(AuditConfig::for_url("https://a.com"));
        for _ in 0..2000 {
            let result = MockResultGenerator.generate_with_rng(&request, &mut rng);
            for (_, score) in result.scores() {
                assert!((70..=MAX_SCORE).contains(&score));
            }
        }
    }

    #[test]
    fn test_enhanced_scores_share_base() {
        // Every category starts from the same base, so the spread between any
        // two scores is bounded by the larger bonus range.
        let mut rng = StdRng::seed_from_u64(9);
        let request = AuditRequest::enhanced(AuditConfig::for_url("https://a.com"));
        for _ in 0..500 {
            let r = MockResultGenerator.generate_with_rng(&request, &mut rng);
            let diff = i16::from(r.performance.score) - i16::from(r.accessibility.score);
            assert!(diff.abs() < 15);
        }
    }

    #[test]
    fn test_toggles_do_not_filter_categories() {
        let mut config = AuditConfig::for_url("https://a.com");
        config.audit_types = AuditTypes::none();
        config.audit_types.seo = true;
        let result = MockResultGenerator
            .generate_with_rng(&AuditRequest::enhanced(config), &mut StdRng::seed_from_u64(2));
        assert_eq!(result.security.vulnerabilities.len(), 4);
        assert_eq!(result.performance.issues.len(), 4);
        assert_eq!(result.accessibility.issues.len(), 4);
    }
}
