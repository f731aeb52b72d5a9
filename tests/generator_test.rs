use site_audit::audit::{
    AuditConfig, AuditRequest, AuditTypes, MockResultGenerator, ResultGenerator, Severity,
};

const SAMPLES: usize = 1000;

fn basic() -> AuditRequest {
    AuditRequest::basic("https://example.com")
}

fn enhanced() -> AuditRequest {
    AuditRequest::enhanced(AuditConfig::for_url("https://a.com"))
}

// --- Score ranges ---

#[test]
fn test_basic_scores_within_ranges() {
    for _ in 0..SAMPLES {
        let r = MockResultGenerator.generate(&basic());
        assert!((60..=100).contains(&r.security.score), "security {}", r.security.score);
        assert!((70..=100).contains(&r.performance.score));
        assert!((75..=100).contains(&r.seo.score));
        assert!((80..=100).contains(&r.accessibility.score));
    }
}

#[test]
fn test_basic_load_time_range() {
    for _ in 0..SAMPLES {
        let r = MockResultGenerator.generate(&basic());
        assert!(r.performance.load_time >= 1.0 && r.performance.load_time < 4.0);
    }
}

#[test]
fn test_enhanced_scores_within_ranges() {
    for _ in 0..SAMPLES {
        let r = MockResultGenerator.generate(&enhanced());
        // base 70..=89 plus a bonus, clamped to 100
        assert!((70..=98).contains(&r.security.score));
        assert!((70..=100).contains(&r.performance.score));
        assert!((70..=100).contains(&r.seo.score));
        assert!((70..=96).contains(&r.accessibility.score));
    }
}

#[test]
fn test_enhanced_load_time_range() {
    for _ in 0..SAMPLES {
        let r = MockResultGenerator.generate(&enhanced());
        assert!(r.performance.load_time >= 1.2 && r.performance.load_time < 3.2);
    }
}

// --- Finding lists ---

#[test]
fn test_lists_are_never_empty() {
    for request in [basic(), enhanced()] {
        let r = MockResultGenerator.generate(&request);
        assert!(!r.security.vulnerabilities.is_empty());
        assert!(!r.performance.issues.is_empty());
        assert!(!r.seo.issues.is_empty());
        assert!(!r.accessibility.issues.is_empty());
    }
}

#[test]
fn test_findings_are_deterministic_across_calls() {
    let a = MockResultGenerator.generate(&enhanced());
    let b = MockResultGenerator.generate(&enhanced());
    assert_eq!(a.security.vulnerabilities, b.security.vulnerabilities);
    assert_eq!(a.performance.issues, b.performance.issues);
    assert_eq!(a.seo.issues, b.seo.issues);
    assert_eq!(a.accessibility.issues, b.accessibility.issues);
}

#[test]
fn test_findings_independent_of_target() {
    let a = MockResultGenerator.generate(&AuditRequest::basic("https://one.example"));
    let b = MockResultGenerator.generate(&AuditRequest::basic("https://two.example"));
    assert_eq!(a.security.vulnerabilities, b.security.vulnerabilities);
    assert_eq!(a.seo.issues, b.seo.issues);
    assert_eq!(a.url, "https://one.example");
    assert_eq!(b.url, "https://two.example");
}

#[test]
fn test_enhanced_severity_mix() {
    let r = MockResultGenerator.generate(&enhanced());
    let breakdown = r.severity_breakdown();
    assert_eq!(breakdown.get(&Severity::High), Some(&1));
    assert_eq!(breakdown.get(&Severity::Medium), Some(&2));
    assert_eq!(breakdown.get(&Severity::Low), Some(&1));
    assert_eq!(r.finding_count(), 16);
}

#[test]
fn test_disabled_toggles_still_produce_all_categories() {
    let mut config = AuditConfig::for_url("https://a.com");
    config.audit_types = AuditTypes::none();
    config.audit_types.security = true;
    let r = MockResultGenerator.generate(&AuditRequest::enhanced(config));
    assert_eq!(r.performance.issues.len(), 4);
    assert_eq!(r.seo.issues.len(), 4);
    assert_eq!(r.accessibility.issues.len(), 4);
}

// --- Timestamp and wire format ---

#[test]
fn test_timestamp_is_generation_time() {
    let before = chrono::Utc::now();
    let r = MockResultGenerator.generate(&basic());
    let after = chrono::Utc::now();
    assert!(r.timestamp >= before && r.timestamp <= after);
}

#[test]
fn test_result_json_shape() {
    let r = MockResultGenerator.generate(&basic());
    let value = serde_json::to_value(&r).unwrap();

    assert_eq!(value["url"], "https://example.com");
    let ts = value["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    assert!(value["performance"]["loadTime"].as_f64().unwrap() >= 1.0);
    assert_eq!(value["security"]["vulnerabilities"][0]["type"], "Missing HTTPS");
    assert_eq!(value["security"]["vulnerabilities"][0]["severity"], "medium");
    assert!(value["seo"]["issues"][0]["recommendation"].is_string());

    let back: site_audit::audit::AuditResult = serde_json::from_value(value).unwrap();
    assert_eq!(back.url, r.url);
    assert_eq!(back.timestamp, r.timestamp);
    assert_eq!(back.scores(), r.scores());
    assert_eq!(back.security.vulnerabilities, r.security.vulnerabilities);
}
