use rand::Rng;
use serde::Serialize;
use std::time::Duration;

use super::types::AuditVariant;
use crate::config::{
    BASIC_STEP_BASE_MS, ENHANCED_HEAVY_STEP_BASE_MS, ENHANCED_STEP_BASE_MS, STEP_JITTER_MS,
};

/// One named stage of a simulated audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuditStep {
    pub id: &'static str,
    pub label: &'static str,
    /// Minimum simulated duration.
    pub base_ms: u64,
    /// Upper bound of the uniform extra delay added to `base_ms`.
    pub jitter_ms: u64,
}

impl AuditStep {
    const fn new(id: &'static str, label: &'static str, base_ms: u64) -> Self {
        Self {
            id,
            label,
            base_ms,
            jitter_ms: STEP_JITTER_MS,
        }
    }

    /// Draws this step's pause, scaled by `scale`. A zero scale yields no pause.
    pub fn delay<R: Rng + ?Sized>(&self, rng: &mut R, scale: f64) -> Duration {
        if scale <= 0.0 || !scale.is_finite() {
            return Duration::ZERO;
        }
        let jitter = if self.jitter_ms == 0 {
            0.0
        } else {
            rng.gen_range(0.0..self.jitter_ms as f64)
        };
        let millis = (self.base_ms as f64 + jitter) * scale;
        Duration::from_micros((millis * 1000.0).round() as u64)
    }
}

pub static BASIC_STEPS: [AuditStep; 6] = [
    AuditStep::new("structure", "Analyzing website structure...", BASIC_STEP_BASE_MS),
    AuditStep::new("security", "Checking security vulnerabilities...", BASIC_STEP_BASE_MS),
    AuditStep::new("performance", "Testing performance metrics...", BASIC_STEP_BASE_MS),
    AuditStep::new("seo", "Evaluating SEO factors...", BASIC_STEP_BASE_MS),
    AuditStep::new(
        "accessibility",
        "Assessing accessibility compliance...",
        BASIC_STEP_BASE_MS,
    ),
    AuditStep::new("report", "Generating report...", BASIC_STEP_BASE_MS),
];

// Security and performance (indices 2 and 3) take longer.
pub static ENHANCED_STEPS: [AuditStep; 7] = [
    AuditStep::new("init", "Initializing scan...", ENHANCED_STEP_BASE_MS),
    AuditStep::new("crawl", "Crawling website structure...", ENHANCED_STEP_BASE_MS),
    AuditStep::new(
        "security",
        "Analyzing security vulnerabilities...",
        ENHANCED_HEAVY_STEP_BASE_MS,
    ),
    AuditStep::new(
        "performance",
        "Testing performance metrics...",
        ENHANCED_HEAVY_STEP_BASE_MS,
    ),
    AuditStep::new("seo", "Evaluating SEO factors...", ENHANCED_STEP_BASE_MS),
    AuditStep::new(
        "accessibility",
        "Checking accessibility compliance...",
        ENHANCED_STEP_BASE_MS,
    ),
    AuditStep::new("compile", "Compiling comprehensive report...", ENHANCED_STEP_BASE_MS),
];

impl AuditVariant {
    pub fn steps(self) -> &'static [AuditStep] {
        match self {
            AuditVariant::Basic => &BASIC_STEPS,
            AuditVariant::Enhanced => &ENHANCED_STEPS,
        }
    }
}

/// Fraction reported when step `index` of `total` begins: 0 for the first, 1 for the last.
pub fn progress_fraction(index: usize, total: usize) -> f64 {
    if total <= 1 {
        return 1.0;
    }
    index as f64 / (total - 1) as f64
}

/// Snapshot handed to observers at each step boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepProgress {
    pub index: usize,
    pub total: usize,
    pub step_id: &'static str,
    pub label: &'static str,
    pub fraction: f64,
}

impl StepProgress {
    pub fn new(index: usize, total: usize, step: &AuditStep) -> Self {
        Self {
            index,
            total,
            step_id: step.id,
            label: step.label,
            fraction: progress_fraction(index, total),
        }
    }

    pub fn percent(&self) -> u8 {
        (self.fraction * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_step_counts_per_variant() {
        assert_eq!(AuditVariant::Basic.steps().len(), 6);
        assert_eq!(AuditVariant::Enhanced.steps().len(), 7);
    }

    #[test]
    fn test_enhanced_heavy_steps_are_security_and_performance() {
        let steps = AuditVariant::Enhanced.steps();
        assert_eq!(steps[2].id, "security");
        assert_eq!(steps[3].id, "performance");
        assert_eq!(steps[2].base_ms, 2000);
        assert_eq!(steps[3].base_ms, 2000);
        for (i, step) in steps.iter().enumerate() {
            if i != 2 && i != 3 {
                assert_eq!(step.base_ms, 1500, "step {} ({})", i, step.id);
            }
        }
    }

    #[test]
    fn test_progress_fraction_endpoints() {
        assert_eq!(progress_fraction(0, 6), 0.0);
        assert_eq!(progress_fraction(5, 6), 1.0);
        assert!((progress_fraction(2, 6) - 0.4).abs() < f64::EPSILON);
        assert_eq!(progress_fraction(0, 1), 1.0);
    }

    #[test]
    fn test_delay_within_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for step in AuditVariant::Basic.steps() {
            for _ in 0..50 {
                let d = step.delay(&mut rng, 1.0);
                assert!(d >= Duration::from_millis(1000));
                assert!(d <= Duration::from_millis(2000));
            }
        }
        let heavy = &AuditVariant::Enhanced.steps()[2];
        for _ in 0..50 {
            let d = heavy.delay(&mut rng, 1.0);
            assert!(d >= Duration::from_millis(2000));
            assert!(d <= Duration::from_millis(3000));
        }
    }

    #[test]
    fn test_zero_or_invalid_scale_disables_delay() {
        let mut rng = StdRng::seed_from_u64(1);
        let step = &BASIC_STEPS[0];
        assert_eq!(step.delay(&mut rng, 0.0), Duration::ZERO);
        assert_eq!(step.delay(&mut rng, -3.0), Duration::ZERO);
        assert_eq!(step.delay(&mut rng, f64::NAN), Duration::ZERO);
    }

    #[test]
    fn test_scale_shrinks_delay() {
        let mut rng = StdRng::seed_from_u64(3);
        let d = BASIC_STEPS[0].delay(&mut rng, 0.01);
        assert!(d >= Duration::from_millis(10));
        assert!(d <= Duration::from_millis(20));
    }

    #[test]
    fn test_step_progress_percent() {
        let p = StepProgress::new(3, 7, &ENHANCED_STEPS[3]);
        assert_eq!(p.percent(), 50);
        assert_eq!(p.step_id, "performance");
    }
}
