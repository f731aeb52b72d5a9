use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use super::generator::{MockResultGenerator, ResultGenerator};
use super::steps::StepProgress;
use super::types::{AuditRequest, AuditResult};
use crate::error::ValidationError;

/// Receives the observable transitions of a run.
///
/// A rejected run produces exactly one `on_rejected` call and nothing else. A
/// successful run produces one `on_step` per step, in order, then exactly one
/// `on_complete`.
#[async_trait]
pub trait ProgressObserver: Send {
    async fn on_step(&mut self, progress: &StepProgress);

    async fn on_complete(&mut self, _result: &AuditResult) {}

    async fn on_rejected(&mut self, _error: &ValidationError) {}
}

/// Drives the fixed step sequence of a variant, pausing between steps, and
/// hands the generated result to the caller.
///
/// Single-flight: callers must not overlap runs that share observable state.
#[derive(Clone)]
pub struct AuditRunner {
    generator: Arc<dyn ResultGenerator>,
    delay_scale: f64,
}

impl AuditRunner {
    pub fn new(delay_scale: f64) -> Self {
        Self::with_generator(Arc::new(MockResultGenerator), delay_scale)
    }

    pub fn with_generator(generator: Arc<dyn ResultGenerator>, delay_scale: f64) -> Self {
        let delay_scale = if delay_scale.is_finite() && delay_scale > 0.0 {
            delay_scale
        } else {
            0.0
        };
        Self {
            generator,
            delay_scale,
        }
    }

    pub fn delay_scale(&self) -> f64 {
        self.delay_scale
    }

    /// Checks preconditions without side effects.
    pub fn validate(request: &AuditRequest) -> Result<(), ValidationError> {
        validate_target(request.url())?;
        if let Some(config) = request.config() {
            if !config.audit_types.any_enabled() {
                return Err(ValidationError::NoAuditTypes);
            }
        }
        Ok(())
    }

    pub async fn run<O>(
        &self,
        request: AuditRequest,
        observer: &mut O,
    ) -> Result<AuditResult, ValidationError>
    where
        O: ProgressObserver + ?Sized,
    {
        if let Err(e) = Self::validate(&request) {
            warn!("Audit rejected: {}", e);
            observer.on_rejected(&e).await;
            return Err(e);
        }

        let variant = request.variant();
        let steps = variant.steps();
        info!(
            "Audit started: url={}, variant={}, steps={}",
            request.url(),
            variant,
            steps.len()
        );

        for (index, step) in steps.iter().enumerate() {
            let progress = StepProgress::new(index, steps.len(), step);
            debug!(
                "Step {}/{} ({}): {:.0}%",
                index + 1,
                steps.len(),
                step.id,
                progress.fraction * 100.0
            );
            observer.on_step(&progress).await;

            let delay = step.delay(&mut rand::thread_rng(), self.delay_scale);
            if !delay.is_zero() {
                sleep(delay).await;
            }
        }

        let result = self.generator.generate(&request);
        info!(
            "Audit completed: url={}, overall_score={}",
            result.url,
            result.overall_score()
        );
        observer.on_complete(&result).await;
        Ok(result)
    }
}

fn has_host(url: &Url) -> bool {
    url.host_str().is_some_and(|h| !h.is_empty())
}

fn starts_with_port(path: &str) -> bool {
    path.split('/')
        .next()
        .is_some_and(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// A target must be a non-empty absolute URL with a host. Bare hosts such as
/// `example.com` or `localhost:3000` are accepted as if prefixed with `https://`.
pub fn validate_target(target: &str) -> Result<(), ValidationError> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTarget);
    }

    let first = Url::parse(trimmed);
    if first.as_ref().is_ok_and(has_host) {
        return Ok(());
    }

    // `host:port` parses as scheme `host` with the port as an opaque path.
    let retry = match &first {
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
        Ok(url) => starts_with_port(url.path()),
    };
    let retried = if retry && !trimmed.contains("://") {
        Url::parse(&format!("https://{}", trimmed)).ok()
    } else {
        None
    };
    if retried.as_ref().is_some_and(has_host) {
        return Ok(());
    }

    let reason = match first {
        Err(e) => e.to_string(),
        Ok(_) => "missing host".to_string(),
    };
    Err(ValidationError::InvalidTarget {
        url: target.to_string(),
        reason,
    })
}
