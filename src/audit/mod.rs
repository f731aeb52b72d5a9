//! The simulated audit pipeline: request/result schema, the fixed step
//! sequences, the result generator and the runner that ties them together.

pub mod generator;
pub mod runner;
pub mod steps;
pub mod types;

pub use generator::{MockResultGenerator, ResultGenerator};
pub use runner::{AuditRunner, ProgressObserver};
pub use steps::{AuditStep, StepProgress};
pub use types::{
    AuditConfig, AuditRequest, AuditResult, AuditTypes, AuditVariant, Category, CategoryReport,
    DeviceClass, Issue, PerformanceReport, ScanDepth, ScoreStatus, SecurityReport, Severity,
    Vulnerability,
};
