//! Platform Kit
//!
//! Small shared building blocks used by the Durj security modules:
//!
//! - [`Clock`] - injectable wall clock ([`SystemClock`], [`ManualClock`])
//! - [`AuditSink`] / [`AuditDispatcher`] - fire-and-forget security event recording
//! - [`logging`] - `tracing-subscriber` initialisation
//! - [`config`] - layered configuration loading (defaults, YAML, env)
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod audit;
pub mod clock;
pub mod config;
pub mod logging;

pub use audit::{
    AuditAction, AuditDispatcher, AuditSink, RecordingAuditSink, SecurityEvent, TracingAuditSink,
};
pub use clock::{Clock, ManualClock, SystemClock};
