//! vw-service: Save/load orchestration for the wizard document
//!
//! The sole writer entry point: every mutation of the shared storage
//! document funnels through [`WizardService::save`], which runs the
//! diff/versioning/audit pipeline inside one gateway update cycle.

pub mod service;

pub use service::{ServiceError, WizardService};
