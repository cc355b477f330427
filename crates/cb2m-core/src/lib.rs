//! Core artifact pipeline for cb2m.
//!
//! This crate provides:
//! - Source classification (class- or method-shaped Java snippets)
//! - Descriptor (POM) templating
//! - Isolated per-request build jobs
//! - javac orchestration
//! - Deterministic jar packaging

pub mod build;
pub mod classify;
pub mod compile;
pub mod error;
pub mod job;
pub mod package;
pub mod paths;
pub mod snippet;
pub mod template;

pub use build::{ArchiveBuilder, ArchiveOutcome};
pub use classify::{Rejection, SourceShape, classify, classify_revision};
pub use compile::{CompilerResult, CompilerSettings, CompilerSpec, JavaToolchain, SourceUnit};
pub use error::{Error, Result};
pub use job::BuildJob;
pub use package::pack;
pub use paths::{JobRemoval, RemovalHook, TempRoot};
pub use snippet::{Revision, Snippet};
pub use template::{BuildContext, DescriptorTemplate, render};
