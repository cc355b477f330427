//! Compilation pipeline for snippet archives.
//!
//! This module provides:
//! - Source unit generation (classified snippet → one `.java` file)
//! - Compiler specs (deterministic javac command lines)
//! - Toolchain discovery and invocation (javac with timeout and
//!   concurrent stderr capture)
//!
//! # Architecture
//!
//! ```text
//! Revision code ──► SourceUnit ──► BuildJob/src/*.java
//!                                        │
//!                        CompilerSpec ───┴──► javac ──► BuildJob/build/**.class
//! ```

mod source;
mod toolchain;
mod types;

pub use source::{SourceUnit, WRAPPER_CLASS, java_identifier};
pub use toolchain::JavaToolchain;
pub use types::{
    CompilerResult, CompilerSettings, CompilerSpec, DEFAULT_COMPILE_TIMEOUT, DEFAULT_ENCODING,
    DEFAULT_RELEASE,
};
