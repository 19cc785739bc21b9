//! mutflow - a mutant-schemata mutation-testing engine for Rust.
//!
//! mutflow compiles marked Rust source once, injecting every mutation
//! operator's variants as conditional alternatives dispatched through a
//! process-wide runtime [`registry`]. A test harness then replays the
//! suite: once as a baseline that discovers reachable mutation points,
//! then once per selected mutation with exactly one variant active. A
//! suite that still passes with a mutation active means that mutation
//! survived.
//!
//! The four core subsystems:
//!
//! - [`transform`] (C3) — the IR transformer: walks a parsed file
//!   bottom-up and rewrites matched nodes into dispatch trees.
//! - [`operators`] (C2) — the operator catalogue: call-expression,
//!   return-statement, and function-body mutation families.
//! - [`registry`] (C1) — the runtime bridge between injected dispatch
//!   code and the session engine.
//! - [`session`] (C4) — per-test-class baseline/selection/result
//!   bookkeeping and the summary it produces.
//!
//! [`harness`] (C5) is the thin surface a multi-pass test driver calls to
//! drive a [`session::Session`]; [`harness::ReferenceHarness`] is a real,
//! if minimal, driver that shells out to a configured test command.
//!
//! # Example
//!
//! ```no_run
//! use mutflow::config::Config;
//! use mutflow::core::{FileSet, SourceFile};
//! use mutflow::operators::OperatorCatalogue;
//! use mutflow::transform::TransformPass;
//!
//! let config = Config::default();
//! let files = FileSet::from_path(".", &config).unwrap();
//! let mut pass = TransformPass::new(OperatorCatalogue::new());
//! for path in files.iter() {
//!     let source = SourceFile::load(path).unwrap();
//!     let relative = files.relative_path(path).display().to_string();
//!     let transformed = pass.transform(path, &relative, &source.content).unwrap();
//!     println!("{}: {} mutation points", relative, transformed.points.len());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod harness;
pub mod operators;
pub mod output;
pub mod registry;
pub mod session;
pub mod transform;

pub use core::{Error, Result};
