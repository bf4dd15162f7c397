//! Interpreter for compiled decision graphs.
//!
//! An [`Engine`] traverses one graph for one subject: the host feeds it
//! answers, the engine accumulates a compound tag value and records every
//! node it visits. Graphs are shared read-only (`Arc`), so any number of
//! engines can run over the same graph independently.

mod engine;
mod error;

pub use engine::{Engine, EngineStatus};
pub use error::{Result, RuntimeError};
