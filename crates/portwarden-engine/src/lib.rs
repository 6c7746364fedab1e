//! # portwarden-engine
//!
//! The decision core of Portwarden:
//!
//! - **Classifier**: pure, side-effect-free verdict functions over one
//!   connection plus the active configuration.
//! - **`AnalyzerPipeline`**: four ordered analysis stages run against one
//!   snapshot, with per-item cancellation checkpoints.
//! - **`PollingScheduler`**: drives the pipeline at a fixed interval and
//!   owns the cooperative shutdown handshake with the input watcher.
//!
//! Classification is fully decoupled from presentation: stages return
//! structured findings, never print.

pub mod cancel;
pub mod classify;
pub mod pipeline;
pub mod scheduler;

pub use cancel::CancelFlag;
pub use pipeline::{AnalyzerPipeline, AnalyzerStage};
pub use scheduler::{CycleReport, PollingScheduler, SchedulerState};
