mod client;
mod existing;
mod orchestrator;
mod retry;
mod validate;

pub use client::GenerationClient;
pub use existing::ExistingTexts;
pub use orchestrator::{BandStats, BandUpdate, PerspectivePipeline, RunOptions, RunReport};
pub use validate::RepairItem;
