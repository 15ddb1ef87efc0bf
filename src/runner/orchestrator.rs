use crate::config::Config;
use crate::error::{ParseError, PipelineError};
use crate::parser::{parse_candidates, Perspective, PerspectiveCandidate};
use crate::prompt::build_band_prompt;
use crate::scaffold::{group_by_band, Band, PerspectiveSlot};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::client::GenerationClient;
use super::existing::ExistingTexts;
use super::validate::{fallback_perspective, validate_and_repair, RepairSettings};

/// Everything one run needs beyond the loaded config.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Overrides the configured HTTP base URL
    pub endpoint: Option<String>,
    /// Band generation temperature
    pub temperature: f32,
    /// Receives one update per completed band, in band order
    pub stream: Option<UnboundedSender<BandUpdate>>,
    /// Checked between bands
    pub cancel: Arc<AtomicBool>,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            input: config.input.clone(),
            output: config.output.clone(),
            endpoint: None,
            temperature: config.generation.temperature,
            stream: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Write the run-level overrides back into `config`.
    pub fn apply_to(&self, config: &mut Config) {
        config.input = self.input.clone();
        config.output = self.output.clone();
        config.generation.temperature = self.temperature;
        if let Some(endpoint) = &self.endpoint {
            config.providers.http.endpoint = endpoint.clone();
        }
    }
}

/// A completed band, as sent to stream listeners.
#[derive(Debug, Clone, Serialize)]
pub struct BandUpdate {
    #[serde(rename = "color")]
    pub band: Band,
    pub perspectives: Vec<Perspective>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandStats {
    pub slots: usize,
    pub accepted: usize,
    pub repaired: usize,
    pub fallbacks: usize,
    pub parse_retries: usize,
}

#[derive(Debug)]
pub struct RunReport {
    /// Sorted by `bias_x`, exactly one per slot
    pub perspectives: Vec<Perspective>,
    pub bands: Vec<(Band, BandStats)>,
    pub total_duration: Duration,
}

impl RunReport {
    pub fn totals(&self) -> BandStats {
        let mut totals = BandStats::default();
        for (_, stats) in &self.bands {
            totals.slots += stats.slots;
            totals.accepted += stats.accepted;
            totals.repaired += stats.repaired;
            totals.fallbacks += stats.fallbacks;
            totals.parse_retries += stats.parse_retries;
        }
        totals
    }
}

/// Fills a scaffold band by band.
///
/// Bands run strictly in order: each prompt quotes texts accepted by the bands
/// before it.
pub struct PerspectivePipeline {
    config: Config,
    client: GenerationClient,
}

impl PerspectivePipeline {
    pub fn new(config: Config, client: GenerationClient) -> Self {
        Self { config, client }
    }

    pub async fn run(
        &self,
        statement: &str,
        context: Option<&str>,
        slots: &[PerspectiveSlot],
        options: &RunOptions,
    ) -> Result<RunReport, PipelineError> {
        let start = Instant::now();
        let mut existing = ExistingTexts::new();
        let mut perspectives = Vec::with_capacity(slots.len());
        let mut bands = Vec::new();

        let repair = RepairSettings {
            batch_size: self.config.repair.batch_size,
            avoid_limit: self.config.repair.avoid_limit,
            temperature: self.config.generation.repair_temperature,
            delay_after: Duration::from_millis(self.config.generation.repair_delay_after_ms),
        };

        let groups = group_by_band(slots);
        info!(
            "Generating {} perspectives across {} bands",
            slots.len(),
            groups.len()
        );

        for (completed, (band, band_slots)) in groups.iter().enumerate() {
            if options.cancel.load(Ordering::SeqCst) {
                warn!("Cancelled before {} band", band);
                return Err(PipelineError::Cancelled {
                    completed_bands: completed,
                });
            }

            info!("Processing {} band ({} slots)", band, band_slots.len());

            let prompt = build_band_prompt(
                statement,
                context,
                *band,
                band_slots,
                &existing,
                &self.config.prompt,
            );
            let (candidates, parse_retries) = self
                .generate_candidates(*band, &prompt, options.temperature)
                .await?;

            let outcome = validate_and_repair(
                &self.client,
                statement,
                band_slots,
                candidates,
                &mut existing,
                &repair,
            )
            .await;

            info!(
                "Completed {} band: {} accepted, {} repaired, {} fallbacks",
                band, outcome.accepted, outcome.repaired, outcome.fallbacks
            );

            if let Some(tx) = &options.stream {
                let update = BandUpdate {
                    band: *band,
                    perspectives: outcome.perspectives.clone(),
                };
                if let Err(e) = tx.send(update) {
                    warn!("Failed to stream {} band: {}", band, e);
                }
            }

            bands.push((
                *band,
                BandStats {
                    slots: band_slots.len(),
                    accepted: outcome.accepted,
                    repaired: outcome.repaired,
                    fallbacks: outcome.fallbacks,
                    parse_retries,
                },
            ));
            perspectives.extend(outcome.perspectives);
        }

        perspectives.sort_by(|a, b| a.bias_x.total_cmp(&b.bias_x));
        fit_to_slots(&mut perspectives, slots, &mut existing);

        Ok(RunReport {
            perspectives,
            bands,
            total_duration: start.elapsed(),
        })
    }

    /// One band call, plus a single cooler retry if nothing parses.
    async fn generate_candidates(
        &self,
        band: Band,
        prompt: &str,
        temperature: f32,
    ) -> Result<(Vec<PerspectiveCandidate>, usize), PipelineError> {
        let delay_after = Duration::from_millis(self.config.generation.delay_after_ms);

        let raw = self.call(band, prompt, temperature, delay_after).await?;
        match parse_candidates(&raw) {
            Ok(candidates) => return Ok((candidates, 0)),
            Err(e) => {
                debug!("Unparseable {} output: {:.200}", band, raw);
                warn!("{} for {} band, retrying once", e, band);
            }
        }

        let retry_temperature = self.config.generation.parse_retry_temperature;
        let raw = self.call(band, prompt, retry_temperature, delay_after).await?;
        parse_candidates(&raw)
            .map(|candidates| (candidates, 1))
            .map_err(|source: ParseError| PipelineError::Parse { band, source })
    }

    async fn call(
        &self,
        band: Band,
        prompt: &str,
        temperature: f32,
        delay_after: Duration,
    ) -> Result<String, PipelineError> {
        self.client
            .call(prompt, temperature, delay_after)
            .await
            .map_err(|source| PipelineError::Generation { band, source })
    }
}

/// Force the sorted result to exactly one perspective per slot.
fn fit_to_slots(
    perspectives: &mut Vec<Perspective>,
    slots: &[PerspectiveSlot],
    existing: &mut ExistingTexts,
) {
    if perspectives.len() > slots.len() {
        warn!(
            "Truncating {} perspectives to {} slots",
            perspectives.len(),
            slots.len()
        );
        perspectives.truncate(slots.len());
    }

    if perspectives.len() < slots.len() {
        warn!(
            "Padding {} perspectives to {} slots with fallbacks",
            perspectives.len(),
            slots.len()
        );
        for slot in &slots[perspectives.len()..] {
            perspectives.push(fallback_perspective(slot, existing));
        }
        perspectives.sort_by(|a, b| a.bias_x.total_cmp(&b.bias_x));
    }
}
