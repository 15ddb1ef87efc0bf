//! Per-band validation and bounded repair.
//!
//! Every slot handed in leaves with exactly one perspective whose text is new to
//! the run: accepted as generated, fixed by one repair call, or synthesized
//! from the slot alone.

use crate::parser::{parse_candidates, Perspective, PerspectiveCandidate};
use crate::prompt::build_repair_prompt;
use crate::scaffold::{round4, Band, PerspectiveSlot};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::client::GenerationClient;
use super::existing::ExistingTexts;

/// Significance assigned to repaired candidates whose own value is unusable.
const DEFAULT_SIGNIFICANCE: f64 = 0.5;

/// A slot whose first-pass candidate failed validation.
#[derive(Debug, Clone)]
pub struct RepairItem {
    /// Position of the slot within its band
    pub position: usize,
    pub slot: PerspectiveSlot,
    pub candidate: PerspectiveCandidate,
}

#[derive(Debug, Default)]
pub struct Classified {
    pub valid: Vec<Perspective>,
    pub needs_repair: Vec<RepairItem>,
}

/// Knobs for the repair round.
#[derive(Debug, Clone)]
pub struct RepairSettings {
    pub batch_size: usize,
    pub avoid_limit: usize,
    pub temperature: f32,
    pub delay_after: Duration,
}

/// Result of filling one band.
#[derive(Debug, Default)]
pub struct BandOutcome {
    /// Sorted by `bias_x`
    pub perspectives: Vec<Perspective>,
    pub accepted: usize,
    pub repaired: usize,
    pub fallbacks: usize,
}

/// Match candidates to slots by position and split them into valid and
/// needs-repair. Valid texts are recorded in `existing` immediately, so a
/// duplicate later in the same batch is caught.
pub fn classify(
    slots: &[PerspectiveSlot],
    candidates: Vec<PerspectiveCandidate>,
    existing: &mut ExistingTexts,
) -> Classified {
    let mut result = Classified::default();
    let mut candidates = candidates.into_iter();

    for (position, slot) in slots.iter().enumerate() {
        // Slots the model skipped get an empty candidate and go to repair
        let candidate = candidates.next().unwrap_or_default();

        let significance = candidate.valid_significance();
        let unique = !candidate.text.is_empty() && !existing.contains(&candidate.text);

        match significance {
            Some(significance_y) if unique => {
                existing.insert(&candidate.text);
                result.valid.push(Perspective {
                    band: slot.band,
                    bias_x: slot.bias_x,
                    significance_y,
                    text: candidate.text,
                });
            }
            _ => result.needs_repair.push(RepairItem {
                position,
                slot: *slot,
                candidate,
            }),
        }
    }

    result
}

/// Apply one repair call's candidates to its batch, positionally.
///
/// Returns the perspectives and how many of them had to fall back.
pub fn apply_repairs(
    batch: &[RepairItem],
    repaired: &[PerspectiveCandidate],
    existing: &mut ExistingTexts,
) -> (Vec<Perspective>, usize) {
    let mut out = Vec::with_capacity(batch.len());
    let mut fallbacks = 0;

    for (j, item) in batch.iter().enumerate() {
        let usable = repaired
            .get(j)
            .filter(|c| !c.text.is_empty() && !existing.contains(&c.text));

        match usable {
            Some(candidate) => {
                existing.insert(&candidate.text);
                out.push(Perspective {
                    band: item.slot.band,
                    bias_x: item.slot.bias_x,
                    significance_y: candidate
                        .valid_significance()
                        .unwrap_or(DEFAULT_SIGNIFICANCE),
                    text: candidate.text.clone(),
                });
            }
            None => {
                debug!(
                    "Repair for {} item {} (slot {}) unusable, falling back",
                    item.slot.band, item.position, item.slot.index
                );
                out.push(fallback_perspective(&item.slot, existing));
                fallbacks += 1;
            }
        }
    }

    (out, fallbacks)
}

/// Deterministic perspective built from the slot alone, recorded in `existing`.
///
/// The template is chosen by bias bucket; if that text is already taken it is
/// qualified with the band and bias, then numbered, until it is unique.
pub fn fallback_perspective(slot: &PerspectiveSlot, existing: &mut ExistingTexts) -> Perspective {
    let base = fallback_text(slot.band, slot.bias_x);

    let mut text = base.to_string();
    if existing.contains(&text) {
        text = format!("{} ({} view at bias {:.4})", base, slot.band, slot.bias_x);
    }
    let qualified = text.clone();
    let mut n = 2;
    while existing.contains(&text) {
        text = format!("{} #{}", qualified, n);
        n += 1;
    }

    existing.insert(&text);
    Perspective {
        band: slot.band,
        bias_x: slot.bias_x,
        significance_y: round4(0.5 + slot.bias_x * 0.3),
        text,
    }
}

fn fallback_text(band: Band, bias_x: f64) -> &'static str {
    if bias_x < 0.2 {
        if band == Band::Red {
            "This represents a fundamental breach of principle that demands immediate corrective action."
        } else {
            "The pattern here is troubling enough to warrant serious scrutiny from those responsible."
        }
    } else if bias_x < 0.4 {
        "The concerns raised deserve attention, but firm conclusions should wait for fuller evidence."
    } else if bias_x < 0.6 {
        "A fair assessment requires weighing the available evidence from several independent sources."
    } else if bias_x < 0.8 {
        "Much of this reflects ordinary disagreement rather than a substantive problem."
    } else if band == Band::Violet {
        "The claim rests more on rhetoric than on any demonstrable fact."
    } else {
        "This reads as routine criticism of the kind found in any open debate."
    }
}

/// Validate one band's candidates and drive the repair loop to completion.
///
/// Never fails: repair calls that error or return garbage resolve to
/// fallbacks, so every slot ends with exactly one unique perspective.
pub async fn validate_and_repair(
    client: &GenerationClient,
    statement: &str,
    slots: &[PerspectiveSlot],
    candidates: Vec<PerspectiveCandidate>,
    existing: &mut ExistingTexts,
    settings: &RepairSettings,
) -> BandOutcome {
    let Classified {
        valid,
        needs_repair,
    } = classify(slots, candidates, existing);

    let mut outcome = BandOutcome {
        accepted: valid.len(),
        perspectives: valid,
        ..BandOutcome::default()
    };

    if !needs_repair.is_empty() {
        let band = needs_repair[0].slot.band;
        info!("Repairing {} items for {}", needs_repair.len(), band);

        for batch in needs_repair.chunks(settings.batch_size.max(1)) {
            let prompt = build_repair_prompt(statement, batch, existing, settings.avoid_limit);

            let repaired = match client
                .call(&prompt, settings.temperature, settings.delay_after)
                .await
            {
                Ok(raw) => match parse_candidates(&raw) {
                    Ok(candidates) => candidates,
                    Err(e) => {
                        warn!("Repair output for {} unparseable ({}), using fallbacks", band, e);
                        Vec::new()
                    }
                },
                Err(e) => {
                    warn!("Repair call for {} failed ({}), using fallbacks", band, e);
                    Vec::new()
                }
            };

            let (perspectives, fallbacks) = apply_repairs(batch, &repaired, existing);
            outcome.repaired += perspectives.len() - fallbacks;
            outcome.fallbacks += fallbacks;
            outcome.perspectives.extend(perspectives);
        }
    }

    outcome
        .perspectives
        .sort_by(|a, b| a.bias_x.total_cmp(&b.bias_x));
    outcome
}
