use std::collections::HashSet;

/// Every perspective text emitted so far in one run.
///
/// Grows monotonically; insertion order is kept so prompts can quote the most
/// recent texts back to the model.
#[derive(Debug, Default)]
pub struct ExistingTexts {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl ExistingTexts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.seen.contains(text)
    }

    /// Returns `false` if the text was already present.
    pub fn insert(&mut self, text: &str) -> bool {
        if !self.seen.insert(text.to_string()) {
            return false;
        }
        self.order.push(text.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The last `n` texts, oldest first.
    pub fn recent(&self, n: usize) -> &[String] {
        &self.order[self.order.len().saturating_sub(n)..]
    }
}
