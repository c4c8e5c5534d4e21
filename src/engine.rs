//! Response generation.
//!
//! Keyword rules are tried first, then phrase rules, then spurs. Within a table
//! earlier rules win. A candidate equal to the previous response is skipped in
//! favor of the next rule, and a keyword rule is spent the first time it
//! matches, whether or not its response was used.

use std::sync::Arc;

use tracing::debug;

use crate::script::CounselorScript;
use crate::spurs::SpurPool;
use crate::types::ResponseSource;

/// Per-session response generator over a shared script.
#[derive(Debug, Clone)]
pub struct ResponseEngine {
    script: Arc<CounselorScript>,
    fired: Vec<bool>,
    spurs: SpurPool,
}

impl ResponseEngine {
    /// Create an engine with all keywords unfired and the script's spurs loaded.
    pub fn new(script: Arc<CounselorScript>, seed: Option<u64>) -> Self {
        let spurs = SpurPool::new(
            script.spurs().iter().cloned(),
            script.fallback_spur(),
            seed,
        );
        Self {
            fired: vec![false; script.keywords().len()],
            script,
            spurs,
        }
    }

    /// Generate a response for swapped `text`.
    ///
    /// Returns `None` only when no rule produced a fresh response and
    /// `allow_spur` is false.
    pub fn generate(&mut self, text: &str, last_response: &str, allow_spur: bool) -> Option<String> {
        self.generate_with_source(text, last_response, allow_spur)
            .map(|(response, _)| response)
    }

    /// Like [`generate`](Self::generate), also reporting which rule answered.
    pub fn generate_with_source(
        &mut self,
        text: &str,
        last_response: &str,
        allow_spur: bool,
    ) -> Option<(String, ResponseSource)> {
        for (index, rule) in self.script.keywords().iter().enumerate() {
            if self.fired[index] || !rule.matches(text) {
                continue;
            }
            self.fired[index] = true;
            if rule.response() == last_response {
                debug!(rule = index, "keyword response repeats last turn, skipping");
                continue;
            }
            debug!(rule = index, pattern = rule.pattern(), "keyword rule fired");
            return Some((rule.response().to_string(), ResponseSource::Keyword(index)));
        }

        for (index, rule) in self.script.phrases().iter().enumerate() {
            let Some(response) = rule.apply(text) else {
                continue;
            };
            if response == last_response {
                debug!(rule = index, "phrase response repeats last turn, skipping");
                continue;
            }
            debug!(rule = index, pattern = rule.pattern(), "phrase rule matched");
            return Some((response, ResponseSource::Phrase(index)));
        }

        if !allow_spur {
            return None;
        }
        let source = if self.spurs.is_exhausted() {
            ResponseSource::FallbackSpur
        } else {
            ResponseSource::Spur
        };
        Some((self.spurs.next_spur(), source))
    }

    /// Whether the keyword rule at `index` has been spent.
    pub fn is_fired(&self, index: usize) -> bool {
        self.fired.get(index).copied().unwrap_or(false)
    }

    /// The spur pool.
    pub fn spurs(&self) -> &SpurPool {
        &self.spurs
    }

    /// The spur pool, for adding fact-specific spurs.
    pub fn spurs_mut(&mut self) -> &mut SpurPool {
        &mut self.spurs
    }

    /// The script this engine runs.
    pub fn script(&self) -> &Arc<CounselorScript> {
        &self.script
    }
}
