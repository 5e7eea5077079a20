//! Claude-backed classification and risk assessment.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use ai_client::{normalize_label, truncate_to_char_boundary, Claude};
use urbanfix_common::{Category, RiskTier};

use crate::traits::{RiskOracle, TextClassifier};

/// Upper bound on report text sent per call.
const MAX_PROMPT_TEXT_BYTES: usize = 12_000;

/// One-word answers; anything longer is a malformed response anyway.
const LABEL_MAX_TOKENS: u32 = 16;

const TRIAGE_SYSTEM_PROMPT: &str = "You triage citizen reports about urban problems \
for a city administration. Answer with a single lowercase word and nothing else.";

fn risk_prompt(descriptions: &str) -> String {
    format!(
        "Rate the risk of the problem described by these citizen reports as low, moderate, or urgent.\n\
Only genuine infrastructure, sanitation, traffic, environment or public-safety problems may be \
moderate or urgent. Spam, personal content and anything not about the city is low.\n\
Reply with exactly one word: low, moderate, or urgent.\n\n\
Reports:\n{}",
        truncate_to_char_boundary(descriptions, MAX_PROMPT_TEXT_BYTES)
    )
}

fn category_prompt(text: &str, allowed: &[Category]) -> String {
    let labels = allowed
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Classify this urban issue report into exactly one of these categories: {labels}.\n\
Use \"unrelated\" when the text is not about a problem in the city.\n\
Reply with the category only.\n\n\
Report:\n{}",
        truncate_to_char_boundary(text, MAX_PROMPT_TEXT_BYTES)
    )
}

/// Parse a model answer into a tier. Anything but the three words is an error.
pub fn parse_risk_answer(answer: &str) -> Result<RiskTier> {
    let label = normalize_label(answer);
    label
        .parse::<RiskTier>()
        .map_err(|e| anyhow!("unparseable risk answer: {e}"))
}

// ---------------------------------------------------------------------------
// LlmClassifier
// ---------------------------------------------------------------------------

pub struct LlmClassifier {
    ai: Claude,
}

impl LlmClassifier {
    pub fn new(ai: Claude) -> Self {
        Self {
            ai: ai.with_max_tokens(LABEL_MAX_TOKENS),
        }
    }
}

#[async_trait]
impl TextClassifier for LlmClassifier {
    async fn classify(&self, text: &str, allowed: &[Category]) -> Result<String> {
        self.ai
            .chat_completion(TRIAGE_SYSTEM_PROMPT, category_prompt(text, allowed))
            .await
    }

    fn name(&self) -> &str {
        "claude"
    }
}

// ---------------------------------------------------------------------------
// LlmRiskOracle
// ---------------------------------------------------------------------------

pub struct LlmRiskOracle {
    ai: Claude,
}

impl LlmRiskOracle {
    pub fn new(ai: Claude) -> Self {
        Self {
            ai: ai.with_max_tokens(LABEL_MAX_TOKENS),
        }
    }
}

#[async_trait]
impl RiskOracle for LlmRiskOracle {
    async fn assess(&self, descriptions: &str) -> Result<RiskTier> {
        let answer = self
            .ai
            .chat_completion(TRIAGE_SYSTEM_PROMPT, risk_prompt(descriptions))
            .await?;
        parse_risk_answer(&answer)
    }

    fn name(&self) -> &str {
        "claude"
    }
}

// ---------------------------------------------------------------------------
// UnavailableCapability
// ---------------------------------------------------------------------------

/// Used when no AI key is configured. Every call fails, so callers take
/// their documented fallbacks.
pub struct UnavailableCapability;

#[async_trait]
impl TextClassifier for UnavailableCapability {
    async fn classify(&self, _text: &str, _allowed: &[Category]) -> Result<String> {
        bail!("AI classification is not configured")
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

#[async_trait]
impl RiskOracle for UnavailableCapability {
    async fn assess(&self, _descriptions: &str) -> Result<RiskTier> {
        bail!("AI risk assessment is not configured")
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}
