//! Summarization strategies and prompt style directives
//!
//! Each strategy is a prompt template with a `{text}` placeholder. The
//! tone/length directives are appended after the rendered template as a
//! "CRITICAL STYLE INSTRUCTION" block.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use summarybench_common::{LengthSetting, Result, SummaryBenchError, Tone};

const TEXT_PLACEHOLDER: &str = "{text}";

const BASIC_TEMPLATE: &str = "Summarize the following text concisely:

Text:
{text}

Summary:";

const ROLE_BASED_TEMPLATE: &str = "You are an expert summarizer. Your task is to create a clear,
concise summary that captures the main ideas and key facts.

Focus on:
- Main points
- Key findings
- Important details
- Facts over opinions

Text:
{text}

Summary:";

const CHAIN_OF_THOUGHT_TEMPLATE: &str = "You are an expert summarizer. Let's think step by step.

Step 1: Identify the main topic and purpose of the text
Step 2: Find the key arguments or findings
Step 3: Note important statistics or evidence
Step 4: Identify conclusions or recommendations
Step 5: Write a concise summary combining these elements

Text:
{text}

Let's think through this:
1. Main topic:
2. Key arguments:
3. Important evidence:
4. Conclusions:

Summary:";

const STRUCTURED_TEMPLATE: &str = "Create a summary with the following structure:

Key Findings (1-2 sentences):
Details (2-3 sentences):
Implications (1-2 sentences):

Text:
{text}

Summary:
Key Findings: [Your response]
Details: [Your response]
Implications: [Your response]";

const CONTEXT_AWARE_TEMPLATE: &str = "You are an expert summarizer. Create a summary following these examples:

Example Input: \"Machine learning is a subset of artificial intelligence...\"
Example Summary: \"Machine learning, a key AI technology, focuses on algorithms that learn from data.\"

Now summarize this text in a similar concise style:

Text:
{text}

Summary:";

/// Registered summarization strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StrategyId {
    #[serde(rename = "v1_basic")]
    Basic,
    #[serde(rename = "v2_role_based")]
    RoleBased,
    #[serde(rename = "v3_chain_of_thought")]
    ChainOfThought,
    #[serde(rename = "v4_structured")]
    Structured,
    #[serde(rename = "v5_context_aware")]
    ContextAware,
}

impl StrategyId {
    pub const ALL: [StrategyId; 5] = [
        StrategyId::Basic,
        StrategyId::RoleBased,
        StrategyId::ChainOfThought,
        StrategyId::Structured,
        StrategyId::ContextAware,
    ];

    /// Identifier as written to the evaluation log
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::Basic => "v1_basic",
            StrategyId::RoleBased => "v2_role_based",
            StrategyId::ChainOfThought => "v3_chain_of_thought",
            StrategyId::Structured => "v4_structured",
            StrategyId::ContextAware => "v5_context_aware",
        }
    }

    /// Strategies that ask the model for multi-step reasoning or detail
    pub fn is_reasoning_heavy(&self) -> bool {
        matches!(
            self,
            StrategyId::RoleBased | StrategyId::ChainOfThought | StrategyId::ContextAware
        )
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = SummaryBenchError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        StrategyId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| SummaryBenchError::unknown_strategy(s))
    }
}

/// Strategies compared when the caller names none
pub const DEFAULT_STRATEGIES: [StrategyId; 2] = [StrategyId::Basic, StrategyId::ChainOfThought];

/// A registered strategy and its template
#[derive(Debug, Clone, Serialize)]
pub struct Strategy {
    pub id: StrategyId,
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    #[serde(skip)]
    pub template: &'static str,
}

impl Strategy {
    /// Substitute `text` for the placeholder
    pub fn render(&self, text: &str) -> String {
        self.template.replace(TEXT_PLACEHOLDER, text)
    }
}

/// Lookup table from strategy id to template
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: Vec<Strategy>,
}

impl StrategyRegistry {
    /// Registry with the five built-in strategies
    pub fn new() -> Self {
        let strategies = vec![
            Strategy {
                id: StrategyId::Basic,
                name: "Basic Prompt",
                description: "Simple instruction-based prompt",
                version: "v1",
                template: BASIC_TEMPLATE,
            },
            Strategy {
                id: StrategyId::RoleBased,
                name: "Role-Based Prompt",
                description: "Defines expertise role with focus areas",
                version: "v2",
                template: ROLE_BASED_TEMPLATE,
            },
            Strategy {
                id: StrategyId::ChainOfThought,
                name: "Chain-of-Thought Prompt",
                description: "Step-by-step reasoning approach",
                version: "v3",
                template: CHAIN_OF_THOUGHT_TEMPLATE,
            },
            Strategy {
                id: StrategyId::Structured,
                name: "Structured Prompt",
                description: "Enforces output structure",
                version: "v4",
                template: STRUCTURED_TEMPLATE,
            },
            Strategy {
                id: StrategyId::ContextAware,
                name: "Context-Aware Prompt",
                description: "Provides examples for better alignment",
                version: "v5",
                template: CONTEXT_AWARE_TEMPLATE,
            },
        ];
        Self { strategies }
    }

    pub fn all(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn get(&self, id: &str) -> Result<&Strategy> {
        let id: StrategyId = id.parse()?;
        self.strategies
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| SummaryBenchError::unknown_strategy(id.as_str()))
    }

    pub fn template_for(&self, id: &str) -> Result<&'static str> {
        Ok(self.get(id)?.template)
    }

    /// Render the template of `id` around `text`
    pub fn render(&self, id: &str, text: &str) -> Result<String> {
        Ok(self.get(id)?.render(text))
    }

    /// Display name, falling back to the raw id
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|s| s.name).unwrap_or(id)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub fn tone_directive(tone: Tone) -> &'static str {
    match tone {
        Tone::Casual => "The writing style MUST be friendly, informal, and conversational. **Use simple, common vocabulary and sentences no longer than 15 words** (8th-grade reading level).",
        Tone::Neutral => "The writing style must be objective, clear, and professional. **To ensure high readability, the Average Sentence Length must not exceed 18 words.** Maintain a formal yet accessible tone (10th-grade reading level).",
        Tone::Academic => "The writing style MUST be formal, precise, and sophisticated. Use advanced terminology and complex sentence structures (college-level reading or higher).",
    }
}

pub fn length_directive(length: LengthSetting) -> &'static str {
    match length {
        LengthSetting::Short => "The summary length must be extremely concise and minimal. **Do not exceed 3 sentences or 60 words.**",
        LengthSetting::Medium => "The summary length should be balanced, covering the main points in moderate detail. Aim for 4 to 6 sentences.",
        LengthSetting::Long => "The summary must be detailed and comprehensive, covering all key aspects. Aim for 7 to 10 sentences.",
    }
}

/// Block appended after every rendered template
pub fn style_instruction(tone: Tone, length: LengthSetting) -> String {
    format!(
        "\n\nCRITICAL STYLE INSTRUCTION:\n1. TONE: {}\n2. LENGTH: {}\n",
        tone_directive(tone),
        length_directive(length)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConflictKind {
    Tone(Tone),
    Length(LengthSetting),
}

/// Advisory mismatch between a strategy and the requested style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleConflict {
    pub strategy: StrategyId,
    pub kind: ConflictKind,
}

impl fmt::Display for StyleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConflictKind::Tone(tone) => write!(
                f,
                "{} is a complex reasoning strategy that conflicts with the simplified {} tone",
                self.strategy, tone
            ),
            ConflictKind::Length(length) => write!(
                f,
                "{} needs more detail than the {} length restriction allows",
                self.strategy, length
            ),
        }
    }
}

/// Conflicts for the given strategies, one entry per (strategy, kind), in request order
pub fn detect_conflicts(
    strategies: &[StrategyId],
    tone: Tone,
    length: LengthSetting,
) -> Vec<StyleConflict> {
    let mut conflicts = Vec::new();
    for &strategy in strategies.iter().filter(|s| s.is_reasoning_heavy()) {
        let found = [
            (tone == Tone::Casual).then_some(ConflictKind::Tone(tone)),
            (length == LengthSetting::Short).then_some(ConflictKind::Length(length)),
        ];
        for kind in found.into_iter().flatten() {
            let conflict = StyleConflict { strategy, kind };
            if !conflicts.contains(&conflict) {
                conflicts.push(conflict);
            }
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_id_parse() {
        assert_eq!("v1_basic".parse::<StrategyId>().unwrap(), StrategyId::Basic);
        assert_eq!(
            " v5_context_aware ".parse::<StrategyId>().unwrap(),
            StrategyId::ContextAware
        );
        for id in StrategyId::ALL {
            assert_eq!(id.as_str().parse::<StrategyId>().unwrap(), id);
        }

        let err = "v9_magic".parse::<StrategyId>().unwrap_err();
        assert!(matches!(err, SummaryBenchError::UnknownStrategy(ref id) if id == "v9_magic"));
    }

    #[test]
    fn test_strategy_id_serializes_as_log_id() {
        let json = serde_json::to_string(&StrategyId::ChainOfThought).unwrap();
        assert_eq!(json, "\"v3_chain_of_thought\"");
    }

    #[test]
    fn test_registry_has_every_strategy_with_placeholder() {
        let registry = StrategyRegistry::new();
        assert_eq!(registry.all().len(), StrategyId::ALL.len());
        for strategy in registry.all() {
            assert_eq!(strategy.template.matches(TEXT_PLACEHOLDER).count(), 1, "{}", strategy.id);
            assert_eq!(&strategy.id.as_str()[..2], strategy.version);
        }
    }

    #[test]
    fn test_template_lookup() {
        let registry = StrategyRegistry::new();
        assert!(registry
            .template_for("v1_basic")
            .unwrap()
            .starts_with("Summarize the following text concisely:"));

        let err = registry.template_for("basic").unwrap_err();
        assert!(matches!(err, SummaryBenchError::UnknownStrategy(_)));
    }

    #[test]
    fn test_render_substitutes_text() {
        let registry = StrategyRegistry::new();
        let prompt = registry.render("v4_structured", "Sales rose 4%.").unwrap();
        assert!(prompt.contains("Text:\nSales rose 4%.\n"));
        assert!(!prompt.contains(TEXT_PLACEHOLDER));
    }

    #[test]
    fn test_display_name() {
        let registry = StrategyRegistry::new();
        assert_eq!(registry.display_name("v2_role_based"), "Role-Based Prompt");
        assert_eq!(registry.display_name("v7_custom"), "v7_custom");
    }

    #[test]
    fn test_style_instruction() {
        let block = style_instruction(Tone::Academic, LengthSetting::Short);
        assert!(block.starts_with("\n\nCRITICAL STYLE INSTRUCTION:\n1. TONE: The writing style MUST be formal"));
        assert!(block.contains("\n2. LENGTH: The summary length must be extremely concise"));
        assert!(block.ends_with('\n'));
    }

    #[test]
    fn test_no_conflicts_for_plain_strategies() {
        let conflicts = detect_conflicts(
            &[StrategyId::Basic, StrategyId::Structured],
            Tone::Casual,
            LengthSetting::Short,
        );
        assert!(conflicts.is_empty());

        let conflicts = detect_conflicts(&StrategyId::ALL, Tone::Neutral, LengthSetting::Medium);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_conflicts_reported_per_strategy_and_kind() {
        let conflicts = detect_conflicts(
            &[StrategyId::Basic, StrategyId::ChainOfThought, StrategyId::RoleBased],
            Tone::Casual,
            LengthSetting::Short,
        );
        assert_eq!(
            conflicts,
            vec![
                StyleConflict { strategy: StrategyId::ChainOfThought, kind: ConflictKind::Tone(Tone::Casual) },
                StyleConflict { strategy: StrategyId::ChainOfThought, kind: ConflictKind::Length(LengthSetting::Short) },
                StyleConflict { strategy: StrategyId::RoleBased, kind: ConflictKind::Tone(Tone::Casual) },
                StyleConflict { strategy: StrategyId::RoleBased, kind: ConflictKind::Length(LengthSetting::Short) },
            ]
        );
    }

    #[test]
    fn test_duplicate_strategies_report_once() {
        let conflicts = detect_conflicts(
            &[StrategyId::ContextAware, StrategyId::ContextAware],
            Tone::Academic,
            LengthSetting::Short,
        );
        assert_eq!(conflicts.len(), 1);
        assert_eq!(
            conflicts[0].to_string(),
            "v5_context_aware needs more detail than the Short length restriction allows"
        );
    }
}
