//! Pure functions behind the dataflow nodes.

use serde::{Deserialize, Serialize};

pub const DATAFLOW_LABEL: &str = "Data → Prompt → LLM → $";

const MIN_PROMPT_TOKENS: u64 = 120;
const GUARDRAIL_TOKENS_PER_EDGE_CASE: u64 = 3;
const NEXT_STEP: &str = "Prototype with guarded prompts";

const SHARED_PHASES_HEAD: [&str; 3] = ["Idea & Data/Resources", "Design", "Development/Prototype"];
const SHARED_PHASES_TAIL: [&str; 3] = [
    "Getting to Production",
    "Operations",
    "Maintenance & Business Value",
];

/// Development phases of a traditional ML project versus an LLM application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaceOfDevelopment {
    pub traditional_ml: Vec<String>,
    pub llm_apps: Vec<String>,
}

impl PaceOfDevelopment {
    pub fn canonical() -> Self {
        let phases = |middle: &str| -> Vec<String> {
            SHARED_PHASES_HEAD
                .iter()
                .copied()
                .chain(std::iter::once(middle))
                .chain(SHARED_PHASES_TAIL.iter().copied())
                .map(String::from)
                .collect()
        };
        Self {
            traditional_ml: phases("Model Development"),
            llm_apps: phases("Prompt / Model Development"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainData {
    pub business_process: String,
    pub ui: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub price_per_1k_tokens: f64,
    #[serde(default = "default_safety_multiplier")]
    pub safety_multiplier: f64,
}

fn default_safety_multiplier() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessValue {
    pub llm_plan: String,
    pub pace: PaceOfDevelopment,
    pub next_step: String,
}

pub fn prompt_template(idea: &str, domain: &DomainData, pace: &PaceOfDevelopment) -> String {
    format!(
        "You are designing a Hamilton micro-orchestration experiment.\n\
         Traditional ML pace: {}.\n\
         LLM app pace: {}.\n\
         Explain how strong SWE practices (testing, modularity, reuse, portability)\n\
         keep the system resilient while iterating quickly.\n\
         Business domain: {} with UI {}.\n\
         Primary data assets: {}.\n\
         Goal: deliver {} using Hamilton declarative functions.\n",
        pace.traditional_ml.join(" → "),
        pace.llm_apps.join(" → "),
        domain.business_process,
        domain.ui,
        domain.data,
        idea,
    )
}

pub fn llm_prompt(template: &str, edge_cases: &[String]) -> String {
    format!(
        "{}Consider the following edge cases explicitly: {}.\n\
         Detail the pipeline as {}, highlighting how guardrails\n\
         prevent prompt injection and balance evaluation with GPU cost awareness.",
        template,
        edge_cases.join(", "),
        DATAFLOW_LABEL,
    )
}

/// Three quarters of the word count plus a fixed allowance per edge case,
/// never below 120.
pub fn prompt_token_estimate(prompt: &str, edge_cases: &[String]) -> u64 {
    let words = prompt.split_whitespace().count() as u64;
    let scaled = three_quarters_rounded(words);
    let guardrails = edge_cases.len() as u64 * GUARDRAIL_TOKENS_PER_EDGE_CASE;
    (scaled + guardrails).max(MIN_PROMPT_TOKENS)
}

// Exact .5 results round to the nearest even integer
fn three_quarters_rounded(words: u64) -> u64 {
    let quotient = words * 3 / 4;
    match words * 3 % 4 {
        3 => quotient + 1,
        2 if quotient % 2 == 1 => quotient + 1,
        _ => quotient,
    }
}

pub fn business_value(llm_response: &str, pace: PaceOfDevelopment) -> BusinessValue {
    BusinessValue {
        llm_plan: llm_response.to_string(),
        pace,
        next_step: NEXT_STEP.to_string(),
    }
}

/// Expected spend for `tokens`, rounded to six decimals.
pub fn cost_estimate(tokens: f64, policy: &PricingPolicy) -> f64 {
    let raw = tokens / 1000.0 * policy.price_per_1k_tokens * policy.safety_multiplier;
    // Binary rounding of the scaled value, half away from zero. Only exact
    // decimal ties can differ from a decimal half-even round.
    (raw * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> DomainData {
        DomainData {
            business_process: "regulatory audit".into(),
            ui: "browser extension".into(),
            data: "archived compliance tickets".into(),
        }
    }

    fn edge_cases() -> Vec<String> {
        [
            "Input state space",
            "Guard against prompt injection",
            "Domain expertise",
            "Evaluation",
            "Cost/GPUs",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_canonical_pace() {
        let pace = PaceOfDevelopment::canonical();
        assert_eq!(pace.traditional_ml.len(), 7);
        assert_eq!(pace.traditional_ml[3], "Model Development");
        assert_eq!(pace.llm_apps[3], "Prompt / Model Development");
        assert_eq!(pace.llm_apps[0], "Idea & Data/Resources");
        assert_eq!(pace.llm_apps[6], "Maintenance & Business Value");
        assert_eq!(pace.traditional_ml[..3], pace.llm_apps[..3]);
    }

    #[test]
    fn test_prompt_template_mentions_inputs() {
        let text = prompt_template("AI copilots", &domain(), &PaceOfDevelopment::canonical());
        assert!(text.contains("Traditional ML pace: Idea & Data/Resources → Design → "));
        assert!(text.contains("Business domain: regulatory audit with UI browser extension.\n"));
        assert!(text.contains("Primary data assets: archived compliance tickets.\n"));
        assert!(text.ends_with("Goal: deliver AI copilots using Hamilton declarative functions.\n"));
        assert!(text.contains("portability)\nkeep the system resilient"));
        assert_eq!(text.lines().count(), 8);
    }

    #[test]
    fn test_llm_prompt_appends_guardrails() {
        let prompt = llm_prompt("T\n", &["a".to_string(), "b".to_string()]);
        assert!(prompt.starts_with("T\nConsider the following edge cases explicitly: a, b.\n"));
        assert!(prompt.contains(DATAFLOW_LABEL));
    }

    #[test]
    fn test_token_estimate_floor() {
        let template = prompt_template(
            "AI copilots for compliance analysts",
            &domain(),
            &PaceOfDevelopment::canonical(),
        );
        let prompt = llm_prompt(&template, &edge_cases());
        assert_eq!(prompt.split_whitespace().count(), 139);
        assert_eq!(prompt_token_estimate(&prompt, &edge_cases()), 120);
    }

    #[test]
    fn test_token_estimate_above_floor() {
        let prompt = "word ".repeat(400);
        assert_eq!(prompt_token_estimate(&prompt, &[]), 300);
        assert_eq!(prompt_token_estimate(&prompt, &edge_cases()), 315);
    }

    #[test]
    fn test_three_quarters_rounding() {
        assert_eq!(three_quarters_rounded(2), 2); // 1.5
        assert_eq!(three_quarters_rounded(6), 4); // 4.5
        assert_eq!(three_quarters_rounded(5), 4); // 3.75
        assert_eq!(three_quarters_rounded(3), 2); // 2.25
    }

    #[test]
    fn test_cost_estimate() {
        let policy = PricingPolicy {
            price_per_1k_tokens: 0.4,
            safety_multiplier: 1.15,
        };
        assert!((cost_estimate(120.0, &policy) - 0.0552).abs() < 1e-12);

        let plain: PricingPolicy =
            serde_json::from_value(serde_json::json!({"price_per_1k_tokens": 0.5})).unwrap();
        assert_eq!(plain.safety_multiplier, 1.0);
        assert!((cost_estimate(2000.0, &plain) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cost_estimate_keeps_six_decimals() {
        let policy = PricingPolicy {
            price_per_1k_tokens: 0.0012345678,
            safety_multiplier: 1.0,
        };
        // 1.2345678e-6 -> 1e-6
        assert_eq!(cost_estimate(1.0, &policy), 0.000001);

        let policy = PricingPolicy {
            price_per_1k_tokens: 0.123456789,
            safety_multiplier: 1.0,
        };
        // 8.64197523e-4 -> 8.64e-4
        assert!((cost_estimate(7.0, &policy) - 0.000864).abs() < 1e-15);

        let policy = PricingPolicy {
            price_per_1k_tokens: 0.0000004,
            safety_multiplier: 1.0,
        };
        assert_eq!(cost_estimate(1000.0, &policy), 0.0);
    }

    #[test]
    fn test_business_value() {
        let value = business_value("plan", PaceOfDevelopment::canonical());
        assert_eq!(value.llm_plan, "plan");
        assert_eq!(value.next_step, "Prototype with guarded prompts");
    }
}
