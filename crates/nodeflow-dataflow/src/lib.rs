//! Reference dataflow modelling the Data → Prompt → LLM → $ pipeline.
//!
//! Each node's name is its output and its parameters are its dependencies:
//!
//! | node | depends on |
//! |---|---|
//! | `pace_of_development` | |
//! | `prompt_template` | `idea`, `domain_data`, `pace_of_development` |
//! | `llm_prompt` | `prompt_template`, `edge_cases` |
//! | `llm_response` | `llm_prompt`, `llm_client` |
//! | `prompt_token_estimate` | `llm_prompt`, `edge_cases` |
//! | `business_value` | `llm_response`, `pace_of_development` |
//! | `cost_estimate` | `prompt_token_estimate`, `pricing_policy` |

pub mod llm_client;
pub mod nodes;

use std::sync::Arc;

use serde_json::json;

use nodeflow_core::types::Arguments;
use nodeflow_core::ComputeResult;
use nodeflow_engine::{FnNode, Module, ModuleCatalog};

pub use llm_client::{LlmClient, MockLlmClient};
pub use nodes::{
    BusinessValue, DomainData, PaceOfDevelopment, PricingPolicy, DATAFLOW_LABEL,
};

/// Identifier of this module in the catalog.
pub const MODULE_NAME: &str = "dataflow";

/// The dataflow module; `llm_response` takes a mock client spec as the
/// `llm_client` input.
pub fn module() -> Module {
    base_module()
        .with(
            FnNode::new("llm_response", ["llm_prompt", "llm_client"], |args| {
                let client: MockLlmClient = args.deserialize("llm_client")?;
                Ok(json!(client.complete(args.str("llm_prompt")?)?))
            })
            .with_description("Completion of the prompt by the mock client given as input"),
        )
}

/// The dataflow module with `llm_response` bound to `client`.
pub fn module_with_client(client: Arc<dyn LlmClient>) -> Module {
    base_module().with(
        FnNode::new("llm_response", ["llm_prompt"], move |args| {
            Ok(json!(client.complete(args.str("llm_prompt")?)?))
        })
        .with_description("Completion of the prompt by the bound client"),
    )
}

/// Catalog exposing [`module`] as `dataflow`.
pub fn catalog() -> ModuleCatalog {
    ModuleCatalog::new().with(MODULE_NAME, module)
}

fn base_module() -> Module {
    Module::new(MODULE_NAME)
        .with(
            FnNode::source("pace_of_development", |_| {
                Ok(serde_json::to_value(PaceOfDevelopment::canonical())?)
            })
            .with_description("Phases of traditional ML versus LLM app development"),
        )
        .with(
            FnNode::new(
                "prompt_template",
                ["idea", "domain_data", "pace_of_development"],
                prompt_template,
            )
            .with_description("Template contrasting both paces"),
        )
        .with(
            FnNode::new("llm_prompt", ["prompt_template", "edge_cases"], llm_prompt)
                .with_description("Template plus edge case guardrails"),
        )
        .with(
            FnNode::new(
                "prompt_token_estimate",
                ["llm_prompt", "edge_cases"],
                prompt_token_estimate,
            )
            .with_description("Token count estimate with edge case allowance"),
        )
        .with(
            FnNode::new(
                "business_value",
                ["llm_response", "pace_of_development"],
                business_value,
            )
            .with_description("LLM plan packaged with pace context"),
        )
        .with(
            FnNode::new(
                "cost_estimate",
                ["prompt_token_estimate", "pricing_policy"],
                cost_estimate,
            )
            .with_description("Expected spend at the pricing policy's rate"),
        )
}

fn prompt_template(args: &Arguments) -> ComputeResult {
    let domain: DomainData = args.deserialize("domain_data")?;
    let pace: PaceOfDevelopment = args.deserialize("pace_of_development")?;
    Ok(json!(nodes::prompt_template(args.str("idea")?, &domain, &pace)))
}

fn llm_prompt(args: &Arguments) -> ComputeResult {
    let edge_cases: Vec<String> = args.deserialize("edge_cases")?;
    Ok(json!(nodes::llm_prompt(args.str("prompt_template")?, &edge_cases)))
}

fn prompt_token_estimate(args: &Arguments) -> ComputeResult {
    let edge_cases: Vec<String> = args.deserialize("edge_cases")?;
    Ok(json!(nodes::prompt_token_estimate(
        args.str("llm_prompt")?,
        &edge_cases
    )))
}

fn business_value(args: &Arguments) -> ComputeResult {
    let pace: PaceOfDevelopment = args.deserialize("pace_of_development")?;
    let value = nodes::business_value(args.str("llm_response")?, pace);
    Ok(serde_json::to_value(value)?)
}

fn cost_estimate(args: &Arguments) -> ComputeResult {
    let policy: PricingPolicy = args.deserialize("pricing_policy")?;
    Ok(json!(nodes::cost_estimate(
        args.f64("prompt_token_estimate")?,
        &policy
    )))
}
