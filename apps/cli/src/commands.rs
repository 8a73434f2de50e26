//! Subcommand implementations. Every command writes JSON to stdout.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use dtr_core::{ElementKind, RuleId, VisitableElement};
use dtr_engine::{EngineConfig, EngineError, InvocationStatus, RuleEngine};
use dtr_rule::{RuleEvent, RuleOutput, RuleTask};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Build the engine over the built-in rules; any configuration problem
/// aborts before work starts.
pub fn engine(config: EngineConfig) -> anyhow::Result<Arc<RuleEngine>> {
    let registry = dtr_rules::builtin_registry().context("invalid built-in rule name")?;
    let engine = RuleEngine::bootstrap(registry, config).context("rule configuration is invalid")?;
    tracing::info!(
        rules = engine.rules().len(),
        edges = engine.graph().edge_count(),
        "rule engine ready"
    );
    Ok(Arc::new(engine))
}

pub fn graph(engine: &RuleEngine, task: Option<RuleTask>) -> anyhow::Result<String> {
    let Some(task) = task else {
        return Ok(serde_json::to_string_pretty(engine.graph())?);
    };

    let orders: BTreeMap<ElementKind, &[RuleId]> = engine
        .graph()
        .entries()
        .filter(|(entry_task, _, _)| *entry_task == task)
        .map(|(_, kind, order)| (kind, order))
        .collect();
    Ok(serde_json::to_string_pretty(&orders)?)
}

pub fn rules(engine: &RuleEngine) -> anyhow::Result<String> {
    let declarations: Vec<_> = engine.rules().declarations().collect();
    Ok(serde_json::to_string_pretty(&declarations)?)
}

/// Result for one element of a `run`.
#[derive(Debug, Serialize)]
pub struct ElementReport {
    pub element: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvocationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<RuleOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ElementReport {
    /// Whether the element failed validation or could not be processed.
    pub fn failed(&self) -> bool {
        self.error.is_some() || self.output.as_ref().is_some_and(RuleOutput::has_errors)
    }
}

/// Input holding either one element or many.
#[derive(Debug)]
pub enum Input {
    Single(VisitableElement),
    Many(Vec<VisitableElement>),
}

impl Input {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        if value.is_array() {
            let elements = serde_json::from_value(value)
                .with_context(|| format!("{} does not hold an array of elements", path.display()))?;
            Ok(Self::Many(elements))
        } else {
            let element = serde_json::from_value(value)
                .with_context(|| format!("{} does not hold an element", path.display()))?;
            Ok(Self::Single(element))
        }
    }
}

/// Run `task` over the input; returns the JSON to print and whether any
/// element failed.
pub async fn run(
    engine: &Arc<RuleEngine>,
    input: Input,
    task: RuleTask,
    event: Option<RuleEvent>,
    cancel: &CancellationToken,
) -> anyhow::Result<(String, bool)> {
    let (elements, single) = match input {
        Input::Single(element) => (vec![element], true),
        Input::Many(elements) => (elements, false),
    };
    let ids: Vec<String> = elements.iter().map(|e| e.id().to_owned()).collect();

    let results = engine
        .execute_batch_with_cancellation(task, elements, event, cancel)
        .await;
    let reports: Vec<ElementReport> = ids
        .into_iter()
        .zip(results)
        .map(|(element, result)| report(element, result))
        .collect();

    let failed = reports.iter().any(ElementReport::failed);
    let json = match reports.as_slice() {
        [only] if single => serde_json::to_string_pretty(only)?,
        all => serde_json::to_string_pretty(all)?,
    };
    Ok((json, failed))
}

fn report(
    element: String,
    result: Result<dtr_engine::ExecutionReport, EngineError>,
) -> ElementReport {
    match result {
        Ok(report) => ElementReport {
            element,
            status: Some(report.status),
            output: Some(report.output),
            error: None,
        },
        Err(err) => ElementReport {
            element,
            status: None,
            output: None,
            error: Some(err.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_detection() {
        let clean = ElementReport {
            element: "a".into(),
            status: Some(InvocationStatus::Done),
            output: Some(RuleOutput::warning("careful")),
            error: None,
        };
        assert!(!clean.failed());

        let invalid = ElementReport {
            output: Some(RuleOutput::error("broken")),
            ..clean
        };
        assert!(invalid.failed());

        let unprocessed = report("b".into(), Err(EngineError::Cancelled));
        assert!(unprocessed.failed());
        assert!(unprocessed.status.is_none());
    }

    #[test]
    fn graph_for_one_task() {
        let engine = engine(EngineConfig::default()).unwrap();
        let json: Value = serde_json::from_str(&graph(&engine, Some(RuleTask::Optimize)).unwrap()).unwrap();
        assert_eq!(json["type_profile"], serde_json::json!(["profile.flatten-hint"]));
        assert!(json.get("atomic_data_type").is_none());
    }
}
