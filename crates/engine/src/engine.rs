//! Rule execution engine.
//!
//! Looks up the precomputed order for an element's kind, runs every
//! applicable rule in that order, and merges their outputs. A faulting rule
//! is contained: its fault becomes an error message, its error handlers run,
//! and the chain continues.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use dtr_core::{ElementKind, RuleId, VisitableElement};
use dtr_graph::{PrecomputedRuleGraph, build_graph};
use dtr_rule::{
    ExecutionError, RegisteredRule, Rule, RuleContext, RuleEvent, RuleOutput, RuleRegistry,
    RuleSet, RuleTask,
};
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::invocation::Invocation;
use crate::report::ExecutionReport;

/// Runs rules against elements.
///
/// Holds the rule set and graph behind `Arc`s with no interior mutability,
/// so one engine serves any number of concurrent invocations.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Arc<RuleSet>,
    graph: Arc<PrecomputedRuleGraph>,
    config: EngineConfig,
}

impl RuleEngine {
    /// Create an engine from an already built graph.
    ///
    /// Fails if the graph names a rule the set has no body for.
    pub fn new(
        rules: Arc<RuleSet>,
        graph: Arc<PrecomputedRuleGraph>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        if let Some(missing) = graph.rule_ids().into_iter().find(|id| !rules.contains(id.as_str())) {
            return Err(EngineError::MissingRuleBody(missing.clone()));
        }
        Ok(Self {
            rules,
            graph,
            config,
        })
    }

    /// Finalize `registry`, build its graph, and create the engine.
    ///
    /// The first failing step aborts; nothing is partially usable.
    pub fn bootstrap(registry: RuleRegistry, config: EngineConfig) -> Result<Self, EngineError> {
        let rules = registry.finalize()?;
        let graph = build_graph(&rules)?;
        Self::new(Arc::new(rules), Arc::new(graph), config)
    }

    /// The validated rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The precomputed graph.
    pub fn graph(&self) -> &PrecomputedRuleGraph {
        &self.graph
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rules that would run for an element of `kind`, before event filtering.
    pub fn plan(&self, task: RuleTask, kind: ElementKind) -> Vec<RuleId> {
        self.graph.resolve(task, kind)
    }

    /// Run every applicable rule and return the merged output.
    pub fn execute(
        &self,
        task: RuleTask,
        element: &VisitableElement,
        event: Option<RuleEvent>,
    ) -> RuleOutput {
        self.run(task, element, event, None).into_output()
    }

    /// Like [`execute`](Self::execute), checking `cancel` before each rule.
    ///
    /// A rule that already started always finishes. On cancellation the
    /// report carries the output produced so far.
    pub fn execute_with_cancellation(
        &self,
        task: RuleTask,
        element: &VisitableElement,
        event: Option<RuleEvent>,
        cancel: &CancellationToken,
    ) -> ExecutionReport {
        self.run(task, element, event, Some(cancel))
    }

    fn run(
        &self,
        task: RuleTask,
        element: &VisitableElement,
        event: Option<RuleEvent>,
        cancel: Option<&CancellationToken>,
    ) -> ExecutionReport {
        let kind = element.kind();
        let span = tracing::debug_span!("invocation", task = %task, kind = %kind, element = %element.id());
        let _enter = span.enter();

        let order = self.graph.resolve(task, kind);
        let mut invocation = Invocation::new();

        for (position, id) in order.iter().enumerate() {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                let remaining = order.len() - position;
                tracing::info!(remaining, "invocation cancelled");
                return invocation.cancel(remaining);
            }

            let Some(rule) = self.rules.get(id.as_str()) else {
                tracing::error!(rule = %id, "rule has no registered body");
                invocation.skip(id, "no registered body");
                continue;
            };

            if !rule.declaration().is_eligible(event) {
                tracing::trace!(rule = %id, "rule not eligible for event");
                invocation.skip(id, not_eligible_reason(event));
                continue;
            }

            tracing::debug!(rule = %id, "running rule");
            invocation.start(id);
            let result = self.apply(rule.body().as_ref(), &RuleContext {
                element,
                task,
                event,
                accumulated: invocation.output(),
            });

            match result {
                Ok(output) => invocation.succeed(id, output),
                Err(error) => {
                    tracing::warn!(rule = %id, %error, "rule faulted");
                    invocation.fail(id, &error);
                    let unrun =
                        self.run_handlers(rule, &mut invocation, element, task, event, cancel);
                    if unrun > 0 {
                        let remaining = order.len() - position - 1 + unrun;
                        tracing::info!(remaining, "invocation cancelled during error handling");
                        return invocation.cancel(remaining);
                    }
                }
            }
        }

        invocation.finish()
    }

    /// Run the error handlers of `failed` in their precomputed order.
    ///
    /// A faulting handler is recorded but never triggers handlers of its own.
    /// `cancel` is checked before each handler; returns how many handlers
    /// were left unrun because of it.
    fn run_handlers(
        &self,
        failed: &RegisteredRule,
        invocation: &mut Invocation,
        element: &VisitableElement,
        task: RuleTask,
        event: Option<RuleEvent>,
        cancel: Option<&CancellationToken>,
    ) -> usize {
        let failed_id = failed.id();
        let handlers = self.graph.handlers(failed_id.as_str());
        for (position, handler_id) in handlers.iter().enumerate() {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return handlers.len() - position;
            }

            let Some(handler) = self.rules.get(handler_id.as_str()) else {
                tracing::error!(rule = %handler_id, "error handler has no registered body");
                continue;
            };

            tracing::debug!(rule = %failed_id, handler = %handler_id, "running error handler");
            invocation.start_handler(failed_id, handler_id);
            let result = self.apply(handler.body().as_ref(), &RuleContext {
                element,
                task,
                event,
                accumulated: invocation.output(),
            });
            if let Err(error) = &result {
                tracing::warn!(rule = %failed_id, handler = %handler_id, %error, "error handler faulted");
            }
            invocation.finish_handler(failed_id, handler_id, result);
        }
        0
    }

    fn apply(&self, body: &dyn Rule, ctx: &RuleContext<'_>) -> Result<RuleOutput, ExecutionError> {
        if !self.config.catch_panics {
            return body.apply(ctx);
        }
        match panic::catch_unwind(AssertUnwindSafe(|| body.apply(ctx))) {
            Ok(result) => result,
            Err(payload) => Err(ExecutionError::Panicked(panic_message(&*payload))),
        }
    }
}

fn not_eligible_reason(event: Option<RuleEvent>) -> String {
    match event {
        Some(event) => format!("not eligible for {event}"),
        None => "restricted to specific events".to_owned(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
