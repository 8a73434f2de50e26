//! Single-element execution: ordering, error handlers, events, panics and
//! cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dtr_core::{AtomicDataType, ElementKind, PrimitiveType, RuleId, TypeProfile, VisitableElement};
use dtr_engine::{EngineConfig, InvocationStatus, JournalEntry, RuleEngine, RuleOutcome};
use dtr_rule::{
    ExecutionError, FnRule, Rule, RuleContext, RuleDeclaration, RuleEvent, RuleOutput, RuleRegistry,
    RuleTask, Severity,
};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

fn id(s: &str) -> RuleId {
    RuleId::new(s).unwrap()
}

fn declare(name: &str, kind: ElementKind) -> RuleDeclaration {
    RuleDeclaration::new(name).unwrap().applies_to([kind])
}

fn says(text: &'static str) -> impl Rule {
    FnRule::new(move |_: &RuleContext<'_>| Ok(RuleOutput::info(text)))
}

fn profile(name: &str) -> VisitableElement {
    TypeProfile::new("profile-1", name).into()
}

fn texts(output: &RuleOutput) -> Vec<&str> {
    output.iter().map(|m| m.text.as_str()).collect()
}

/// `check` faults on elements named "bad"; `fallback` handles it; `after`
/// depends on `check`.
fn engine_with_handler() -> RuleEngine {
    let mut registry = RuleRegistry::new();
    registry
        .register(
            declare("check", ElementKind::TypeProfile).on_error([id("fallback")]),
            FnRule::new(|ctx: &RuleContext<'_>| {
                if ctx.element.name() == "bad" {
                    Err(ExecutionError::fault("cannot check"))
                } else {
                    Ok(RuleOutput::info("checked"))
                }
            }),
        )
        .register(declare("fallback", ElementKind::TypeProfile), says("fallback ran"))
        .register(
            declare("after", ElementKind::TypeProfile).depends_on([id("check")]),
            says("after ran"),
        );
    RuleEngine::bootstrap(registry, EngineConfig::default()).unwrap()
}

#[test]
fn handlers_do_not_run_without_a_fault() {
    let engine = engine_with_handler();
    let output = engine.execute(RuleTask::Validate, &profile("good"), None);
    assert_eq!(texts(&output), vec!["checked", "after ran"]);
    assert!(!output.has_errors());
}

#[test]
fn fault_runs_handlers_and_chain_continues() {
    let engine = engine_with_handler();
    let report = engine.execute_with_cancellation(
        RuleTask::Validate,
        &profile("bad"),
        None,
        &CancellationToken::new(),
    );

    assert_eq!(report.status, InvocationStatus::Done);
    assert_eq!(
        texts(&report.output),
        vec!["rule check failed: cannot check", "fallback ran", "after ran"]
    );
    assert_eq!(report.output.messages()[0].severity, Severity::Error);
    assert_eq!(report.output.messages()[0].rule, Some(id("check")));
    assert_eq!(report.output.messages()[1].rule, Some(id("fallback")));
    assert_eq!(report.failed_rules(), vec![&id("check")]);
    assert_eq!(report.handlers_run(), vec![&id("fallback")]);
    assert_eq!(report.executed_rules(), vec![&id("check"), &id("after")]);
}

#[test]
fn supertype_rule_runs_once_per_invocation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut registry = RuleRegistry::new();
    registry
        .register(
            RuleDeclaration::new("shared")
                .unwrap()
                .applies_to([ElementKind::Element, ElementKind::DataType, ElementKind::TypeProfile]),
            FnRule::new(move |_: &RuleContext<'_>| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(RuleOutput::empty())
            }),
        )
        .register(declare("specific", ElementKind::TypeProfile), says("specific"));
    let engine = RuleEngine::bootstrap(registry, EngineConfig::default()).unwrap();

    let output = engine.execute(RuleTask::Validate, &profile("p"), None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(texts(&output), vec!["specific"]);
}

#[test]
fn event_filtering() {
    let mut registry = RuleRegistry::new();
    registry
        .register(declare("always", ElementKind::AtomicDataType), says("always"))
        .register(
            declare("on-delete", ElementKind::AtomicDataType).on_events([RuleEvent::OnDelete]),
            says("deleting"),
        );
    let engine = RuleEngine::bootstrap(registry, EngineConfig::default()).unwrap();
    let element: VisitableElement = AtomicDataType::new("t", "T", PrimitiveType::String).into();

    let none = engine.execute(RuleTask::Validate, &element, None);
    assert_eq!(texts(&none), vec!["always"]);

    let create = engine.execute(RuleTask::Validate, &element, Some(RuleEvent::OnCreate));
    assert_eq!(texts(&create), vec!["always"]);

    let delete = engine.execute(RuleTask::Validate, &element, Some(RuleEvent::OnDelete));
    assert_eq!(texts(&delete), vec!["always", "deleting"]);

    let report = engine.execute_with_cancellation(
        RuleTask::Validate,
        &element,
        Some(RuleEvent::OnUpdate),
        &CancellationToken::new(),
    );
    assert!(report.journal.iter().any(|entry| matches!(
        entry,
        JournalEntry::RuleSkipped { rule, .. } if rule == "on-delete"
    )));
}

#[test]
fn task_selects_rules() {
    let mut registry = RuleRegistry::new();
    registry
        .register(declare("validate-only", ElementKind::TypeProfile), says("v"))
        .register(
            declare("optimize-only", ElementKind::TypeProfile).tasks([RuleTask::Optimize]),
            says("o"),
        );
    let engine = RuleEngine::bootstrap(registry, EngineConfig::default()).unwrap();

    assert_eq!(texts(&engine.execute(RuleTask::Validate, &profile("p"), None)), vec!["v"]);
    assert_eq!(texts(&engine.execute(RuleTask::Optimize, &profile("p"), None)), vec!["o"]);
    assert!(engine.execute(RuleTask::Consume, &profile("p"), None).is_empty());
}

#[test]
fn panicking_rule_is_contained() {
    let mut registry = RuleRegistry::new();
    registry
        .register(
            declare("explodes", ElementKind::TypeProfile),
            FnRule::new(|_: &RuleContext<'_>| -> Result<RuleOutput, ExecutionError> {
                panic!("boom")
            }),
        )
        .register(
            declare("survivor", ElementKind::TypeProfile).depends_on([id("explodes")]),
            says("still here"),
        );
    let engine = RuleEngine::bootstrap(registry, EngineConfig::default()).unwrap();

    let output = engine.execute(RuleTask::Validate, &profile("p"), None);
    assert_eq!(
        texts(&output),
        vec!["rule explodes failed: rule panicked: boom", "still here"]
    );
}

#[test]
fn panics_propagate_when_not_caught() {
    let mut registry = RuleRegistry::new();
    registry.register(
        declare("explodes", ElementKind::TypeProfile),
        FnRule::new(|_: &RuleContext<'_>| -> Result<RuleOutput, ExecutionError> {
            panic!("boom")
        }),
    );
    let engine = RuleEngine::bootstrap(registry, EngineConfig::default().with_catch_panics(false))
        .unwrap();

    let element = profile("p");
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        engine.execute(RuleTask::Validate, &element, None)
    }));
    assert!(result.is_err());
}

#[test]
fn handler_fault_does_not_chain() {
    let mut registry = RuleRegistry::new();
    registry
        .register(
            declare("main", ElementKind::TypeProfile).on_error([id("handler")]),
            FnRule::new(|_: &RuleContext<'_>| Err(ExecutionError::fault("main broke"))),
        )
        .register(
            declare("handler", ElementKind::TypeProfile).on_error([id("second")]),
            FnRule::new(|_: &RuleContext<'_>| Err(ExecutionError::fault("handler broke"))),
        )
        .register(declare("second", ElementKind::TypeProfile), says("second"));
    let engine = RuleEngine::bootstrap(registry, EngineConfig::default()).unwrap();

    let report = engine.execute_with_cancellation(
        RuleTask::Validate,
        &profile("p"),
        None,
        &CancellationToken::new(),
    );
    assert_eq!(report.handlers_run(), vec![&id("handler")]);
    assert_eq!(
        texts(&report.output),
        vec!["rule main failed: main broke", "rule handler failed: handler broke"]
    );
    assert_eq!(report.output.count(Severity::Error), 2);
}

#[test]
fn cancellation_between_rules_keeps_partial_output() {
    let token = CancellationToken::new();
    let trigger = token.clone();

    let mut registry = RuleRegistry::new();
    registry
        .register(
            declare("first", ElementKind::TypeProfile),
            FnRule::new(move |_: &RuleContext<'_>| {
                trigger.cancel();
                Ok(RuleOutput::info("first"))
            }),
        )
        .register(
            declare("second", ElementKind::TypeProfile).depends_on([id("first")]),
            says("second"),
        )
        .register(
            declare("third", ElementKind::TypeProfile).depends_on([id("second")]),
            says("third"),
        );
    let engine = RuleEngine::bootstrap(registry, EngineConfig::default()).unwrap();

    let report = engine.execute_with_cancellation(RuleTask::Validate, &profile("p"), None, &token);
    assert!(report.was_cancelled());
    assert_eq!(texts(&report.output), vec!["first"]);
    assert!(report.journal.iter().any(|entry| matches!(
        entry,
        JournalEntry::Cancelled { remaining: 2, .. }
    )));
}

#[test]
fn cancellation_during_fault_stops_pending_handlers() {
    let token = CancellationToken::new();
    let trigger = token.clone();

    let mut registry = RuleRegistry::new();
    registry
        .register(
            declare("main", ElementKind::TypeProfile)
                .on_error([id("first-handler"), id("second-handler")]),
            FnRule::new(move |_: &RuleContext<'_>| {
                trigger.cancel();
                Err(ExecutionError::fault("main broke"))
            }),
        )
        .register(declare("first-handler", ElementKind::TypeProfile), says("first handler"))
        .register(declare("second-handler", ElementKind::TypeProfile), says("second handler"));
    let engine = RuleEngine::bootstrap(registry, EngineConfig::default()).unwrap();

    let report = engine.execute_with_cancellation(RuleTask::Validate, &profile("p"), None, &token);
    assert!(report.was_cancelled());
    assert!(report.handlers_run().is_empty());
    assert_eq!(texts(&report.output), vec!["rule main failed: main broke"]);
    assert!(report.journal.iter().any(|entry| matches!(
        entry,
        JournalEntry::Cancelled { remaining: 2, .. }
    )));
}

#[test]
fn already_cancelled_token_runs_nothing() {
    let engine = engine_with_handler();
    let token = CancellationToken::new();
    token.cancel();

    let report = engine.execute_with_cancellation(RuleTask::Validate, &profile("p"), None, &token);
    assert_eq!(report.status, InvocationStatus::Cancelled);
    assert!(report.output.is_empty());
    assert!(report.executed_rules().is_empty());
}

#[test]
fn repeated_invocations_are_identical() {
    let engine = engine_with_handler();
    let first = engine.execute(RuleTask::Validate, &profile("bad"), None);
    let second = engine.execute(RuleTask::Validate, &profile("bad"), None);
    assert_eq!(first, second);
}

#[test]
fn element_without_rules_yields_empty_output() {
    let engine = engine_with_handler();
    let element: VisitableElement = AtomicDataType::new("t", "T", PrimitiveType::Integer).into();
    assert!(engine.execute(RuleTask::Validate, &element, None).is_empty());
}

#[test]
fn rule_outcomes_cover_primary_rules() {
    let engine = engine_with_handler();

    let bad = engine.execute_with_cancellation(
        RuleTask::Validate,
        &profile("bad"),
        None,
        &CancellationToken::new(),
    );
    assert_eq!(
        bad.rule_outcomes(),
        vec![(&id("check"), RuleOutcome::Failed), (&id("after"), RuleOutcome::Succeeded)]
    );

    let good = engine.execute_with_cancellation(
        RuleTask::Validate,
        &profile("good"),
        None,
        &CancellationToken::new(),
    );
    assert_eq!(
        good.rule_outcomes(),
        vec![(&id("check"), RuleOutcome::Succeeded), (&id("after"), RuleOutcome::Succeeded)]
    );
}

#[test]
fn ineligible_rule_outcome_is_skipped() {
    let mut registry = RuleRegistry::new();
    registry.register(
        declare("on-delete", ElementKind::TypeProfile).on_events([RuleEvent::OnDelete]),
        says("deleting"),
    );
    let engine = RuleEngine::bootstrap(registry, EngineConfig::default()).unwrap();

    let report = engine.execute_with_cancellation(
        RuleTask::Validate,
        &profile("p"),
        Some(RuleEvent::OnCreate),
        &CancellationToken::new(),
    );
    assert_eq!(report.rule_outcomes(), vec![(&id("on-delete"), RuleOutcome::Skipped)]);
}
