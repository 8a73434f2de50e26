//! Batch execution over the tokio runtime.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dtr_core::{ElementKind, Operation, RuleId, VisitableElement};
use dtr_engine::{EngineConfig, EngineError, InvocationStatus, RuleEngine};
use dtr_rule::{FnRule, RuleContext, RuleDeclaration, RuleOutput, RuleRegistry, RuleTask};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

fn operations(count: usize) -> Vec<VisitableElement> {
    (0..count)
        .map(|i| Operation::new(format!("op-{i}"), format!("operation {i}")).into())
        .collect()
}

/// One rule that echoes the element id.
fn echo_engine(config: EngineConfig) -> Arc<RuleEngine> {
    let mut registry = RuleRegistry::new();
    registry.register(
        RuleDeclaration::new("echo")
            .unwrap()
            .applies_to([ElementKind::Operation]),
        FnRule::new(|ctx: &RuleContext<'_>| Ok(RuleOutput::info(ctx.element.id().to_owned()))),
    );
    Arc::new(RuleEngine::bootstrap(registry, config).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn results_keep_input_order() {
    let engine = echo_engine(EngineConfig::default());
    let results = engine
        .execute_batch(RuleTask::Validate, operations(20), None)
        .await;

    assert_eq!(results.len(), 20);
    for (i, result) in results.iter().enumerate() {
        let report = result.as_ref().unwrap();
        assert_eq!(report.status, InvocationStatus::Done);
        assert_eq!(report.output.messages()[0].text, format!("op-{i}"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrency_is_bounded() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let (running_in, peak_in) = (Arc::clone(&running), Arc::clone(&peak));

    let mut registry = RuleRegistry::new();
    registry.register(
        RuleDeclaration::new("slow")
            .unwrap()
            .applies_to([ElementKind::Operation]),
        FnRule::new(move |_: &RuleContext<'_>| {
            let now = running_in.fetch_add(1, Ordering::SeqCst) + 1;
            peak_in.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            running_in.fetch_sub(1, Ordering::SeqCst);
            Ok(RuleOutput::empty())
        }),
    );
    let engine = Arc::new(
        RuleEngine::bootstrap(registry, EngineConfig::default().with_max_parallel(2)).unwrap(),
    );

    let results = engine
        .execute_batch(RuleTask::Validate, operations(8), None)
        .await;
    assert!(results.iter().all(Result::is_ok));
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(running.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn timeout_cancels_between_rules() {
    let mut registry = RuleRegistry::new();
    registry
        .register(
            RuleDeclaration::new("slow")
                .unwrap()
                .applies_to([ElementKind::Operation]),
            FnRule::new(|_: &RuleContext<'_>| {
                std::thread::sleep(Duration::from_millis(200));
                Ok(RuleOutput::info("slow done"))
            }),
        )
        .register(
            RuleDeclaration::new("never")
                .unwrap()
                .applies_to([ElementKind::Operation])
                .depends_on([RuleId::new("slow").unwrap()]),
            FnRule::new(|_: &RuleContext<'_>| Ok(RuleOutput::info("never"))),
        );
    let config = EngineConfig::default().with_timeout(Duration::from_millis(50));
    let engine = Arc::new(RuleEngine::bootstrap(registry, config).unwrap());

    let results = engine
        .execute_batch(RuleTask::Validate, operations(1), None)
        .await;
    let report = results.into_iter().next().unwrap().unwrap();
    assert!(report.was_cancelled());
    let texts: Vec<&str> = report.output.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["slow done"]);
}

#[tokio::test]
async fn cancelled_parent_rejects_every_element() {
    let engine = echo_engine(EngineConfig::default());
    let parent = CancellationToken::new();
    parent.cancel();

    let results = engine
        .execute_batch_with_cancellation(RuleTask::Validate, operations(3), None, &parent)
        .await;
    assert_eq!(results.len(), 3);
    assert!(results
        .iter()
        .all(|result| matches!(result, Err(EngineError::Cancelled))));
}

#[tokio::test]
async fn empty_batch() {
    let engine = echo_engine(EngineConfig::default());
    let results = engine
        .execute_batch(RuleTask::Validate, Vec::new(), None)
        .await;
    assert!(results.is_empty());
}
