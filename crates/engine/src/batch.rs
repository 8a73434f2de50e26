//! Concurrent execution of many elements.

use std::sync::Arc;
use std::time::Duration;

use dtr_core::VisitableElement;
use dtr_rule::{RuleEvent, RuleTask};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::engine::RuleEngine;
use crate::error::EngineError;
use crate::report::ExecutionReport;

impl RuleEngine {
    /// Execute `task` against every element concurrently.
    ///
    /// Invocations run on blocking worker threads, at most
    /// [`max_parallel`](crate::EngineConfig::max_parallel) at once. Results are
    /// returned in input order.
    pub async fn execute_batch(
        self: &Arc<Self>,
        task: RuleTask,
        elements: Vec<VisitableElement>,
        event: Option<RuleEvent>,
    ) -> Vec<Result<ExecutionReport, EngineError>> {
        self.execute_batch_with_cancellation(task, elements, event, &CancellationToken::new())
            .await
    }

    /// Like [`execute_batch`](Self::execute_batch), under a parent token.
    ///
    /// Each element gets a child of `cancel`; cancelling the parent stops
    /// every invocation at its next rule boundary. Elements that had not
    /// started yet report [`EngineError::Cancelled`].
    pub async fn execute_batch_with_cancellation(
        self: &Arc<Self>,
        task: RuleTask,
        elements: Vec<VisitableElement>,
        event: Option<RuleEvent>,
        cancel: &CancellationToken,
    ) -> Vec<Result<ExecutionReport, EngineError>> {
        let total = elements.len();
        let semaphore = Arc::new(Semaphore::new(self.config().max_parallel.max(1)));
        tracing::debug!(
            task = %task,
            elements = total,
            max_parallel = self.config().max_parallel,
            "starting batch"
        );

        let mut join_set = JoinSet::new();
        for (index, element) in elements.into_iter().enumerate() {
            let job = ElementJob {
                engine: Arc::clone(self),
                semaphore: Arc::clone(&semaphore),
                cancel: cancel.child_token(),
                timeout: self.config().timeout,
                task,
                event,
                element,
            };
            join_set.spawn(async move { (index, job.run().await) });
        }

        let mut results: Vec<Option<Result<ExecutionReport, EngineError>>> =
            (0..total).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(join_err) => tracing::error!(?join_err, "batch task panicked"),
            }
        }

        results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(EngineError::TaskPanicked("batch task did not report".to_owned()))
                })
            })
            .collect()
    }
}

/// Everything one batch element needs on its worker.
struct ElementJob {
    engine: Arc<RuleEngine>,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
    timeout: Option<Duration>,
    task: RuleTask,
    event: Option<RuleEvent>,
    element: VisitableElement,
}

impl ElementJob {
    /// Acquire a permit, arm the timeout, run the invocation off the runtime.
    async fn run(self) -> Result<ExecutionReport, EngineError> {
        let Self {
            engine,
            semaphore,
            cancel,
            timeout,
            task,
            event,
            element,
        } = self;

        let _permit = semaphore
            .acquire_owned()
            .await
            .map_err(|_| EngineError::Cancelled)?;

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let watchdog = timeout.map(|limit| {
            let cancel = cancel.clone();
            let element_id = element.id().to_owned();
            tokio::spawn(async move {
                tokio::select! {
                    () = tokio::time::sleep(limit) => {
                        tracing::info!(?limit, element = %element_id, "element timed out");
                        cancel.cancel();
                    }
                    () = cancel.cancelled() => {}
                }
            })
        });

        let result = tokio::task::spawn_blocking(move || {
            engine.execute_with_cancellation(task, &element, event, &cancel)
        })
        .await
        .map_err(|join_err| EngineError::TaskPanicked(join_err.to_string()));

        if let Some(watchdog) = watchdog {
            watchdog.abort();
        }
        result
    }
}
