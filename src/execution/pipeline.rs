//! Provisioning pipeline - executes steps strictly in order

use crate::core::{
    PipelineResult, PipelineStatus, Step, StepLog, StepPolicy, StepResult,
};
use crate::persistence::LogSink;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events emitted during a pipeline run
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    PipelineStarted {
        run_id: Uuid,
        plan_name: String,
        total_steps: usize,
    },
    StepStarted {
        step_name: String,
        policy: StepPolicy,
    },
    StepCompleted {
        step_name: String,
        message: Option<String>,
    },
    /// A best-effort step failed; execution continues
    StepWarned {
        step_name: String,
        error: String,
    },
    /// A fatal step failed; execution stops
    StepFailed {
        step_name: String,
        error: String,
    },
    PipelineCompleted {
        run_id: Uuid,
        status: PipelineStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Box<dyn Fn(&PipelineEvent) + Send + Sync>;

/// Executes an ordered list of steps, enforcing policy per step
///
/// Strictly sequential: later steps assume the filesystem and package
/// database state left by earlier ones. The pipeline performs no I/O of
/// its own beyond flushing each result through the configured sink.
pub struct ProvisioningPipeline {
    run_id: Uuid,
    plan_name: String,
    sink: Option<Arc<dyn LogSink>>,
    handlers: Vec<EventHandler>,
}

impl ProvisioningPipeline {
    pub fn new(plan_name: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            plan_name: plan_name.into(),
            sink: None,
            handlers: Vec::new(),
        }
    }

    /// Flush every step result through the given sink as it is produced
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    fn emit(&self, event: PipelineEvent) {
        for handler in &self.handlers {
            handler(&event);
        }
    }

    async fn record(&self, log: &mut StepLog, result: StepResult) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.append(&result).await {
                warn!("failed to persist step result: {}", e);
            }
        }
        log.append(result);
    }

    /// Execute the steps in order
    ///
    /// A fatal failure aborts immediately; no later step runs. Best-effort
    /// failures are recorded and execution visibly proceeds.
    pub async fn run(&self, steps: Vec<Step>) -> PipelineResult {
        info!(
            "starting provisioning run {} ({}, {} steps)",
            self.run_id,
            self.plan_name,
            steps.len()
        );
        self.emit(PipelineEvent::PipelineStarted {
            run_id: self.run_id,
            plan_name: self.plan_name.clone(),
            total_steps: steps.len(),
        });

        let mut log = StepLog::new();

        for step in steps {
            self.emit(PipelineEvent::StepStarted {
                step_name: step.name.clone(),
                policy: step.policy,
            });

            match step.action.run().await {
                Ok(message) => {
                    info!("step '{}' succeeded", step.name);
                    self.record(&mut log, StepResult::success(&step.name, message.clone()))
                        .await;
                    self.emit(PipelineEvent::StepCompleted {
                        step_name: step.name.clone(),
                        message,
                    });
                }
                Err(e) => {
                    let error = e.to_string();
                    self.record(&mut log, StepResult::failure(&step.name, &error))
                        .await;

                    match step.policy {
                        StepPolicy::Fatal => {
                            error!("fatal step '{}' failed: {}", step.name, error);
                            self.emit(PipelineEvent::StepFailed {
                                step_name: step.name.clone(),
                                error,
                            });
                            self.emit(PipelineEvent::PipelineCompleted {
                                run_id: self.run_id,
                                status: PipelineStatus::Aborted,
                            });
                            return PipelineResult {
                                status: PipelineStatus::Aborted,
                                failed_step: Some(step.name),
                                log,
                            };
                        }
                        StepPolicy::BestEffort => {
                            warn!(
                                "best-effort step '{}' failed, continuing: {}",
                                step.name, error
                            );
                            self.emit(PipelineEvent::StepWarned {
                                step_name: step.name.clone(),
                                error,
                            });
                        }
                    }
                }
            }
        }

        info!("provisioning run {} completed", self.run_id);
        self.emit(PipelineEvent::PipelineCompleted {
            run_id: self.run_id,
            status: PipelineStatus::Completed,
        });
        PipelineResult {
            status: PipelineStatus::Completed,
            failed_step: None,
            log,
        }
    }
}
