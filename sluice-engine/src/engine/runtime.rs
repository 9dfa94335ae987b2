//! Simulation runtime - builds the registry, then runs systems and managers on scoped threads
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::thread::{Scope, ScopedJoinHandle};
use tracing::{debug, info, instrument, warn};

use sluice_config::{AmountSpec, SluiceConfig, SystemSpec, WorkerConfig};
use sluice_core::events::{EventQueue, SystemId};
use sluice_core::resource::{Resource, ResourceAmount, ResourceArray};
use sluice_telemetry::MetricsRecorder;

use super::event_processing::{EventProcessor, Reply, TransferProcessor};
use super::manager::Manager;
use super::report::{ManagerReport, QueueReport, Report, ResourceReport, SystemReport};
use super::system::{Jitter, RetryPolicy, System, SystemContext};
use super::EngineError;

/// Owns the resource registry and the run parameters.
///
/// Threads only exist inside [`run`](Self::run); they borrow the registry, so resources
/// outlive every event that points at them.
pub struct Simulation {
    registry: ResourceArray,
    systems: Vec<SystemSpec>,
    workers: WorkerConfig,
    metrics: MetricsRecorder,
    processor: Box<dyn EventProcessor>,
}

impl Simulation {
    /// Validates `config` and creates every resource it declares.
    pub fn from_config(config: &SluiceConfig, metrics: MetricsRecorder) -> Result<Self, EngineError> {
        config.check()?;

        let mut registry = ResourceArray::new();
        for spec in &config.resources {
            registry.add(Resource::create(&spec.name, spec.amount, spec.max_capacity)?)?;
        }
        debug!(
            resources = registry.len(),
            capacity = registry.capacity(),
            "registry built"
        );

        Ok(Self {
            registry,
            systems: config.systems.clone(),
            workers: config.workers.clone(),
            metrics,
            processor: Box::new(TransferProcessor),
        })
    }

    /// Replaces the default transfer policy.
    pub fn with_processor(mut self, processor: impl EventProcessor + 'static) -> Self {
        self.processor = Box::new(processor);
        self
    }

    pub fn registry(&self) -> &ResourceArray {
        &self.registry
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Runs every system to completion and returns the final state.
    #[instrument(skip(self), fields(systems = self.systems.len(), consumers = self.workers.consumers))]
    pub fn run(&self) -> Result<Report, EngineError> {
        info!("Starting simulation");
        let started = Instant::now();

        let systems = self.resolve_systems()?;
        let queue = EventQueue::new();
        let producers_done = AtomicBool::new(false);

        let (system_reports, manager_reports) = crossbeam::thread::scope(|scope| {
            let (senders, receivers): (Vec<Sender<Reply>>, Vec<Receiver<Reply>>) =
                systems.iter().map(|_| channel::bounded(1)).unzip();

            let managers: Vec<_> = (0..self.workers.consumers)
                .map(|id| {
                    let manager = Manager {
                        id,
                        queue: &queue,
                        replies: senders.clone(),
                        processor: self.processor.as_ref(),
                        metrics: &self.metrics,
                        producers_done: &producers_done,
                    };
                    scope
                        .builder()
                        .name(format!("manager-{id}"))
                        .spawn(move |_| manager.run())
                })
                .collect();
            // Managers hold the only senders now: once every manager is gone, a system
            // waiting on a reply sees a disconnect instead of blocking forever.
            drop(senders);

            // Without every manager, producers could wait forever on a reply.
            let producers = if managers.iter().all(Result::is_ok) {
                self.spawn_systems(scope, &systems, receivers, &queue)
            } else {
                Vec::new()
            };

            let system_reports: Vec<Result<SystemReport, EngineError>> = producers
                .into_iter()
                .map(|spawned| join_worker(spawned, "system").and_then(|report| report))
                .collect();

            producers_done.store(true, Ordering::Release);

            let manager_reports: Vec<Result<ManagerReport, EngineError>> = managers
                .into_iter()
                .map(|spawned| join_worker(spawned, "manager"))
                .collect();

            (system_reports, manager_reports)
        })
        .map_err(|_| EngineError::WorkerPanicked("scope".into()))?;

        // A dead manager explains any disconnected system, so it is reported first.
        let managers = manager_reports.into_iter().collect::<Result<Vec<_>, _>>()?;
        let systems = system_reports.into_iter().collect::<Result<Vec<_>, _>>()?;

        let stats = queue.stats();
        let discarded = queue.clean();
        if discarded > 0 {
            warn!(discarded, "events left in queue at shutdown");
        }

        let report = Report {
            resources: ResourceReport::collect(&self.registry),
            systems,
            managers,
            queue: QueueReport {
                discarded: discarded as u64,
                ..QueueReport::from(stats)
            },
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(elapsed_ms = report.elapsed_ms, "Simulation complete");
        Ok(report)
    }

    fn spawn_systems<'scope, 'env, 'a: 'env>(
        &'env self,
        scope: &'scope Scope<'env>,
        systems: &'env [System<'a>],
        receivers: Vec<Receiver<Reply>>,
        queue: &'env EventQueue<'a>,
    ) -> Vec<std::io::Result<ScopedJoinHandle<'scope, Result<SystemReport, EngineError>>>> {
        let retry = RetryPolicy {
            max_attempts: self.workers.max_attempts,
            delay: Duration::from_millis(self.workers.retry_delay_ms),
        };

        systems
            .iter()
            .zip(receivers)
            .map(|(system, replies)| {
                let ctx = SystemContext {
                    queue,
                    replies,
                    metrics: &self.metrics,
                    retry,
                    jitter: Jitter::new(
                        self.workers.seed,
                        system.id,
                        self.workers.processing_jitter_ms,
                    ),
                };
                scope
                    .builder()
                    .name(format!("system-{}", system.id.0))
                    .spawn(move |_| system.run(ctx))
            })
            .collect()
    }

    fn resolve_systems(&self) -> Result<Vec<System<'_>>, EngineError> {
        self.systems
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                Ok(System {
                    id: SystemId(index),
                    name: spec.name.clone(),
                    consumes: self.resolve_amount(spec, spec.consumes.as_ref())?,
                    produces: self.resolve_amount(spec, spec.produces.as_ref())?,
                    processing_time: Duration::from_millis(spec.processing_time_ms),
                    cycles: spec.cycles,
                })
            })
            .collect()
    }

    fn resolve_amount(
        &self,
        system: &SystemSpec,
        amount: Option<&AmountSpec>,
    ) -> Result<Option<ResourceAmount<'_>>, EngineError> {
        let Some(amount) = amount else {
            return Ok(None);
        };
        let resource =
            self.registry
                .find(&amount.resource)
                .ok_or_else(|| EngineError::UnknownResource {
                    system: system.name.clone(),
                    resource: amount.resource.clone(),
                })?;
        Ok(Some(ResourceAmount::new(resource, amount.amount)))
    }
}

fn join_worker<T>(
    spawned: std::io::Result<ScopedJoinHandle<'_, T>>,
    role: &'static str,
) -> Result<T, EngineError> {
    let handle = spawned.map_err(|source| EngineError::Spawn { role, source })?;
    let name = handle
        .thread()
        .name()
        .unwrap_or(role)
        .to_owned();
    handle.join().map_err(|_| EngineError::WorkerPanicked(name))
}
