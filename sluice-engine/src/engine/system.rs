//! Producer side: a system consumes one resource, processes, then delivers another.
//!
//! Every request is a round trip: push an event, then block on the system's own reply
//! channel until a manager has applied it. A system therefore has at most one event in
//! the queue at a time.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::Receiver;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use sluice_core::events::{Event, EventQueue, SystemId};
use sluice_core::resource::{Resource, ResourceAmount};
use sluice_telemetry::MetricsRecorder;

use super::directive::{Directive, Priority};
use super::event_processing::Reply;
use super::report::SystemReport;
use super::EngineError;

/// How rejected requests are retried.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

#[derive(Debug)]
pub struct System<'a> {
    pub id: SystemId,
    pub name: String,
    pub consumes: Option<ResourceAmount<'a>>,
    pub produces: Option<ResourceAmount<'a>>,
    pub processing_time: Duration,
    pub cycles: u32,
}

/// Everything a running system borrows from the simulation.
pub(crate) struct SystemContext<'s, 'a> {
    pub queue: &'s EventQueue<'a>,
    pub replies: Receiver<Reply>,
    pub metrics: &'s MetricsRecorder,
    pub retry: RetryPolicy,
    pub jitter: Jitter,
}

/// Random extra processing time, reproducible per system.
pub(crate) struct Jitter {
    rng: SmallRng,
    max_ms: u64,
}

impl Jitter {
    pub fn new(seed: u64, id: SystemId, max_ms: u64) -> Self {
        let stream = seed ^ (id.0 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self {
            rng: SmallRng::seed_from_u64(stream),
            max_ms,
        }
    }

    fn sample(&mut self) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.random_range(0..=self.max_ms))
    }
}

impl<'a> System<'a> {
    pub(crate) fn run(&self, mut ctx: SystemContext<'_, 'a>) -> Result<SystemReport, EngineError> {
        info!(system = %self.name, cycles = self.cycles, "system started");
        let mut report = SystemReport {
            name: self.name.clone(),
            ..SystemReport::default()
        };
        let mut stored: i64 = 0;

        for cycle in 0..self.cycles {
            if let Some(input) = self.consumes {
                if !self.acquire(&ctx, input, &mut report)? {
                    warn!(system = %self.name, cycle, resource = input.resource.name(), "cycle starved");
                    report.starved += 1;
                    continue;
                }
            }

            thread::sleep(self.processing_time + ctx.jitter.sample());

            if let Some(output) = self.produces {
                stored += i64::from(output.amount);
                self.deliver(&ctx, output.resource, &mut stored, &mut report)?;
            }
            report.completed += 1;
        }

        report.undelivered = stored;
        info!(
            system = %self.name,
            completed = report.completed,
            starved = report.starved,
            undelivered = stored,
            "system finished"
        );
        Ok(report)
    }

    /// Requests the cycle's input. `Ok(false)` once every attempt has been refused.
    fn acquire(
        &self,
        ctx: &SystemContext<'_, 'a>,
        input: ResourceAmount<'a>,
        report: &mut SystemReport,
    ) -> Result<bool, EngineError> {
        for attempt in 0..ctx.retry.max_attempts {
            let priority = if attempt == 0 {
                Priority::Medium
            } else {
                Priority::Low
            };
            match self.request(ctx, Directive::Acquire, input.resource, -input.amount, priority)? {
                Ok(_) => return Ok(true),
                Err(rejection) => {
                    debug!(system = %self.name, attempt, %rejection, "acquire refused");
                    report.rejections += 1;
                    thread::sleep(ctx.retry.delay);
                }
            }
        }
        Ok(false)
    }

    /// Pushes `stored` units into `target` until it is all accepted or the resource has
    /// refused `max_attempts` times in a row. Leftovers stay in `stored`.
    ///
    /// `stored` can outgrow `i32` when a sink stays full across cycles; each request
    /// offers at most `i32::MAX` of it.
    fn deliver(
        &self,
        ctx: &SystemContext<'_, 'a>,
        target: &'a Resource,
        stored: &mut i64,
        report: &mut SystemReport,
    ) -> Result<(), EngineError> {
        let mut refusals = 0;
        while *stored > 0 && refusals < ctx.retry.max_attempts {
            let priority = if refusals == 0 {
                Priority::High
            } else {
                Priority::Low
            };
            let offered = i32::try_from(*stored).unwrap_or(i32::MAX);
            match self.request(ctx, Directive::Release, target, offered, priority)? {
                Ok(units) if units > 0 => {
                    *stored -= i64::from(units);
                    report.delivered += i64::from(units);
                    refusals = 0;
                }
                Ok(_) => {
                    debug!(system = %self.name, resource = target.name(), "resource full");
                    refusals += 1;
                    report.rejections += 1;
                    thread::sleep(ctx.retry.delay);
                }
                Err(rejection) => {
                    debug!(system = %self.name, %rejection, "release refused");
                    refusals += 1;
                    report.rejections += 1;
                    thread::sleep(ctx.retry.delay);
                }
            }
        }
        Ok(())
    }

    fn request(
        &self,
        ctx: &SystemContext<'_, 'a>,
        directive: Directive,
        resource: &'a Resource,
        amount: i32,
        priority: Priority,
    ) -> Result<Reply, EngineError> {
        let started = Instant::now();
        ctx.queue.push(Event::new(
            self.id,
            resource,
            directive.into(),
            priority.into(),
            amount,
        ));
        ctx.metrics.inc_pushed();

        let reply = ctx
            .replies
            .recv()
            .map_err(|_| EngineError::Disconnected(self.name.clone()))?;
        ctx.metrics.observe_latency(started.elapsed().as_secs_f64());
        Ok(reply)
    }
}
