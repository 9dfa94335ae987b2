//! Consumer side: managers pop events, apply them, and answer the originating system.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam::channel::Sender;
use crossbeam::utils::Backoff;
use tracing::{debug, error, warn};

use sluice_core::events::{EventQueue, SystemId};
use sluice_telemetry::{EventLogger, MetricsRecorder};

use super::event_processing::{EventProcessor, Rejection, Reply};
use super::report::ManagerReport;

/// Sleep once spinning and yielding have not turned up work.
const IDLE_PARK: Duration = Duration::from_micros(200);

pub(crate) struct Manager<'s, 'a> {
    pub id: usize,
    pub queue: &'s EventQueue<'a>,
    /// Reply channels indexed by `SystemId`. Owned, so a manager that dies hangs up
    /// its share of every channel.
    pub replies: Vec<Sender<Reply>>,
    pub processor: &'s dyn EventProcessor,
    pub metrics: &'s MetricsRecorder,
    pub producers_done: &'s AtomicBool,
}

impl Manager<'_, '_> {
    /// Runs until every producer has finished and the queue is drained.
    pub(crate) fn run(self) -> ManagerReport {
        debug!(manager = self.id, "manager started");
        let mut report = ManagerReport::default();
        let backoff = Backoff::new();

        loop {
            let Some(event) = self.queue.pop() else {
                if self.producers_done.load(Ordering::Acquire) && self.queue.is_empty() {
                    break;
                }
                if backoff.is_completed() {
                    thread::sleep(IDLE_PARK);
                } else {
                    backoff.snooze();
                }
                continue;
            };
            backoff.reset();
            self.metrics.inc_popped();

            // Queue lock is released by now; the processor takes only the resource lock.
            let reply = match panic::catch_unwind(AssertUnwindSafe(|| self.processor.process(&event))) {
                Ok(reply) => reply,
                Err(payload) => {
                    error!(manager = self.id, system = %event.system, "event processor panicked");
                    self.metrics.inc_rejected();
                    // Answer the waiting system before going down with the panic.
                    self.reply(event.system, Err(Rejection::ProcessorPanicked));
                    panic::resume_unwind(payload);
                }
            };
            report.handled += 1;
            if let Err(rejection) = &reply {
                report.rejected += 1;
                self.metrics.inc_rejected();
                if let Rejection::UnknownDirective(status) = rejection {
                    warn!(manager = self.id, system = %event.system, status = *status, "unknown directive");
                }
            }
            EventLogger::log_transfer(
                event.resource.name(),
                &event.system,
                event.amount,
                reply.is_ok(),
            );

            self.reply(event.system, reply);
        }

        debug!(manager = self.id, handled = report.handled, "manager stopped");
        report
    }

    fn reply(&self, system: SystemId, reply: Reply) {
        match self.replies.get(system.0) {
            Some(channel) => {
                if channel.send(reply).is_err() {
                    warn!(manager = self.id, %system, "system hung up before reply");
                }
            }
            None => warn!(manager = self.id, %system, "no reply channel for system"),
        }
    }
}
