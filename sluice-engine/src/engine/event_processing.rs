//! Defines the EventProcessor trait managers use to apply popped events.
use thiserror::Error;

use sluice_core::events::Event;
use sluice_core::resource::TransferError;

use super::directive::Directive;

/// Why a manager refused an event.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("unknown directive {0}")]
    UnknownDirective(i32),

    /// The processor panicked; its manager stops after sending this.
    #[error("event processor panicked")]
    ProcessorPanicked,
}

/// Units actually moved, or why nothing moved.
pub type Reply = Result<i32, Rejection>;

/// Applies a single event to the resource it names.
///
/// Called with no queue lock held; implementations take the resource lock themselves.
pub trait EventProcessor: Send + Sync {
    fn process(&self, event: &Event<'_>) -> Reply;
}

/// Default policy: acquires are all-or-nothing, releases store what fits.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransferProcessor;

impl EventProcessor for TransferProcessor {
    fn process(&self, event: &Event<'_>) -> Reply {
        let directive = Directive::try_from(event.status).map_err(Rejection::UnknownDirective)?;
        let mut guard = event.resource.lock();

        match directive {
            Directive::Acquire => {
                let units = event
                    .amount
                    .checked_neg()
                    .ok_or(TransferError::InvalidAmount(event.amount))?;
                guard.withdraw(units)?;
                Ok(units)
            }
            Directive::Release => Ok(guard.deposit_up_to(event.amount)?),
        }
    }
}
