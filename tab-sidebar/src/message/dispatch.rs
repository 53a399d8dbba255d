use crate::state::plan::{BatchCommand, DispatchPlan};
use log::{trace, warn};
use postage::{
    broadcast,
    sink::{Sink, TrySendError},
};
use tab_sidebar_api::api::ApiError;
use thiserror::Error;

/// A planned batch command.
///
/// Usage:
/// - Tx from the `RegistryService`, when the user issues a command with a non-empty selection.
/// - Rx into the `DispatchService`, which executes plans one at a time.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub command: BatchCommand,
    pub plan: DispatchPlan,
}

/// The result of a batch command, broadcast to the view layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed(BatchCommand),
    /// No call was made.  Nothing was selected, or the dispatcher could not take the command.
    Skipped(BatchCommand),
    Failed {
        command: BatchCommand,
        error: DispatchError,
    },
}

impl ActionOutcome {
    pub fn command(&self) -> BatchCommand {
        match self {
            ActionOutcome::Completed(command) => *command,
            ActionOutcome::Skipped(command) => *command,
            ActionOutcome::Failed { command, .. } => *command,
        }
    }

    /// Broadcasts the outcome without waiting on subscribers.
    ///
    /// The outcome is dropped if nobody is subscribed, or if a subscriber is a full buffer behind.
    pub(crate) fn report(self, tx: &mut broadcast::Sender<ActionOutcome>) {
        match tx.try_send(self) {
            Ok(()) => {}
            Err(TrySendError::Pending(outcome)) => {
                warn!("an outcome subscriber is lagging, dropped {:?}", outcome)
            }
            Err(TrySendError::Rejected(outcome)) => {
                trace!("no outcome subscribers, dropped {:?}", outcome)
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("{action} failed: {source}")]
    ExternalCommand {
        action: BatchCommand,
        source: ApiError,
    },
}
