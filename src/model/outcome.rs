use thiserror::Error;

use crate::engine::error::SessionError;

/// How a finished round-trip landed in the session.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The reply (or case) was applied
    Completed,

    /// The model answered with no text
    NoReply,

    /// The round-trip failed but the session carries on
    Recovered(SessionError),
}

impl TurnOutcome {
    #[cfg(test)]
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed)
    }
}

/// Why an action was refused before anything was sent or mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionRejected {
    #[error("a round-trip is already in flight")]
    Busy,

    #[error("the case is closed")]
    GameOver,

    #[error("the investigation has not started")]
    NotInvestigating,

    #[error("a case is already open")]
    CaseAlreadyOpen,

    #[error("message is empty")]
    EmptyMessage,

    #[error("no suspect with id '{0}'")]
    UnknownSuspect(String),

    #[error("an accusation is awaiting confirmation")]
    AwaitingConfirmation,

    #[error("no accusation is awaiting confirmation")]
    NothingToConfirm,
}
