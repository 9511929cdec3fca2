use crate::engine::session::TurnKind;
use crate::model::case::SuspectRecord;
use crate::model::game_state::GameState;
use crate::model::outcome::{ActionRejected, TurnOutcome};
use crate::ui::settings::LlmSettings;

pub enum EngineCommand {
    /// Throw the current case away and bootstrap a fresh one
    NewCase { llm: LlmSettings },
    Ask(String),
    RequestClue,
    RequestAccusation { suspect_id: String },
    ConfirmAccusation,
    CancelAccusation,
}

#[derive(Debug, Clone)]
pub struct PendingAccusation {
    pub suspect: SuspectRecord,
    pub question: String,
}

/// What the UI renders from. Always a full copy.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub state: GameState,
    pub busy: bool,
    pub pending_accusation: Option<PendingAccusation>,
}

pub enum EngineResponse {
    Snapshot(SessionSnapshot),

    Outcome {
        kind: TurnKind,
        outcome: TurnOutcome,
    },

    Rejected(ActionRejected),
}
