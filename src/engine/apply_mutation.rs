use crate::model::case::CaseRecord;
use crate::model::clue::ClueEntry;
use crate::model::game_state::{GameState, GameStatus};
use crate::model::message::TranscriptEntry;

/// A single change to the game state. Lists only ever grow.
#[derive(Debug, Clone)]
pub enum GameMutation {
    AppendTranscript(TranscriptEntry),

    /// Goes to the front of the board
    AppendClue(ClueEntry),

    SetCase(CaseRecord),
    SetStatus(GameStatus),
    SetGameOver(bool),
}

impl GameMutation {
    pub fn short_name(&self) -> &'static str {
        match self {
            GameMutation::AppendTranscript(_) => "AppendTranscript",
            GameMutation::AppendClue(_) => "AppendClue",
            GameMutation::SetCase(_) => "SetCase",
            GameMutation::SetStatus(_) => "SetStatus",
            GameMutation::SetGameOver(_) => "SetGameOver",
        }
    }
}

/// Apply a mutation to the game state. Every mutation is total.
pub fn apply_mutation(state: &mut GameState, mutation: GameMutation) {
    log::trace!("applying {}", mutation.short_name());

    match mutation {
        GameMutation::AppendTranscript(entry) => {
            state.messages.push(entry);
        }

        GameMutation::AppendClue(clue) => {
            state.clues.insert(0, clue);
        }

        GameMutation::SetCase(case) => {
            state.suspects = case.suspects.clone();
            state.case = Some(case);
        }

        GameMutation::SetStatus(status) => {
            state.status = status;
        }

        GameMutation::SetGameOver(over) => {
            state.is_game_over = over;
        }
    }
}
