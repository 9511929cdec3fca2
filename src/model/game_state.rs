use serde::{Deserialize, Serialize};

use crate::model::case::{CaseRecord, SuspectRecord};
use crate::model::clue::ClueEntry;
use crate::model::message::TranscriptEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Waiting for the case bootstrap to succeed
    #[default]
    Loading,
    Investigating,
    /// An accusation has been submitted
    Revealing,
}

/// Everything the player can see about the current case.
///
/// Only `engine::apply_mutation` writes to this; the UI gets clones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub case: Option<CaseRecord>,
    pub suspects: Vec<SuspectRecord>,

    /// Newest first
    pub clues: Vec<ClueEntry>,

    /// Oldest first
    pub messages: Vec<TranscriptEntry>,

    pub is_game_over: bool,
    pub status: GameStatus,
}

impl GameState {
    pub fn suspect(&self, id: &str) -> Option<&SuspectRecord> {
        self.suspects.iter().find(|s| s.id == id)
    }

    pub fn has_clue(&self, text: &str) -> bool {
        self.clues.iter().any(|c| c.text == text)
    }

    /// Id the next recorded clue will receive.
    pub fn next_clue_id(&self) -> u32 {
        self.clues.len() as u32 + 1
    }
}
