use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::clue::ClueEntry;
use crate::model::game_state::GameState;

static CLUE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)CLUE:\s*(.*)").unwrap());

/// Text of the first `CLUE:` marker in a reply, trimmed. Empty markers count
/// as absent.
pub fn find_marker(utterance: &str) -> Option<&str> {
    let caps = CLUE_MARKER.captures(utterance)?;
    let text = caps.get(1)?.as_str().trim();
    (!text.is_empty()).then_some(text)
}

/// Build the evidence entry a reply contributes, if any.
///
/// Returns `None` when there is no marker or when the board already holds the
/// exact same text. The entry is not applied here.
pub fn extract_clue(utterance: &str, state: &GameState, now: DateTime<Local>) -> Option<ClueEntry> {
    let text = find_marker(utterance)?;
    if state.has_clue(text) {
        return None;
    }

    Some(new_clue(state, text, now))
}

pub fn new_clue(state: &GameState, text: &str, now: DateTime<Local>) -> ClueEntry {
    ClueEntry {
        id: state.next_clue_id(),
        text: text.to_string(),
        timestamp: now.format("%H:%M").to_string(),
    }
}
