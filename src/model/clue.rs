use serde::{Deserialize, Serialize};

/// A piece of evidence on the board.
///
/// Ids follow creation order: the n-th clue recorded in a session has id n.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueEntry {
    pub id: u32,
    pub text: String,

    /// Local time as `HH:MM`, display only
    pub timestamp: String,
}
