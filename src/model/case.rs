use serde::{Deserialize, Serialize};

/// The generated mystery, exactly as the model described it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub title: String,
    pub scene: String,
    pub suspects: Vec<SuspectRecord>,
    #[serde(rename = "initialClue")]
    pub initial_clue: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspectRecord {
    pub id: String,
    pub name: String,
    pub role: String,

    /// Personality / motive hint
    pub description: String,

    /// Portrait URI, not validated
    pub image: String,
}
