use crate::model::case::CaseRecord;

/// Behavioural instruction sent once, as the first message of every session.
pub const SYSTEM_INSTRUCTION: &str = "You are a world-class AI Crime Investigator in a 1940s noir setting. 
Your task is to orchestrate a deep, logical murder mystery game.

CRITICAL RULES:
1. Create a compelling fictional crime scene with 4 distinct suspects.
2. Provide suspects with names, roles, and complex motives.
3. Only reveal ONE initial clue at the very start.
4. Respond in a gritty, noir detective tone (e.g., \"The rain was a cold slap in the face...\").
5. NEVER reveal the criminal until the user explicitly makes a guess.
6. When the user asks questions, respond logically based on the established facts.
7. If the user \"searches the scene\" or \"asks for a clue\", provide ONE subtle, new piece of evidence.
8. IMPORTANT: When you provide a definitive new piece of evidence, prefix it with \"CLUE: \" so it can be logged in the evidence board.

FORMATTING:
- Initial case setup must be valid JSON.
- Subsequent responses should be Markdown text.";

const CASE_REQUEST: &str = r#"Generate a new murder mystery. 
    Output strictly in JSON format:
    {
      "title": "Case Name",
      "scene": "Atmospheric description of the crime scene",
      "suspects": [
        {"id": "1", "name": "Name", "role": "Role", "description": "Personality/Motive hint", "image": "https://picsum.photos/seed/[random]/400/400"},
        ... 4 total suspects ...
      ],
      "initialClue": "First piece of physical evidence"
    }"#;

const CLUE_REQUEST: &str = "I'm searching the scene further. Uncover one small, subtle, and logical new clue or testimony detail. Prefix it with \"CLUE: \".";

/// Shown when the reveal round-trip brings back nothing.
pub const REVEAL_FALLBACK: &str = "The investigation ended abruptly.";

/// Formats the fixed prompts for each kind of turn. Only text, no I/O.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn case_request() -> &'static str {
        CASE_REQUEST
    }

    pub fn clue_request() -> &'static str {
        CLUE_REQUEST
    }

    pub fn accusation(suspect_name: &str) -> String {
        format!(
            "GUESS: I think the criminal is {suspect_name}. Reveal the truth in a dramatic noir finale, explaining the logic and all clues."
        )
    }

    /// The user's own line in the transcript when they accuse someone.
    pub fn accusation_line(suspect_name: &str) -> String {
        format!("I accuse {suspect_name}!")
    }

    pub fn accusation_confirmation(suspect_name: &str) -> String {
        format!(
            "Are you sure you want to accuse {suspect_name}? Once accused, the truth will be revealed."
        )
    }

    /// First assistant line of every case, built locally from the case record.
    pub fn opening_narration(case: &CaseRecord) -> String {
        let mut text = String::new();

        text.push_str("The city smells like rain and cheap cigars. I've been called to the scene: \"");
        text.push_str(&case.title);
        text.push_str("\".\n\n");
        text.push_str(&case.scene);
        text.push_str("\n\nWe have four suspects on the hook. I've found one initial piece of evidence: ");
        text.push_str(&case.initial_clue);
        text.push_str(". What's our next move, rookie?");

        text
    }
}
