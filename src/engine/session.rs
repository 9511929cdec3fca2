//! The session controller: one conversation, one game state, one writer.

use chrono::Local;
use log::{debug, info, warn};

use crate::engine::apply_mutation::{apply_mutation, GameMutation};
use crate::engine::case_parser::parse_case;
use crate::engine::clue_extractor::{extract_clue, new_clue};
use crate::engine::error::{ClientError, SessionError};
use crate::engine::llm_client::ConversationClient;
use crate::engine::prompt_builder::{PromptBuilder, REVEAL_FALLBACK};
use crate::logutil::preview;
use crate::model::case::SuspectRecord;
use crate::model::game_state::{GameState, GameStatus};
use crate::model::message::TranscriptEntry;
use crate::model::outcome::{ActionRejected, TurnOutcome};

/// User line recorded when the player asks for a new clue.
pub const CLUE_REQUEST_LINE: &str = "I'm searching the scene further.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    OpenCase,
    Ask,
    RequestClue,
    Accuse,
}

/// A prompt that owns the conversation until it comes back.
///
/// While a `RoundTrip` exists its session has no client, so nothing else can
/// be sent.
pub struct RoundTrip<C> {
    client: C,
    kind: TurnKind,
    prompt: String,
}

impl<C: ConversationClient> RoundTrip<C> {
    #[cfg(test)]
    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    /// Blocks on the remote model.
    pub fn run(mut self) -> CompletedRoundTrip<C> {
        let reply = self.client.send_message(&self.prompt);
        CompletedRoundTrip {
            client: self.client,
            kind: self.kind,
            reply,
        }
    }
}

pub struct CompletedRoundTrip<C> {
    client: C,
    kind: TurnKind,
    reply: Result<String, ClientError>,
}

impl<C> CompletedRoundTrip<C> {
    pub fn kind(&self) -> TurnKind {
        self.kind
    }
}

pub struct Session<C> {
    state: GameState,

    /// Empty while a round-trip is in flight
    client: Option<C>,

    /// Suspect picked for accusation, waiting for the player to confirm
    pending_accusation: Option<SuspectRecord>,
}

impl<C: ConversationClient> Session<C> {
    pub fn new(client: C) -> Self {
        Self {
            state: GameState::default(),
            client: Some(client),
            pending_accusation: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.client.is_none()
    }

    pub fn pending_accusation(&self) -> Option<&SuspectRecord> {
        self.pending_accusation.as_ref()
    }

    pub fn begin_new_case(&mut self) -> Result<RoundTrip<C>, ActionRejected> {
        if self.is_busy() {
            return Err(ActionRejected::Busy);
        }
        if self.state.case.is_some() {
            return Err(ActionRejected::CaseAlreadyOpen);
        }

        self.take_client(TurnKind::OpenCase, PromptBuilder::case_request().to_string())
    }

    pub fn begin_ask(&mut self, question: &str) -> Result<RoundTrip<C>, ActionRejected> {
        self.check_can_act()?;
        if question.trim().is_empty() {
            return Err(ActionRejected::EmptyMessage);
        }

        self.apply(GameMutation::AppendTranscript(TranscriptEntry::user(question)));
        self.take_client(TurnKind::Ask, question.to_string())
    }

    pub fn begin_clue_request(&mut self) -> Result<RoundTrip<C>, ActionRejected> {
        self.check_can_act()?;

        self.apply(GameMutation::AppendTranscript(TranscriptEntry::user(CLUE_REQUEST_LINE)));
        self.take_client(TurnKind::RequestClue, PromptBuilder::clue_request().to_string())
    }

    /// First half of an accusation: pick the suspect and get the question to
    /// put to the player. Nothing is mutated until it is confirmed.
    pub fn request_accusation(&mut self, suspect_id: &str) -> Result<String, ActionRejected> {
        self.check_can_act()?;

        let suspect = self
            .state
            .suspect(suspect_id)
            .cloned()
            .ok_or_else(|| ActionRejected::UnknownSuspect(suspect_id.to_string()))?;

        let question = PromptBuilder::accusation_confirmation(&suspect.name);
        self.pending_accusation = Some(suspect);
        Ok(question)
    }

    pub fn cancel_accusation(&mut self) {
        if let Some(suspect) = self.pending_accusation.take() {
            debug!("accusation of {} cancelled", suspect.name);
        }
    }

    pub fn confirm_accusation(&mut self) -> Result<RoundTrip<C>, ActionRejected> {
        self.check_open()?;
        let suspect = self
            .pending_accusation
            .take()
            .ok_or(ActionRejected::NothingToConfirm)?;

        info!("accusing {}", suspect.name);
        self.apply(GameMutation::AppendTranscript(TranscriptEntry::user(
            PromptBuilder::accusation_line(&suspect.name),
        )));
        self.apply(GameMutation::SetStatus(GameStatus::Revealing));

        self.take_client(TurnKind::Accuse, PromptBuilder::accusation(&suspect.name))
    }

    /// Land a finished round-trip. Always hands the client back, so the
    /// session is never left busy.
    pub fn finish(&mut self, done: CompletedRoundTrip<C>) -> TurnOutcome {
        self.client = Some(done.client);

        match done.kind {
            TurnKind::OpenCase => self.finish_open_case(done.reply),
            TurnKind::Ask | TurnKind::RequestClue => self.finish_reply(done.reply),
            TurnKind::Accuse => self.finish_accusation(done.reply),
        }
    }

    /// Run a round-trip on the calling thread and land it.
    #[cfg(test)]
    pub fn complete(&mut self, trip: RoundTrip<C>) -> TurnOutcome {
        let done = trip.run();
        self.finish(done)
    }

    fn finish_open_case(&mut self, reply: Result<String, ClientError>) -> TurnOutcome {
        let text = match reply {
            Ok(text) => text,
            Err(e) => return TurnOutcome::Recovered(e.into()),
        };

        let case = match parse_case(&text) {
            Ok(case) => case,
            Err(e) => {
                warn!("failed to parse case data: {} (reply: {})", e, preview(&text));
                return TurnOutcome::Recovered(e.into());
            }
        };

        info!("case opened: {} ({} suspects)", case.title, case.suspects.len());

        let initial = new_clue(&self.state, &case.initial_clue, Local::now());
        let opening = PromptBuilder::opening_narration(&case);

        self.apply(GameMutation::SetCase(case));
        self.apply(GameMutation::AppendClue(initial));
        self.apply(GameMutation::AppendTranscript(TranscriptEntry::assistant(opening)));
        self.apply(GameMutation::SetStatus(GameStatus::Investigating));

        TurnOutcome::Completed
    }

    fn finish_reply(&mut self, reply: Result<String, ClientError>) -> TurnOutcome {
        let text = match reply {
            Ok(text) => text,
            Err(e) => return TurnOutcome::Recovered(e.into()),
        };
        if text.is_empty() {
            return TurnOutcome::NoReply;
        }

        if let Some(clue) = extract_clue(&text, &self.state, Local::now()) {
            info!("new evidence #{}: {}", clue.id, clue.text);
            self.apply(GameMutation::AppendClue(clue));
        }
        self.apply(GameMutation::AppendTranscript(TranscriptEntry::assistant(text)));

        TurnOutcome::Completed
    }

    fn finish_accusation(&mut self, reply: Result<String, ClientError>) -> TurnOutcome {
        let (text, outcome) = match reply {
            Ok(text) if !text.is_empty() => (text, TurnOutcome::Completed),
            Ok(_) => (REVEAL_FALLBACK.to_string(), TurnOutcome::NoReply),
            Err(e) => (REVEAL_FALLBACK.to_string(), TurnOutcome::Recovered(SessionError::from(e))),
        };

        self.apply(GameMutation::AppendTranscript(TranscriptEntry::assistant(text)));
        self.apply(GameMutation::SetGameOver(true));
        info!("case closed");

        outcome
    }

    /// Gate for starting something new. A pending accusation blocks
    /// everything except its own confirm / cancel.
    fn check_can_act(&self) -> Result<(), ActionRejected> {
        self.check_open()?;
        if self.pending_accusation.is_some() {
            return Err(ActionRejected::AwaitingConfirmation);
        }
        Ok(())
    }

    fn check_open(&self) -> Result<(), ActionRejected> {
        if self.state.is_game_over {
            return Err(ActionRejected::GameOver);
        }
        if self.is_busy() {
            return Err(ActionRejected::Busy);
        }
        if self.state.status != GameStatus::Investigating {
            return Err(ActionRejected::NotInvestigating);
        }
        Ok(())
    }

    fn take_client(&mut self, kind: TurnKind, prompt: String) -> Result<RoundTrip<C>, ActionRejected> {
        let client = self.client.take().ok_or(ActionRejected::Busy)?;
        debug!("round-trip {:?}: {}", kind, preview(&prompt));
        Ok(RoundTrip { client, kind, prompt })
    }

    fn apply(&mut self, mutation: GameMutation) {
        apply_mutation(&mut self.state, mutation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::case_parser::tests::CASE_JSON;
    use crate::engine::error::BootstrapError;
    use crate::engine::llm_client::fake::ScriptedClient;
    use crate::model::message::Role;

    /// A client whose first reply is a well-formed case.
    fn case_client() -> ScriptedClient {
        ScriptedClient::new().reply(&format!("Sure, here you go:\n{CASE_JSON}"))
    }

    fn opened(client: ScriptedClient) -> Session<ScriptedClient> {
        let mut session = Session::new(client);
        let trip = session.begin_new_case().unwrap();
        assert!(session.complete(trip).is_completed());
        session
    }

    fn ask(session: &mut Session<ScriptedClient>, text: &str) -> TurnOutcome {
        let trip = session.begin_ask(text).unwrap();
        session.complete(trip)
    }

    fn accuse(session: &mut Session<ScriptedClient>, suspect_id: &str) -> TurnOutcome {
        session.request_accusation(suspect_id).unwrap();
        let trip = session.confirm_accusation().unwrap();
        session.complete(trip)
    }

    #[test]
    fn bootstrap_opens_the_case() {
        let session = opened(case_client());
        let state = session.state();

        assert_eq!(state.status, GameStatus::Investigating);
        assert_eq!(state.case.as_ref().unwrap().title, "T");
        assert_eq!(state.suspects.len(), 4);
        assert_eq!(state.clues.len(), 1);
        assert_eq!(state.clues[0].id, 1);
        assert_eq!(state.clues[0].text, "I");
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, Role::Assistant);
        assert!(!session.is_busy());
    }

    #[test]
    fn bootstrap_sends_case_request_once() {
        let client = case_client();
        let sent = client.sent.clone();
        opened(client);

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Generate a new murder mystery."));
    }

    #[test]
    fn bootstrap_format_error_stays_loading() {
        let client = ScriptedClient::new().reply("I'm afraid the files are missing.");
        let mut session = Session::new(client);
        let trip = session.begin_new_case().unwrap();

        let outcome = session.complete(trip);
        assert!(matches!(
            outcome,
            TurnOutcome::Recovered(SessionError::Bootstrap(BootstrapError::Format(_)))
        ));
        assert_eq!(session.state().status, GameStatus::Loading);
        assert!(session.state().case.is_none());
        assert!(session.state().messages.is_empty());
        assert!(!session.is_busy());
    }

    #[test]
    fn actions_before_bootstrap_are_rejected() {
        let mut session = Session::new(ScriptedClient::new());
        assert_eq!(session.begin_ask("hello?").err(), Some(ActionRejected::NotInvestigating));
        assert_eq!(session.begin_clue_request().err(), Some(ActionRejected::NotInvestigating));
    }

    #[test]
    fn second_round_trip_is_rejected_while_in_flight() {
        let mut session = opened(case_client().reply("The barkeep shrugs."));
        let trip = session.begin_ask("Who found the body?").unwrap();

        assert!(session.is_busy());
        assert_eq!(session.begin_clue_request().err(), Some(ActionRejected::Busy));
        assert_eq!(session.begin_ask("Anyone?").err(), Some(ActionRejected::Busy));
        assert_eq!(session.request_accusation("1").err(), Some(ActionRejected::Busy));
        assert_eq!(session.state().messages.len(), 2);

        session.complete(trip);
        assert!(!session.is_busy());
        assert_eq!(session.state().messages.len(), 3);
    }

    #[test]
    fn transcript_follows_call_order() {
        let client = case_client()
            .reply("The barkeep shrugs.")
            .reply("CLUE: A wet umbrella by the door.");
        let mut session = opened(client);

        ask(&mut session, "Who found the body?");
        let trip = session.begin_clue_request().unwrap();
        session.complete(trip);

        let log: Vec<_> = session
            .state()
            .messages
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            log[1..],
            [
                (Role::User, "Who found the body?"),
                (Role::Assistant, "The barkeep shrugs."),
                (Role::User, CLUE_REQUEST_LINE),
                (Role::Assistant, "CLUE: A wet umbrella by the door."),
            ]
        );
    }

    #[test]
    fn clue_request_sends_marker_instruction() {
        let client = case_client().reply("CLUE: A torn ticket stub.");
        let sent = client.sent.clone();
        let mut session = opened(client);

        let trip = session.begin_clue_request().unwrap();
        assert_eq!(trip.kind(), TurnKind::RequestClue);
        session.complete(trip);

        assert!(sent.lock().unwrap()[1].contains("Prefix it with \"CLUE: \""));
        assert_eq!(session.state().clues[0].text, "A torn ticket stub.");
        assert_eq!(session.state().clues[0].id, 2);
    }

    #[test]
    fn duplicate_clue_across_replies_is_recorded_once() {
        let client = case_client()
            .reply("Look here. CLUE: X")
            .reply("As I said,\nclue: X");
        let mut session = opened(client);

        ask(&mut session, "What's that?");
        ask(&mut session, "Say again?");

        let hits = session.state().clues.iter().filter(|c| c.text == "X").count();
        assert_eq!(hits, 1);
        assert_eq!(session.state().clues.len(), 2);
    }

    #[test]
    fn clues_are_newest_first() {
        let client = case_client()
            .reply("CLUE: C1")
            .reply("CLUE: C2")
            .reply("CLUE: C3");
        let mut session = opened(client);
        for q in ["one", "two", "three"] {
            ask(&mut session, q);
        }

        let texts: Vec<_> = session.state().clues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["C3", "C2", "C1", "I"]);
    }

    #[test]
    fn failed_round_trip_keeps_user_line_and_clears_busy() {
        let mut session = opened(case_client().fail(503));

        let outcome = ask(&mut session, "Where were you at midnight?");
        assert!(matches!(outcome, TurnOutcome::Recovered(SessionError::RoundTrip(_))));

        let last = session.state().messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "Where were you at midnight?");
        assert!(!session.is_busy());
        assert_eq!(session.state().status, GameStatus::Investigating);
    }

    #[test]
    fn empty_reply_appends_nothing() {
        let mut session = opened(case_client().reply(""));
        let outcome = ask(&mut session, "Hello?");

        assert!(matches!(outcome, TurnOutcome::NoReply));
        assert_eq!(session.state().messages.len(), 2);
    }

    #[test]
    fn blank_question_is_rejected() {
        let mut session = opened(case_client());
        assert_eq!(session.begin_ask("   ").err(), Some(ActionRejected::EmptyMessage));
        assert_eq!(session.state().messages.len(), 1);
    }

    #[test]
    fn accusation_appends_line_then_reveals() {
        let client = case_client().reply("It was the pianist all along.");
        let sent = client.sent.clone();
        let mut session = opened(client);

        let question = session.request_accusation("3").unwrap();
        assert!(question.contains("accuse Eddie Cole?"));
        assert_eq!(session.state().status, GameStatus::Investigating);

        let trip = session.confirm_accusation().unwrap();
        let state = session.state();
        assert_eq!(state.status, GameStatus::Revealing);
        assert_eq!(state.messages.last().unwrap().content, "I accuse Eddie Cole!");
        assert!(!state.is_game_over);

        assert!(session.complete(trip).is_completed());
        assert!(session.state().is_game_over);
        assert_eq!(session.state().messages.last().unwrap().content, "It was the pianist all along.");
        assert!(sent.lock().unwrap()[1].contains("the criminal is Eddie Cole"));
    }

    #[test]
    fn cancelled_accusation_changes_nothing() {
        let mut session = opened(case_client());
        let before = session.state().clone();

        session.request_accusation("2").unwrap();
        assert_eq!(session.pending_accusation().map(|s| s.name.as_str()), Some("Max Doyle"));
        session.cancel_accusation();

        assert!(session.pending_accusation().is_none());
        assert_eq!(session.state(), &before);
        assert_eq!(session.confirm_accusation().err(), Some(ActionRejected::NothingToConfirm));
    }

    #[test]
    fn pending_accusation_blocks_other_actions() {
        let mut session = opened(case_client().reply("The butler did it."));
        session.request_accusation("1").unwrap();
        let before = session.state().clone();

        assert_eq!(session.begin_ask("Wait, one more question").err(), Some(ActionRejected::AwaitingConfirmation));
        assert_eq!(session.begin_clue_request().err(), Some(ActionRejected::AwaitingConfirmation));
        assert_eq!(session.request_accusation("2").err(), Some(ActionRejected::AwaitingConfirmation));
        assert_eq!(session.state(), &before);
        assert_eq!(session.pending_accusation().map(|s| s.name.as_str()), Some("Vera Lang"));

        let trip = session.confirm_accusation().unwrap();
        session.complete(trip);
        assert!(session.state().is_game_over);
        assert_eq!(session.state().messages[1].content, "I accuse Vera Lang!");
    }

    #[test]
    fn cancelled_accusation_unblocks_questions() {
        let mut session = opened(case_client().reply("Go on, kid."));
        session.request_accusation("2").unwrap();
        session.cancel_accusation();

        assert!(ask(&mut session, "Where's the gun?").is_completed());
    }

    #[test]
    fn unknown_suspect_is_rejected() {
        let mut session = opened(case_client());
        assert_eq!(
            session.request_accusation("99").err(),
            Some(ActionRejected::UnknownSuspect("99".into()))
        );
    }

    #[test]
    fn empty_reveal_uses_fallback_and_ends_game() {
        let mut session = opened(case_client().reply(""));
        let outcome = accuse(&mut session, "1");

        assert!(matches!(outcome, TurnOutcome::NoReply));
        assert!(session.state().is_game_over);
        assert_eq!(session.state().messages.last().unwrap().content, REVEAL_FALLBACK);
    }

    #[test]
    fn failed_reveal_still_ends_game() {
        let mut session = opened(case_client().fail(500));
        let outcome = accuse(&mut session, "4");

        assert!(matches!(outcome, TurnOutcome::Recovered(_)));
        assert!(session.state().is_game_over);
        assert_eq!(session.state().messages.last().unwrap().content, REVEAL_FALLBACK);
        assert!(!session.is_busy());
    }

    #[test]
    fn nothing_moves_after_game_over() {
        let mut session = opened(case_client().reply("Case closed, doll."));
        accuse(&mut session, "1");
        let closed = session.state().clone();

        assert_eq!(session.request_accusation("2").err(), Some(ActionRejected::GameOver));
        assert_eq!(session.confirm_accusation().err(), Some(ActionRejected::GameOver));
        assert_eq!(session.begin_ask("One more thing...").err(), Some(ActionRejected::GameOver));
        assert_eq!(session.begin_clue_request().err(), Some(ActionRejected::GameOver));
        assert_eq!(session.state(), &closed);
    }

    #[test]
    fn reveal_is_not_scanned_for_clues() {
        let mut session = opened(case_client().reply("CLUE: the final piece"));
        accuse(&mut session, "1");
        assert_eq!(session.state().clues.len(), 1);
    }
}
