use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::{debug, error, info, warn};

use crate::engine::error::ClientError;
use crate::engine::llm_client::ConversationClient;
use crate::engine::prompt_builder::PromptBuilder;
use crate::engine::protocol::{EngineCommand, EngineResponse, PendingAccusation, SessionSnapshot};
use crate::engine::session::{CompletedRoundTrip, RoundTrip, Session};
use crate::model::outcome::{ActionRejected, TurnOutcome};
use crate::ui::settings::LlmSettings;

enum Inbox<C> {
    Command(EngineCommand),

    /// A worker thread is handing the conversation back
    Finished {
        generation: u64,
        done: CompletedRoundTrip<C>,
    },
}

/// Builds the conversation client for each new case.
pub type ClientFactory<C> = Box<dyn FnMut(&LlmSettings) -> Result<C, ClientError> + Send>;

/// The UI's end of the engine thread.
pub struct EngineHandle<C> {
    inbox: Sender<Inbox<C>>,
    responses: Receiver<EngineResponse>,
}

impl<C: ConversationClient> EngineHandle<C> {
    /// Start the engine thread and immediately open a first case.
    pub fn spawn(factory: ClientFactory<C>, llm: LlmSettings) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let engine_inbox = inbox_tx.clone();
        thread::spawn(move || {
            let mut engine = Engine::new(inbox_rx, engine_inbox, resp_tx, factory);
            engine.run();
        });

        let handle = Self {
            inbox: inbox_tx,
            responses: resp_rx,
        };
        handle.send(EngineCommand::NewCase { llm });
        handle
    }

    pub fn send(&self, cmd: EngineCommand) {
        if self.inbox.send(Inbox::Command(cmd)).is_err() {
            error!("engine thread is gone; command dropped");
        }
    }

    pub fn try_recv(&self) -> Option<EngineResponse> {
        self.responses.try_recv().ok()
    }

    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<EngineResponse> {
        self.responses.recv_timeout(timeout).ok()
    }
}

/// Owns the session. Round-trips run on worker threads so commands keep
/// arriving (and being rejected) while one is in flight.
pub struct Engine<C> {
    rx: Receiver<Inbox<C>>,
    inbox: Sender<Inbox<C>>,
    tx: Sender<EngineResponse>,
    factory: ClientFactory<C>,
    session: Option<Session<C>>,

    /// Bumped on every new case so late replies for a discarded one are ignored
    generation: u64,
}

impl<C: ConversationClient> Engine<C> {
    fn new(
        rx: Receiver<Inbox<C>>,
        inbox: Sender<Inbox<C>>,
        tx: Sender<EngineResponse>,
        factory: ClientFactory<C>,
    ) -> Self {
        Self {
            rx,
            inbox,
            tx,
            factory,
            session: None,
            generation: 0,
        }
    }

    pub fn run(&mut self) {
        while let Ok(msg) = self.rx.recv() {
            match msg {
                Inbox::Command(cmd) => self.handle_command(cmd),
                Inbox::Finished { generation, done } => self.handle_finished(generation, done),
            }
        }
        debug!("engine inbox closed");
    }

    fn handle_command(&mut self, cmd: EngineCommand) {
        let started = match cmd {
            EngineCommand::NewCase { llm } => {
                self.new_case(&llm);
                return;
            }
            EngineCommand::Ask(text) => self.with_session(|s| s.begin_ask(&text).map(Some)),
            EngineCommand::RequestClue => self.with_session(|s| s.begin_clue_request().map(Some)),
            EngineCommand::RequestAccusation { suspect_id } => {
                self.with_session(|s| s.request_accusation(&suspect_id).map(|_| None))
            }
            EngineCommand::ConfirmAccusation => {
                self.with_session(|s| s.confirm_accusation().map(Some))
            }
            EngineCommand::CancelAccusation => self.with_session(|s| {
                s.cancel_accusation();
                Ok(None)
            }),
        };

        let Some(started) = started else {
            warn!("no session; command ignored");
            return;
        };

        match started {
            Ok(Some(trip)) => self.dispatch(trip),
            Ok(None) => {}
            Err(rejected) => self.reject(rejected),
        }

        self.publish_snapshot();
    }

    fn with_session(
        &mut self,
        f: impl FnOnce(&mut Session<C>) -> Result<Option<RoundTrip<C>>, ActionRejected>,
    ) -> Option<Result<Option<RoundTrip<C>>, ActionRejected>> {
        self.session.as_mut().map(f)
    }

    fn new_case(&mut self, llm: &LlmSettings) {
        self.generation += 1;
        info!("opening case #{} against {} ({})", self.generation, llm.base_url, llm.model);

        let client = match (self.factory)(llm) {
            Ok(client) => client,
            Err(e) => {
                error!("could not create conversation client: {}", e);
                self.session = None;
                self.publish_snapshot();
                return;
            }
        };

        let mut session = Session::new(client);
        let trip = session.begin_new_case();
        self.session = Some(session);

        match trip {
            Ok(trip) => self.dispatch(trip),
            Err(rejected) => self.reject(rejected),
        }
        self.publish_snapshot();
    }

    fn handle_finished(&mut self, generation: u64, done: CompletedRoundTrip<C>) {
        if generation != self.generation {
            debug!("dropping reply for discarded case #{}", generation);
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let kind = done.kind();
        let outcome = session.finish(done);
        match &outcome {
            TurnOutcome::Completed => debug!("{:?} completed", kind),
            TurnOutcome::NoReply => info!("{:?} came back empty", kind),
            TurnOutcome::Recovered(e) => warn!("{:?} failed, session continues: {}", kind, e),
        }

        let _ = self.tx.send(EngineResponse::Outcome { kind, outcome });
        self.publish_snapshot();
    }

    fn dispatch(&self, trip: RoundTrip<C>) {
        let inbox = self.inbox.clone();
        let generation = self.generation;

        thread::spawn(move || {
            let done = trip.run();
            let _ = inbox.send(Inbox::Finished { generation, done });
        });
    }

    fn reject(&self, rejected: ActionRejected) {
        info!("action rejected: {}", rejected);
        let _ = self.tx.send(EngineResponse::Rejected(rejected));
    }

    fn publish_snapshot(&self) {
        let snapshot = match &self.session {
            Some(session) => SessionSnapshot {
                state: session.state().clone(),
                busy: session.is_busy(),
                pending_accusation: session.pending_accusation().map(|suspect| PendingAccusation {
                    question: PromptBuilder::accusation_confirmation(&suspect.name),
                    suspect: suspect.clone(),
                }),
            },
            None => SessionSnapshot::default(),
        };

        let _ = self.tx.send(EngineResponse::Snapshot(snapshot));
    }
}
