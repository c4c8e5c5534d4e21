//! The conversation state machine.
//!
//! A session opens with up to three introductory questions (name, field of
//! study, home) and then settles into steady-state conversation. An answer that
//! doesn't contain the requested fact but does trigger a rule ends the
//! introductions early and the rule's reply opens the conversation.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::classifier::{is_abusive, is_gibberish};
use crate::config::CounselorConfig;
use crate::engine::ResponseEngine;
use crate::error::Result;
use crate::facts::FactKind;
use crate::perspective::swap_perspective;
use crate::script::CounselorScript;
use crate::types::{IntroPhase, SessionFacts, Speaker, TranscriptEntry, TurnOutput};

/// Whether `input` asks to end the conversation.
pub fn is_quit_signal(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

/// Whether the name prefix may be applied to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Address {
    Plain,
    MayUseName,
}

/// One user's conversation with the counselor.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    engine: ResponseEngine,
    facts: SessionFacts,
    intro_phase: IntroPhase,
    last_response: String,
    started: bool,
    ended: bool,
    name_chance: f64,
    rng: StdRng,
    transcript: Vec<TranscriptEntry>,
}

impl ConversationSession {
    /// Create a session, loading the script named by `config` or the bundled one.
    pub fn new(config: &CounselorConfig) -> Result<Self> {
        config.validate()?;
        let script = match &config.script_path {
            Some(path) => Arc::new(CounselorScript::from_path(path)?),
            None => CounselorScript::bundled(),
        };
        Self::with_script(script, config)
    }

    /// Create a session over an already compiled script.
    pub fn with_script(script: Arc<CounselorScript>, config: &CounselorConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            engine: ResponseEngine::new(script, config.seed),
            facts: SessionFacts::default(),
            intro_phase: IntroPhase::AskName,
            last_response: String::new(),
            started: false,
            ended: false,
            name_chance: config.name_chance,
            rng,
            transcript: Vec::new(),
        })
    }

    /// Introduce the counselor and ask the first question.
    ///
    /// Only the first call emits anything; [`respond`](Self::respond) calls it
    /// implicitly.
    pub fn start(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.started || self.ended {
            return lines;
        }
        self.started = true;
        let intro = self.script().messages().intro.clone();
        self.emit(&mut lines, intro, Address::Plain);
        self.ask(&mut lines, IntroPhase::AskName);
        lines
    }

    /// Answer one line of user input.
    pub fn respond(&mut self, input: &str) -> TurnOutput {
        if self.ended {
            warn!("input received after the session ended");
            return TurnOutput {
                lines: Vec::new(),
                ended: true,
            };
        }

        let mut lines = self.start();
        self.transcript.push(TranscriptEntry {
            speaker: Speaker::User,
            text: input.to_string(),
        });

        if is_quit_signal(input) {
            self.finish(&mut lines);
        } else if self.intro_phase == IntroPhase::Done {
            self.conversation_turn(&mut lines, input);
        } else {
            self.intro_turn(&mut lines, input);
        }

        TurnOutput {
            lines,
            ended: self.ended,
        }
    }

    /// End the session as if the user quit, e.g. when input closes.
    ///
    /// Returns the farewell, or `None` if the session had already ended.
    pub fn end(&mut self) -> Option<String> {
        if self.ended {
            return None;
        }
        let mut lines = Vec::new();
        self.finish(&mut lines);
        lines.pop()
    }

    fn finish(&mut self, lines: &mut Vec<String>) {
        let farewell = self.script().messages().farewell.clone();
        self.emit(lines, farewell, Address::Plain);
        self.ended = true;
        info!(turns = self.transcript.len(), "conversation ended");
    }

    fn intro_turn(&mut self, lines: &mut Vec<String>, input: &str) {
        let phase = self.intro_phase;

        if is_abusive(input) {
            let scold = self.script().messages().scold.clone();
            self.emit(lines, scold, Address::Plain);
            self.advance(lines);
            return;
        }
        if is_gibberish(input) {
            let reply = self.script().messages().not_understood.clone();
            self.emit(lines, reply, Address::Plain);
            self.advance(lines);
            return;
        }

        let swapped = swap_perspective(input);
        let Some(kind) = phase.fact() else {
            return;
        };

        if let Some(fact) = kind.spot(&swapped) {
            self.learn(lines, kind, fact);
            self.advance(lines);
        } else if let Some(reply) = self.engine.generate(&swapped, &self.last_response, false) {
            debug!(phase = phase.as_str(), "subject changed during introductions");
            self.intro_phase = IntroPhase::Done;
            self.emit(lines, reply, Address::MayUseName);
        } else {
            self.ask(lines, phase);
        }
    }

    fn learn(&mut self, lines: &mut Vec<String>, kind: FactKind, fact: String) {
        if !self.facts.remember(kind, fact.clone()) {
            return;
        }
        debug!(?kind, "fact learned");
        match kind {
            FactKind::Name => {
                let greeting = self.script().greet(&fact);
                self.emit(lines, greeting, Address::Plain);
            }
            FactKind::Field => {
                let spurs = self.script().field_spurs(&fact);
                self.engine.spurs_mut().extend(spurs);
            }
            FactKind::Home => {
                let spurs = self.script().home_spurs(&fact);
                self.engine.spurs_mut().extend(spurs);
            }
        }
    }

    fn advance(&mut self, lines: &mut Vec<String>) {
        self.intro_phase = self.intro_phase.next();
        debug!(phase = self.intro_phase.as_str(), "intro advanced");
        if self.intro_phase == IntroPhase::Done {
            let starter = self.script().messages().conversation_starter.clone();
            self.emit(lines, starter, Address::MayUseName);
        } else {
            self.ask(lines, self.intro_phase);
        }
    }

    fn ask(&mut self, lines: &mut Vec<String>, phase: IntroPhase) {
        let messages = self.script().messages();
        let question = match phase {
            IntroPhase::AskName => messages.ask_name.clone(),
            IntroPhase::AskField => messages.ask_field.clone(),
            IntroPhase::AskHome => messages.ask_home.clone(),
            IntroPhase::Done => return,
        };
        self.emit(lines, question, Address::Plain);
    }

    fn conversation_turn(&mut self, lines: &mut Vec<String>, input: &str) {
        let filtered = if is_abusive(input) {
            Some(self.script().messages().scold.clone())
        } else if is_gibberish(input) {
            Some(self.script().messages().not_understood.clone())
        } else {
            None
        };

        if let Some(reply) = filtered {
            if reply == self.last_response {
                let spur = self.engine.spurs_mut().next_spur();
                self.emit(lines, spur, Address::MayUseName);
            } else {
                self.emit(lines, reply, Address::Plain);
            }
            return;
        }

        let swapped = swap_perspective(input);
        let response = match self.engine.generate(&swapped, &self.last_response, true) {
            Some(response) => response,
            None => self.engine.spurs_mut().next_spur(),
        };
        self.emit(lines, response, Address::MayUseName);
    }

    fn emit(&mut self, lines: &mut Vec<String>, text: String, address: Address) {
        let use_name = address == Address::MayUseName
            && self.facts.name.is_some()
            && self.rng.gen_bool(self.name_chance);
        let line = match &self.facts.name {
            Some(name) if use_name => address_by_name(name, &text),
            _ => text.clone(),
        };
        self.last_response = text;
        self.transcript.push(TranscriptEntry {
            speaker: Speaker::Counselor,
            text: line.clone(),
        });
        lines.push(line);
    }

    fn script(&self) -> &Arc<CounselorScript> {
        self.engine.script()
    }

    /// Facts learned so far.
    pub fn facts(&self) -> &SessionFacts {
        &self.facts
    }

    /// Current introduction phase.
    pub fn intro_phase(&self) -> IntroPhase {
        self.intro_phase
    }

    /// The last response, without any name prefix.
    pub fn last_response(&self) -> &str {
        &self.last_response
    }

    /// Whether the session has ended.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Every input and output so far, in order.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// The transcript rendered as `"< input"` / `"> output"` lines.
    pub fn transcript_lines(&self) -> Vec<String> {
        self.transcript.iter().map(TranscriptEntry::to_line).collect()
    }

    /// The session's response engine.
    pub fn engine(&self) -> &ResponseEngine {
        &self.engine
    }
}

/// Prefix `text` with `name`, lowercasing its first letter unless it opens
/// with the pronoun "I".
pub fn address_by_name(name: &str, text: &str) -> String {
    let first_word = text.split_whitespace().next().unwrap_or("");
    let keeps_capital = first_word == "I" || first_word.starts_with("I'");
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if !keeps_capital => {
            format!("{}, {}{}", name, first.to_lowercase(), chars.as_str())
        }
        _ => format!("{}, {}", name, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session(name_chance: f64) -> ConversationSession {
        let config = CounselorConfig::default()
            .with_seed(5)
            .with_name_chance(name_chance);
        ConversationSession::new(&config).unwrap()
    }

    fn lines(output: TurnOutput) -> Vec<String> {
        output.lines
    }

    #[test]
    fn test_start_asks_for_name() {
        let mut session = session(0.0);
        assert_eq!(
            session.start(),
            vec![
                "Hello! I am Eliza the Career Counselor.".to_string(),
                "What is your name?".to_string(),
            ]
        );
        assert!(session.start().is_empty());
    }

    #[test]
    fn test_full_introduction() {
        let mut session = session(0.0);
        session.start();
        assert_eq!(
            lines(session.respond("My name is Kara")),
            vec!["Hello, Kara!", "What is your major?"]
        );
        assert_eq!(
            lines(session.respond("Computer science")),
            vec!["Where do you consider home?"]
        );
        let before = session.engine().spurs().remaining();
        assert_eq!(
            lines(session.respond("I grew up in Duluth")),
            vec!["What can I help you with today?"]
        );
        assert_eq!(session.engine().spurs().remaining(), before + 2);
        assert_eq!(session.intro_phase(), IntroPhase::Done);
        assert_eq!(session.facts().name.as_deref(), Some("Kara"));
        assert_eq!(session.facts().field_of_study.as_deref(), Some("Computer science"));
        assert_eq!(session.facts().home_locale.as_deref(), Some("Duluth"));
    }

    #[test]
    fn test_field_adds_spurs() {
        let mut session = session(0.0);
        session.respond("Kara");
        let before = session.engine().spurs().remaining();
        session.respond("biology");
        assert_eq!(session.engine().spurs().remaining(), before + 3);
    }

    #[test]
    fn test_psychology_is_a_field() {
        let mut session = session(0.0);
        session.respond("Kara");
        let output = session.respond("Psychology");
        assert_eq!(output.lines, vec!["Where do you consider home?"]);
        assert_eq!(session.facts().field_of_study.as_deref(), Some("Psychology"));
    }

    #[test]
    fn test_change_of_subject_skips_intro() {
        let mut session = session(0.0);
        session.start();
        let output = session.respond("I want to get a job at a big company");
        assert_eq!(output.lines, vec!["Do you have a career path in mind?"]);
        assert_eq!(session.intro_phase(), IntroPhase::Done);
        assert_eq!(session.facts().name, None);
    }

    #[test]
    fn test_looking_for_a_job_is_not_a_name() {
        let mut session = session(0.0);
        session.start();
        let output = session.respond("I'm looking for a job");
        assert_eq!(output.lines, vec!["Do you have a career path in mind?"]);
        assert_eq!(session.facts().name, None);
    }

    #[test]
    fn test_unmatched_answer_repeats_question() {
        let mut session = session(0.0);
        session.start();
        let output = session.respond("not sure about that one really");
        assert_eq!(output.lines, vec!["What is your name?"]);
        assert_eq!(session.intro_phase(), IntroPhase::AskName);
    }

    #[test]
    fn test_abuse_during_intro_moves_on_without_name() {
        let mut session = session(1.0);
        session.respond("Kara");
        let output = session.respond("you idiot");
        assert_eq!(
            output.lines,
            vec!["Please keep a civil tongue and show respect!", "Where do you consider home?"]
        );
        assert_eq!(session.intro_phase(), IntroPhase::AskHome);
    }

    #[test]
    fn test_gibberish_during_intro() {
        let mut session = session(0.0);
        let output = session.respond("sdfghj");
        assert_eq!(
            output.lines,
            vec![
                "Hello! I am Eliza the Career Counselor.",
                "What is your name?",
                "That doesn't make sense to me.",
                "What is your major?",
            ]
        );
    }

    #[test]
    fn test_repeated_scold_becomes_spur() {
        let mut session = session(0.0);
        session.respond("I want a job");
        assert_eq!(session.intro_phase(), IntroPhase::Done);
        let first = session.respond("this is stupid");
        assert_eq!(first.lines, vec!["Please keep a civil tongue and show respect!"]);
        let second = session.respond("stupid stupid");
        assert_eq!(second.lines.len(), 1);
        assert_ne!(second.lines[0], "Please keep a civil tongue and show respect!");
        let third = session.respond("stupid");
        assert_eq!(third.lines, vec!["Please keep a civil tongue and show respect!"]);
    }

    #[test]
    fn test_repeated_gibberish_becomes_spur() {
        let mut session = session(0.0);
        session.respond("I want a job");
        assert_eq!(session.respond("qwrtzp").lines, vec!["That doesn't make sense to me."]);
        assert_ne!(session.respond("qwrtzp").lines, vec!["That doesn't make sense to me."]);
    }

    #[test]
    fn test_quit_from_any_state() {
        for prelude in [vec![], vec!["Kara"], vec!["Kara", "art"], vec!["I want a job"]] {
            let mut session = session(1.0);
            for input in prelude {
                session.respond(input);
            }
            let output = session.respond("  QuIt ");
            assert!(output.ended);
            assert_eq!(
                output.lines.last().map(String::as_str),
                Some("Goodbye and good luck in your future endeavors!")
            );
            assert!(session.is_ended());
            let after = session.respond("hello?");
            assert!(after.ended);
            assert!(after.lines.is_empty());
        }
    }

    #[test]
    fn test_end_acts_like_quit() {
        let mut session = session(0.0);
        session.start();
        assert_eq!(
            session.end().as_deref(),
            Some("Goodbye and good luck in your future endeavors!")
        );
        assert_eq!(session.end(), None);
    }

    #[test]
    fn test_name_prefix() {
        let mut session = session(1.0);
        session.respond("My name is Kara");
        session.respond("Computer science");
        let output = session.respond("Duluth");
        assert_eq!(output.lines, vec!["Kara, what can I help you with today?"]);
        assert_eq!(session.last_response(), "What can I help you with today?");
        let output = session.respond("I need help with my resume.");
        assert_eq!(output.lines, vec!["Kara, is your resume updated?"]);
    }

    #[test]
    fn test_transcript_records_both_sides() {
        let mut session = session(0.0);
        session.respond("Kara");
        assert_eq!(
            session.transcript_lines(),
            vec![
                "> Hello! I am Eliza the Career Counselor.",
                "> What is your name?",
                "< Kara",
                "> Hello, Kara!",
                "> What is your major?",
            ]
        );
    }

    #[test]
    fn test_address_by_name() {
        assert_eq!(address_by_name("Kara", "Is it?"), "Kara, is it?");
        assert_eq!(address_by_name("Kara", "I see."), "Kara, I see.");
        assert_eq!(address_by_name("Kara", "I'm here."), "Kara, I'm here.");
        assert_eq!(address_by_name("Kara", "If so?"), "Kara, if so?");
    }

    #[test]
    fn test_quit_signal() {
        assert!(is_quit_signal("exit"));
        assert!(is_quit_signal("QUIT\n"));
        assert!(!is_quit_signal("quitting"));
        assert!(!is_quit_signal("I want to quit"));
    }
}
