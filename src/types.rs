#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use crate::facts::FactKind;

/// Progress through the introductory questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntroPhase {
    AskName,
    AskField,
    AskHome,
    /// Introductions are over; never left once entered
    Done,
}

impl IntroPhase {
    /// The phase after this one.
    pub fn next(&self) -> Self {
        match self {
            Self::AskName => Self::AskField,
            Self::AskField => Self::AskHome,
            Self::AskHome | Self::Done => Self::Done,
        }
    }

    /// The fact this phase asks for.
    pub fn fact(&self) -> Option<FactKind> {
        match self {
            Self::AskName => Some(FactKind::Name),
            Self::AskField => Some(FactKind::Field),
            Self::AskHome => Some(FactKind::Home),
            Self::Done => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AskName => "ask_name",
            Self::AskField => "ask_field",
            Self::AskHome => "ask_home",
            Self::Done => "done",
        }
    }
}

/// Facts the user has shared. Each is set at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFacts {
    pub name: Option<String>,
    pub field_of_study: Option<String>,
    pub home_locale: Option<String>,
}

impl SessionFacts {
    pub fn get(&self, kind: FactKind) -> Option<&str> {
        match kind {
            FactKind::Name => self.name.as_deref(),
            FactKind::Field => self.field_of_study.as_deref(),
            FactKind::Home => self.home_locale.as_deref(),
        }
    }

    /// Store a fact unless one is already known. Returns whether it was stored.
    pub fn remember(&mut self, kind: FactKind, value: String) -> bool {
        let slot = match kind {
            FactKind::Name => &mut self.name,
            FactKind::Field => &mut self.field_of_study,
            FactKind::Home => &mut self.home_locale,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }
}

/// Which stage of the pipeline produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum ResponseSource {
    Keyword(usize),
    Phrase(usize),
    Spur,
    FallbackSpur,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Counselor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl TranscriptEntry {
    /// `"< input"` for the user, `"> output"` for the counselor.
    pub fn to_line(&self) -> String {
        match self.speaker {
            Speaker::User => format!("< {}", self.text),
            Speaker::Counselor => format!("> {}", self.text),
        }
    }
}

/// What the counselor says in reply to one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutput {
    pub lines: Vec<String>,
    /// The session is over; no further input will be answered
    pub ended: bool,
}
