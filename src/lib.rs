//! # ELIZA Career Counselor
//!
//! A rule-based counselor in the tradition of Weizenbaum's ELIZA. It reflects
//! the user's statements back as questions by pattern matching, the way a
//! Rogerian therapist would, while staying on the topic of careers and study.
//!
//! ## Features
//!
//! - Abuse and gibberish filters
//! - Pronoun perspective swapping ("I need my resume" → "you need your resume")
//! - Keyword rules that fire once per session, phrase rules that rewrite the
//!   user's own words, and conversational spurs when nothing matches
//! - Introductory questions that remember the user's name, major and home
//! - A declarative JSON script validated when it is loaded
//!
//! ## Example
//!
//! ```rust
//! use elizaos_plugin_eliza_counselor::{ConversationSession, CounselorConfig};
//!
//! let config = CounselorConfig::default().with_seed(7).with_name_chance(0.0);
//! let mut session = ConversationSession::new(&config).unwrap();
//! for line in session.start() {
//!     println!("> {}", line);
//! }
//! let turn = session.respond("I need help with my resume.");
//! assert_eq!(turn.lines, vec!["Is your resume updated?"]);
//! ```

#![warn(missing_docs)]

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod facts;
pub mod interop;
pub mod perspective;
pub mod script;
pub mod session;
pub mod spurs;
pub mod types;

pub use classifier::{is_abusive, is_gibberish};
pub use config::CounselorConfig;
pub use engine::ResponseEngine;
pub use error::{CounselorError, Result};
pub use facts::{spot_field, spot_home, spot_name, FactKind};
pub use perspective::swap_perspective;
pub use script::CounselorScript;
pub use session::{is_quit_signal, ConversationSession};
pub use spurs::SpurPool;
pub use types::{IntroPhase, ResponseSource, SessionFacts, Speaker, TranscriptEntry, TurnOutput};
