//! The counselor's rule script.
//!
//! A script is authored as JSON ([`ScriptSource`]) and compiled once into a
//! [`CounselorScript`]: regexes are built, templates are parsed and every
//! capture reference is checked against its pattern. A compiled script is
//! immutable and shared between sessions.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CounselorError, Result};

/// Fixed lines spoken outside of rule matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptMessages {
    /// Self-introduction at session start
    pub intro: String,
    /// Final line when the user leaves
    pub farewell: String,
    /// Intro question for the name
    pub ask_name: String,
    /// Intro question for the field of study
    pub ask_field: String,
    /// Intro question for home
    pub ask_home: String,
    /// Opening question once introductions are done
    pub conversation_starter: String,
    /// Reply to gibberish
    pub not_understood: String,
    /// Reply to abusive language
    pub scold: String,
    /// Greeting once a name is learned; may use `${name}`
    pub name_greeting: String,
}

/// A keyword rule as authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSource {
    /// Case-insensitive regex
    pub pattern: String,
    /// Fixed response
    pub response: String,
}

/// A phrase rule as authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseSource {
    /// Case-insensitive regex with named captures
    pub pattern: String,
    /// Response with `${group}` references
    pub template: String,
}

/// Script as authored in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSource {
    /// Fixed lines
    pub messages: ScriptMessages,
    /// Keyword rules, highest priority first
    pub keywords: Vec<KeywordSource>,
    /// Phrase rules, highest priority first
    pub phrases: Vec<PhraseSource>,
    /// Unique conversational spurs
    #[serde(default)]
    pub spurs: Vec<String>,
    /// Spur used once the unique ones run out
    pub fallback_spur: String,
    /// Spurs added once the field of study is known; may use `${field}`
    #[serde(default)]
    pub field_spurs: Vec<String>,
    /// Spurs added once home is known; may use `${home}`
    #[serde(default)]
    pub home_spurs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
}

/// A response template with `${name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

lazy_static! {
    static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex ok");
}

impl Template {
    /// Parse `source`, accepting only placeholders named in `known`.
    pub fn parse<'a>(source: &str, known: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let known: HashSet<&str> = known.into_iter().collect();
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER_RE.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !known.contains(name.as_str()) {
                return Err(CounselorError::UnknownCaptureGroup {
                    template: source.to_string(),
                    group: name.as_str().to_string(),
                });
            }
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Capture(name.as_str().to_string()));
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template as authored.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render with a lookup; placeholders without a value render empty.
    pub fn render<'v>(&self, lookup: impl Fn(&str) -> Option<&'v str>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Capture(name) => out.push_str(lookup(name).unwrap_or("")),
            }
        }
        out
    }

    /// Render from regex captures.
    pub fn render_captures(&self, caps: &Captures<'_>) -> String {
        self.render(|name| caps.name(name).map(|m| m.as_str().trim()))
    }

    /// Render with a single named value.
    pub fn render_with(&self, name: &str, value: &str) -> String {
        self.render(|n| (n == name).then_some(value))
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| CounselorError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// A rule with a fixed response that fires at most once per session.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pattern: Regex,
    response: String,
}

impl KeywordRule {
    /// Compile a keyword rule.
    pub fn new(pattern: &str, response: &str) -> Result<Self> {
        if response.trim().is_empty() {
            return Err(CounselorError::InvalidScript(format!(
                "keyword `{}` has an empty response",
                pattern
            )));
        }
        Ok(Self {
            pattern: compile_pattern(pattern)?,
            response: response.to_string(),
        })
    }

    /// Whether the rule applies to `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// The fixed response.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// The pattern source.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// A rule that rewrites matching text through a capture template.
#[derive(Debug, Clone)]
pub struct PhraseRule {
    pattern: Regex,
    template: Template,
}

impl PhraseRule {
    /// Compile a phrase rule, rejecting references to groups the pattern lacks.
    pub fn new(pattern: &str, template: &str) -> Result<Self> {
        let pattern = compile_pattern(pattern)?;
        let template = Template::parse(template, pattern.capture_names().flatten())?;
        Ok(Self { pattern, template })
    }

    /// The rendered response if the rule matches `text`.
    pub fn apply(&self, text: &str) -> Option<String> {
        self.pattern
            .captures(text)
            .map(|caps| self.template.render_captures(&caps))
    }

    /// The pattern source.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// A compiled, validated script.
#[derive(Debug, Clone)]
pub struct CounselorScript {
    messages: ScriptMessages,
    name_greeting: Template,
    keywords: Vec<KeywordRule>,
    phrases: Vec<PhraseRule>,
    spurs: Vec<String>,
    fallback_spur: String,
    field_spurs: Vec<Template>,
    home_spurs: Vec<Template>,
}

const BUNDLED_SCRIPT: &str = include_str!("../data/career_counselor.json");

lazy_static! {
    static ref BUNDLED: Arc<CounselorScript> = Arc::new(
        CounselorScript::from_json(BUNDLED_SCRIPT).expect("career_counselor.json must be valid")
    );
}

impl CounselorScript {
    /// The bundled career counselor script.
    pub fn bundled() -> Arc<Self> {
        Arc::clone(&BUNDLED)
    }

    /// Compile a script from JSON.
    pub fn from_json(raw: &str) -> Result<Self> {
        let source: ScriptSource = serde_json::from_str(raw)?;
        Self::compile(source)
    }

    /// Compile a script from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    /// Validate and compile an authored script.
    pub fn compile(source: ScriptSource) -> Result<Self> {
        let m = &source.messages;
        for (label, text) in [
            ("intro", &m.intro),
            ("farewell", &m.farewell),
            ("askName", &m.ask_name),
            ("askField", &m.ask_field),
            ("askHome", &m.ask_home),
            ("conversationStarter", &m.conversation_starter),
            ("notUnderstood", &m.not_understood),
            ("scold", &m.scold),
            ("nameGreeting", &m.name_greeting),
            ("fallbackSpur", &source.fallback_spur),
        ] {
            if text.trim().is_empty() {
                return Err(CounselorError::InvalidScript(format!(
                    "message `{}` is empty",
                    label
                )));
            }
        }

        let name_greeting = Template::parse(&m.name_greeting, ["name"])?;
        let keywords = source
            .keywords
            .iter()
            .map(|k| KeywordRule::new(&k.pattern, &k.response))
            .collect::<Result<Vec<_>>>()?;
        let phrases = source
            .phrases
            .iter()
            .map(|p| PhraseRule::new(&p.pattern, &p.template))
            .collect::<Result<Vec<_>>>()?;
        let field_spurs = source
            .field_spurs
            .iter()
            .map(|t| Template::parse(t, ["field"]))
            .collect::<Result<Vec<_>>>()?;
        let home_spurs = source
            .home_spurs
            .iter()
            .map(|t| Template::parse(t, ["home"]))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            keywords = keywords.len(),
            phrases = phrases.len(),
            spurs = source.spurs.len(),
            "compiled counselor script"
        );

        Ok(Self {
            messages: source.messages,
            name_greeting,
            keywords,
            phrases,
            spurs: source.spurs,
            fallback_spur: source.fallback_spur,
            field_spurs,
            home_spurs,
        })
    }

    /// Fixed lines.
    pub fn messages(&self) -> &ScriptMessages {
        &self.messages
    }

    /// Keyword rules in priority order.
    pub fn keywords(&self) -> &[KeywordRule] {
        &self.keywords
    }

    /// Phrase rules in priority order.
    pub fn phrases(&self) -> &[PhraseRule] {
        &self.phrases
    }

    /// Initial unique spurs.
    pub fn spurs(&self) -> &[String] {
        &self.spurs
    }

    /// Spur used once the pool is exhausted.
    pub fn fallback_spur(&self) -> &str {
        &self.fallback_spur
    }

    /// Greeting for a newly learned name.
    pub fn greet(&self, name: &str) -> String {
        self.name_greeting.render_with("name", name)
    }

    /// Spurs about the user's field of study.
    pub fn field_spurs(&self, field: &str) -> Vec<String> {
        self.field_spurs
            .iter()
            .map(|t| t.render_with("field", field))
            .collect()
    }

    /// Spurs about the user's home.
    pub fn home_spurs(&self, home: &str) -> Vec<String> {
        self.home_spurs
            .iter()
            .map(|t| t.render_with("home", home))
            .collect()
    }
}
