//! Name, field of study and home extraction.
//!
//! Extractors read perspective-swapped text, so "my name is Kara" arrives as
//! "your name is Kara". They only report what they find; storing a fact is the
//! session's job.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The facts the counselor asks about during introductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    /// The user's name
    Name,
    /// The user's major or field of study
    Field,
    /// Where the user considers home
    Home,
}

impl FactKind {
    /// Most bare words accepted when the whole reply is taken as the fact.
    pub fn max_bare_words(&self) -> usize {
        match self {
            Self::Name => 2,
            Self::Field => 4,
            Self::Home => 3,
        }
    }

    /// Look for this fact in swapped text.
    pub fn spot(&self, swapped: &str) -> Option<String> {
        let anchored: &[Regex] = match self {
            Self::Name => &NAME_RES[..],
            Self::Field => std::slice::from_ref(&*FIELD_RE),
            Self::Home => std::slice::from_ref(&*HOME_RE),
        };
        anchored
            .iter()
            .filter_map(|re| re.captures(swapped))
            .filter_map(|caps| caps.name("fact").map(|m| clean_fact(m.as_str())))
            .find(|f| !f.is_empty())
            .or_else(|| bare_words(swapped, self.max_bare_words()))
    }
}

lazy_static! {
    // A plain "you are X" only names the user when X is the whole reply;
    // "you are looking for a job" is not a name.
    static ref NAME_RES: [Regex; 2] = [
        Regex::new(r"(?i)(?:your name(?: is|'s)|you are called)\s+(?P<fact>[\w'-]+)")
            .expect("name regex ok"),
        Regex::new(r"(?i)^\s*you are\s+(?P<fact>[\w'-]+)\s*[.!]?\s*$")
            .expect("name tail regex ok"),
    ];
    static ref FIELD_RE: Regex = Regex::new(
        r"(?i)(?:your (?:major|field|degree) is(?: in)?|you(?: are|'re) (?:in|studying|majoring in))\s+(?P<fact>[\w' -]+)"
    )
    .expect("field regex ok");
    static ref HOME_RE: Regex = Regex::new(
        r"(?i)you(?: (?:lived?|live|grew up) (?:in|on)|(?: are|'re) (?:from|living (?:in|on)))\s+(?P<fact>[\w' .,-]*\w)"
    )
    .expect("home regex ok");
    static ref BARE_RES: [Regex; 4] = [
        bare_words_regex(1),
        bare_words_regex(2),
        bare_words_regex(3),
        bare_words_regex(4),
    ];
}

fn bare_words_regex(max: usize) -> Regex {
    let pattern = format!(
        r"^\s*(?P<fact>\w+(?:(?:[ '-]|, )\w+){{0,{}}})\s*[.!]?\s*$",
        max - 1
    );
    Regex::new(&pattern).expect("bare words regex ok")
}

fn bare_words(text: &str, max: usize) -> Option<String> {
    let re = BARE_RES.get(max.checked_sub(1)?)?;
    re.captures(text)
        .and_then(|caps| caps.name("fact"))
        .map(|m| m.as_str().to_string())
}

fn clean_fact(raw: &str) -> String {
    raw.trim().trim_end_matches(['.', ',']).trim().to_string()
}

/// Name declared in `swapped`, if any.
pub fn spot_name(swapped: &str) -> Option<String> {
    FactKind::Name.spot(swapped)
}

/// Field of study declared in `swapped`, if any.
pub fn spot_field(swapped: &str) -> Option<String> {
    FactKind::Field.spot(swapped)
}

/// Home locale declared in `swapped`, if any.
pub fn spot_home(swapped: &str) -> Option<String> {
    FactKind::Home.spot(swapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perspective::swap_perspective;
    use pretty_assertions::assert_eq;

    fn name(raw: &str) -> Option<String> {
        spot_name(&swap_perspective(raw))
    }

    fn field(raw: &str) -> Option<String> {
        spot_field(&swap_perspective(raw))
    }

    fn home(raw: &str) -> Option<String> {
        spot_home(&swap_perspective(raw))
    }

    #[test]
    fn test_name_from_clause() {
        assert_eq!(name("My name is Kara"), Some("Kara".to_string()));
        assert_eq!(name("Hi, my name's Jo-Ann."), Some("Jo-Ann".to_string()));
        assert_eq!(name("I'm called Sam"), Some("Sam".to_string()));
        assert_eq!(name("I am Kara."), Some("Kara".to_string()));
    }

    #[test]
    fn test_you_are_needs_a_name_only_reply() {
        assert_eq!(name("I'm looking for a job"), None);
        assert_eq!(name("I am nervous about interviews"), None);
    }

    #[test]
    fn test_name_from_bare_words() {
        assert_eq!(name("Kara"), Some("Kara".to_string()));
        assert_eq!(name("Kara Lee."), Some("Kara Lee".to_string()));
        assert_eq!(name("Kara Lee Smith"), None);
    }

    #[test]
    fn test_field_from_clause() {
        assert_eq!(
            field("I am studying computer science."),
            Some("computer science".to_string())
        );
        assert_eq!(field("My major is in biology"), Some("biology".to_string()));
    }

    #[test]
    fn test_field_from_bare_words() {
        assert_eq!(
            field("electrical and computer engineering"),
            Some("electrical and computer engineering".to_string())
        );
        assert_eq!(field("I have not decided on anything yet"), None);
    }

    #[test]
    fn test_home_from_clause() {
        assert_eq!(
            home("I grew up in Duluth, Minnesota."),
            Some("Duluth, Minnesota".to_string())
        );
        assert_eq!(home("I'm from St. Paul"), Some("St. Paul".to_string()));
        assert_eq!(home("I lived on a farm"), Some("a farm".to_string()));
    }

    #[test]
    fn test_home_from_bare_words() {
        assert_eq!(home("Duluth, Minnesota"), Some("Duluth, Minnesota".to_string()));
        assert_eq!(home("somewhere far from anything"), None);
    }

    #[test]
    fn test_empty_input_has_no_fact() {
        assert_eq!(name(""), None);
        assert_eq!(field("   "), None);
    }
}
