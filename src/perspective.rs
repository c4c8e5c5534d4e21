//! Pronoun perspective swapping.
//!
//! Rules are authored from the counselor's side ("you need ..."), so user text
//! ("I need ...") is swapped once per turn before anything is matched against it.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Substitutions in priority order. Multi-word and contracted forms come before
/// the single words they start with so that `you are` never becomes `I are`.
pub const PRONOUN_SWAPS: [(&str, &str); 12] = [
    ("i'm", "you are"),
    ("i am", "you are"),
    ("i'll", "you'll"),
    ("i", "you"),
    ("me", "you"),
    ("my", "your"),
    ("you are", "I am"),
    ("you're", "I am"),
    ("your", "my"),
    ("you", "I"),
    ("we", "you"),
    ("our", "your"),
];

lazy_static! {
    static ref PRONOUN_RE: Regex = {
        let alternation = PRONOUN_SWAPS
            .iter()
            .map(|(from, _)| format!(r"\b{}\b", regex::escape(from).replace(' ', r"\s+")))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("(?i){}", alternation)).expect("pronoun regex ok")
    };
}

fn replacement_for(matched: &str) -> &'static str {
    let key = matched
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    PRONOUN_SWAPS
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| *to)
        .unwrap_or("")
}

/// Swaps first and second person in `text`.
///
/// Matching is whole-word and case-insensitive; the rest of the text is left
/// untouched.
///
/// ```rust
/// use elizaos_plugin_eliza_counselor::perspective::swap_perspective;
///
/// assert_eq!(swap_perspective("I need my resume"), "you need your resume");
/// assert_eq!(swap_perspective("you are tired"), "I am tired");
/// ```
pub fn swap_perspective(text: &str) -> String {
    PRONOUN_RE
        .replace_all(text, |caps: &Captures<'_>| replacement_for(&caps[0]))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_to_second_person() {
        assert_eq!(swap_perspective("I need my resume"), "you need your resume");
        assert_eq!(swap_perspective("I'm lost"), "you are lost");
        assert_eq!(swap_perspective("I am lost"), "you are lost");
        assert_eq!(swap_perspective("I'll apply"), "you'll apply");
        assert_eq!(swap_perspective("help me"), "help you");
    }

    #[test]
    fn test_second_to_first_person() {
        assert_eq!(swap_perspective("you are tired"), "I am tired");
        assert_eq!(swap_perspective("You're kind"), "I am kind");
        assert_eq!(swap_perspective("your advice"), "my advice");
        assert_eq!(swap_perspective("can you help"), "can I help");
    }

    #[test]
    fn test_plural() {
        assert_eq!(swap_perspective("we lost our way"), "you lost your way");
    }

    #[test]
    fn test_whole_words_only() {
        assert_eq!(swap_perspective("mystery item"), "mystery item");
        assert_eq!(swap_perspective("youth in our town"), "youth in your town");
    }

    #[test]
    fn test_swap_is_single_pass() {
        assert_eq!(swap_perspective("I like you"), "you like I");
        assert_eq!(swap_perspective("My name is Kara"), "your name is Kara");
    }

    #[test]
    fn test_empty() {
        assert_eq!(swap_perspective(""), "");
    }
}
