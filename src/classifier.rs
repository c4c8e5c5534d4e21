//! Abuse and gibberish filters.
//!
//! Both are stateless predicates over the raw utterance. The gibberish checks
//! are heuristics over word tokens; misfires in either direction are expected.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

/// Words the counselor refuses to engage with.
pub const ABUSIVE_WORDS: [&str; 6] = ["poop", "butt", "dummy", "stupid", "crap", "idiot"];

lazy_static! {
    static ref ABUSE_RE: Regex = {
        let alternation = ABUSIVE_WORDS
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("abuse regex ok")
    };
    static ref TOKEN_RE: Regex = Regex::new(r"\w+").expect("token regex ok");
    // Runs are anchored to the token: either the whole token is one run, or it
    // both starts and ends with one. `y` is neither vowel nor consonant.
    static ref VOWEL_RUN_RES: [Regex; 2] = [
        Regex::new(r"^[aeiou]{4,}$").expect("vowel regex ok"),
        Regex::new(r"^[aeiou]{3,}\w*[aeiou]{3,}$").expect("vowel pair regex ok"),
    ];
    static ref CONSONANT_RUN_RES: [Regex; 2] = [
        Regex::new(r"^[bcdfghjklmnpqrstvwxz]{5,}$").expect("consonant regex ok"),
        Regex::new(r"^[bcdfghjklmnpqrstvwxz]{4,}\w*[bcdfghjklmnpqrstvwxz]{4,}$")
            .expect("consonant pair regex ok"),
    ];
}

/// True iff `text` contains a disallowed word (whole word, any case).
pub fn is_abusive(text: &str) -> bool {
    ABUSE_RE.is_match(text)
}

/// True iff any word token of `text` looks ill-formed.
pub fn is_gibberish(text: &str) -> bool {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .any(|m| token_is_gibberish(m.as_str()))
}

fn token_is_gibberish(token: &str) -> bool {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() >= 16 {
        return true;
    }

    if VOWEL_RUN_RES
        .iter()
        .chain(CONSONANT_RUN_RES.iter())
        .any(|re| re.is_match(token))
    {
        return true;
    }

    repeats_at_least(&chars, 4, 2) || repeats_at_least(&chars, 3, 3)
}

/// Whether some `width`-character window occurs `times` times without overlap.
///
/// Any longer repeated substring contains a repeated window of exactly
/// `width`, so checking that width covers "`width` or more".
fn repeats_at_least(chars: &[char], width: usize, times: usize) -> bool {
    if chars.len() < width * times {
        return false;
    }
    let mut positions: HashMap<&[char], Vec<usize>> = HashMap::new();
    for start in 0..=chars.len() - width {
        positions
            .entry(&chars[start..start + width])
            .or_default()
            .push(start);
    }
    positions.values().any(|starts| {
        let mut count = 0;
        let mut next_free = 0;
        for &start in starts {
            if start >= next_free {
                count += 1;
                next_free = start + width;
            }
        }
        count >= times
    })
}
