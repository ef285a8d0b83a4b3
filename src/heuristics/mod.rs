pub mod junk;
pub mod markers;
pub mod names;

pub use junk::*;
pub use markers::*;
pub use names::*;

/// Honorifics and offices recognized in front of a speaker name.
///
/// Matching is case-sensitive so ordinary lowercase words ("general",
/// "judge") never count as titles.
pub const TITLE_WORDS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Miss", "Mx", "Dr", "Prof", "Professor", "Sen", "Senator", "Rep",
    "Representative", "Congressman", "Congresswoman", "President", "Governor", "Gov", "Judge",
    "Justice", "Secretary", "Minister", "Ambassador", "Mayor", "Commissioner", "Chairman",
    "Chairwoman", "General", "Gen", "Colonel", "Col", "Captain", "Capt", "Lt", "Sgt",
    "Officer", "Detective", "Sheriff", "Sir", "Dame", "Lord", "Lady", "Rev", "Reverend",
];

/// Whether a token is a title word, ignoring a trailing period
/// and surrounding punctuation
pub fn is_title_word(token: &str) -> bool {
    let bare = token.trim_matches(|c: char| !c.is_alphanumeric());
    !bare.is_empty() && TITLE_WORDS.contains(&bare)
}
