/// Canonicalize a raw transcribed token for lexicon comparison.
///
/// Drops every character that is neither alphanumeric nor whitespace, trims, and lowercases
/// ASCII letters. Lexicon phrases go through the same function when they are authored, so
/// matching is plain string equality.
///
/// ```
/// assert_eq!(hush::normalize::normalize(" Ass."), "ass");
/// assert_eq!(hush::normalize::normalize("Holy  Shit!"), "holy  shit");
/// ```
pub fn normalize(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    kept.trim().to_ascii_lowercase()
}
