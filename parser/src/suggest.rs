//! "Did you mean" suggestions for unrecognized tokens.

use argtree_core::VisibleOption;
use strsim::levenshtein;

const MAX_DISTANCE: usize = 2;
const MAX_SUGGESTIONS: usize = 3;

/// Returns up to three candidates close to `input`, closest first.
///
/// A candidate qualifies within an edit distance of two (compared
/// case-insensitively), or when it starts with `input`.
///
/// # Examples
///
/// ```
/// use argtree_parser::suggest;
///
/// assert_eq!(suggest("strat", ["start", "stop", "status"]), vec!["start"]);
/// assert_eq!(suggest("st", ["start", "stop", "build"]), vec!["stop", "start"]);
/// assert!(suggest("zzz", ["start"]).is_empty());
/// ```
pub fn suggest<'a, I>(input: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let input_lower = input.to_lowercase();
    if input_lower.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let lower = candidate.to_lowercase();
            let distance = levenshtein(&input_lower, &lower);
            (distance <= MAX_DISTANCE || lower.starts_with(&input_lower))
                .then_some((distance, candidate))
        })
        .collect();
    scored.sort();
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, c)| c.to_string())
        .collect()
}

/// Suggests visible options for an unrecognized option token, in the form
/// they would be typed (`--verbose`, `-v`).
pub(crate) fn suggest_options(token: &str, visible: &[VisibleOption<'_>]) -> Vec<String> {
    let input = token.trim_start_matches('-');
    let input = input.split(['=', ':']).next().unwrap_or(input);

    let mut names = Vec::new();
    for option in visible {
        if let Some(long) = &option.definition.long {
            names.push((long.as_str(), format!("--{long}")));
        }
        if let Some(short) = &option.definition.short {
            names.push((short.as_str(), format!("-{short}")));
        }
    }

    suggest(input, names.iter().map(|(bare, _)| *bare))
        .into_iter()
        .filter_map(|hit| {
            names
                .iter()
                .find(|(bare, _)| *bare == hit)
                .map(|(_, display)| display.clone())
        })
        .collect()
}
