//! Term suggestions for partially typed input.

use crate::{BackendRequest, TAGS_FIELD};

/// Request handler for term lookups.
pub const TERMS_HANDLER: &str = "/terms";

/// A term lookup for the last word of some input, and how to splice results back in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestRequest {
    /// The `/terms` request to send.
    request: BackendRequest,
    /// Input up to and including the last space.
    rest: String,
    /// `#` when the last word is a tag.
    prefix: &'static str,
}

impl SuggestRequest {
    /// The request to send.
    pub fn request(&self) -> &BackendRequest {
        &self.request
    }

    /// Input words kept in front of every suggestion.
    pub fn rest(&self) -> &str {
        &self.rest
    }

    /// Completes the input with every returned term.
    pub fn suggestions<I, S>(&self, terms: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        terms
            .into_iter()
            .map(|term| format!("{}{}{}", self.rest, self.prefix, term.as_ref()))
            .collect()
    }
}

/// Builds a term lookup for the last word of `input`.
///
/// Brackets are dropped. A word starting with `#` is looked up in the tags field.
///
/// ```
/// use quarry_query::suggest_request;
///
/// let req = suggest_request("red #sa");
/// assert_eq!(req.request().get("terms.fl"), Some("tags"));
/// assert_eq!(req.request().get("terms.regex"), Some(".*sa.*"));
/// assert_eq!(req.suggestions(["sale"]), ["red #sale"]);
/// ```
pub fn suggest_request(input: &str) -> SuggestRequest {
    let input: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '[' | ']'))
        .collect();
    let (rest, mut word) = match input.rfind(' ') {
        Some(index) if index > 0 => (&input[..=index], &input[index + 1..]),
        _ => ("", input.as_str()),
    };

    let mut request = BackendRequest::new(TERMS_HANDLER);
    let mut prefix = "";
    if let Some(tag) = word.strip_prefix('#') {
        word = tag;
        request.set("terms.fl", TAGS_FIELD);
        prefix = "#";
    }
    if !word.trim().is_empty() {
        request.set("terms.regex", format!(".*{word}.*"));
    }
    SuggestRequest {
        request,
        rest: rest.to_string(),
        prefix,
    }
}
