//! Redistribution of flat highlight snippets over a field's stored values.

use std::mem;

use serde::Serialize;

/// Marker the engine wraps around matched terms.
pub const EMPHASIS: &str = "<em>";

/// One stored value of a text field with the snippets matched inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightedText {
    /// The stored value.
    pub text: String,
    /// Snippets of this value, at most one window.
    pub snippets: Vec<String>,
}

/// Outcome of [`regroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regrouped {
    /// Snippets per stored value, one entry per value.
    pub per_value: Vec<Vec<String>>,
    /// True if snippets were left over after every stored value had a window.
    pub overflow: bool,
}

/// Splits `snippets` into windows of `window` snippets, one per stored value.
///
/// The engine returns the snippets of every value of a multi-valued field as one list.
/// A snippet without emphasis means a value had no match; it advances to the next
/// value, but only when there are exactly as many snippets as values. Otherwise it is
/// kept like any other snippet. A window closes when full, and the last open window
/// is kept as is. Snippets beyond the last value stop the distribution.
pub fn regroup(value_count: usize, snippets: &[String], window: usize) -> Regrouped {
    let window = window.max(1);
    let aligned = value_count == snippets.len();
    let mut per_value = vec![Vec::new(); value_count];
    let mut next_value = 0;
    let mut current: Option<usize> = None;
    let mut open = Vec::with_capacity(window);
    let mut overflow = false;

    for snippet in snippets {
        if aligned && !snippet.contains(EMPHASIS) {
            next_value += 1;
            continue;
        }
        let index = match current {
            Some(index) => index,
            None if next_value >= value_count => {
                overflow = true;
                break;
            }
            None => {
                let index = next_value;
                next_value += 1;
                current = Some(index);
                index
            }
        };
        open.push(snippet.clone());
        if open.len() >= window {
            per_value[index] = mem::take(&mut open);
            current = None;
        }
    }
    if let Some(index) = current {
        per_value[index] = open;
    }
    Regrouped {
        per_value,
        overflow,
    }
}
