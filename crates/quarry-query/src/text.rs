//! Free-text scanning helpers.

/// Splits `#tag` tokens out of free text.
///
/// A tag runs from `#` up to the next `#`, `(`, `)` or space. Returns the remaining text
/// with whitespace collapsed, and the non-empty tags in order.
pub fn extract_tags(text: &str) -> (String, Vec<String>) {
    let mut rest = String::with_capacity(text.len());
    let mut tags = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '#' {
            rest.push(c);
            continue;
        }
        let mut tag = String::new();
        while let Some(&next) = chars.peek() {
            if matches!(next, '#' | '(' | ')' | ' ') {
                break;
            }
            tag.push(next);
            chars.next();
        }
        if !tag.is_empty() {
            tags.push(tag);
        }
    }
    (collapse_whitespace(&rest), tags)
}

/// Joins the words of `text` with single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true if `text` contains a non-empty double-quoted phrase.
pub fn is_quoted(text: &str) -> bool {
    let quotes: Vec<usize> = text.match_indices('"').map(|(i, _)| i).collect();
    quotes.windows(2).any(|pair| pair[1] > pair[0] + 1)
}

/// Returns true if `text` contains an explicit ` AND ` or ` OR ` connective.
pub fn has_boolean_operator(text: &str) -> bool {
    text.contains(" AND ") || text.contains(" OR ")
}

/// Gives every field of a weighted field list but the last the same `weight`.
///
/// `text_unstemmed^100 text_en tags^20` becomes `text_unstemmed^50 text_en^50 tags^20`:
/// a weight is replaced wherever whitespace follows a field.
pub fn fields_with_weight(fields: &str, weight: u32) -> String {
    let tokens: Vec<&str> = fields.split_whitespace().collect();
    let Some((last, init)) = tokens.split_last() else {
        return String::new();
    };
    let mut out = String::new();
    for token in init {
        out.push_str(strip_weight(token));
        out.push('^');
        out.push_str(&weight.to_string());
        out.push(' ');
    }
    out.push_str(last);
    out
}

/// Removes a trailing `^<digits>` weight.
fn strip_weight(token: &str) -> &str {
    match token.rsplit_once('^') {
        Some((name, digits)) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => token,
    }
}

/// Replaces every `$word` in `text` through `resolve`.
///
/// A word is a run of ASCII letters, digits and `_`. A lone `$` is kept. Fails with the
/// first word `resolve` rejects.
pub fn replace_aliases<'a, F>(text: &str, mut resolve: F) -> Result<String, String>
where
    F: FnMut(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if len == 0 {
            out.push('$');
        } else {
            let word = &after[..len];
            out.push_str(resolve(word).ok_or_else(|| word.to_string())?);
        }
        rest = &after[len..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_extracted() {
        let (rest, tags) = extract_tags("red shoes #sale");
        assert_eq!(rest, "red shoes");
        assert_eq!(tags, vec!["sale"]);
    }

    #[test]
    fn several_tags_and_delimiters() {
        let (rest, tags) = extract_tags("#a#b (x #c) # y");
        assert_eq!(rest, "(x ) y");
        assert_eq!(tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn only_tags_leaves_nothing() {
        let (rest, tags) = extract_tags("  #sale ");
        assert!(rest.is_empty());
        assert_eq!(tags, vec!["sale"]);
    }

    #[test]
    fn quoted_phrases() {
        assert!(is_quoted("\"red shoes\" cheap"));
        assert!(!is_quoted("red shoes"));
        assert!(!is_quoted("empty \"\" quotes"));
        assert!(is_quoted("\"\"x\""));
        assert!(!is_quoted("one \" quote"));
    }

    #[test]
    fn boolean_operators() {
        assert!(has_boolean_operator("red AND blue"));
        assert!(has_boolean_operator("red OR blue"));
        assert!(!has_boolean_operator("ORANGE and ANDES"));
    }

    #[test]
    fn phrase_weights() {
        assert_eq!(
            fields_with_weight("text_unstemmed^100 text_en tags^20", 50),
            "text_unstemmed^50 text_en^50 tags^20"
        );
        assert_eq!(fields_with_weight("", 50), "");
    }

    #[test]
    fn aliases_replaced() {
        let resolve = |w: &str| match w {
            "color" => Some("color_s"),
            _ => None,
        };
        assert_eq!(
            replace_aliases("$color:red OR $color:blue", resolve).unwrap(),
            "color_s:red OR color_s:blue"
        );
        assert_eq!(replace_aliases("price:[$ TO 5]", resolve).unwrap(), "price:[$ TO 5]");
        assert_eq!(
            replace_aliases("$size:1", resolve).unwrap_err(),
            "size".to_string()
        );
    }
}
