//! Filter values and their rendering in the engine's query syntax.

/// Words the engine's query parser treats as operators.
const RESERVED: [&str; 4] = ["AND", "OR", "NOT", "TO"];

/// A value compared against a backend field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value: alone it checks for the field's existence, inside a group it also
    /// admits documents missing the field.
    Null,
    /// A string literal, quoted when it contains query syntax.
    Text(String),
    /// An integer literal.
    Integer(i64),
    /// A floating-point literal.
    Float(f64),
    /// A boolean literal.
    Boolean(bool),
    /// A nested group of alternatives.
    List(Vec<Self>),
}

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if this value, or any value nested in it, leaves nothing to compare.
    pub(crate) fn is_empty_group(&self) -> bool {
        match self {
            Self::List(items) => items.is_empty() || items.iter().all(Self::is_empty_group),
            _ => false,
        }
    }

    /// Splits nested groups into scalar alternatives and a null marker.
    pub(crate) fn flatten_into<'a>(&'a self, scalars: &mut Vec<&'a Self>, has_null: &mut bool) {
        match self {
            Self::Null => *has_null = true,
            Self::List(items) => {
                for item in items {
                    item.flatten_into(scalars, has_null);
                }
            }
            scalar => scalars.push(scalar),
        }
    }

    /// Writes a scalar value. Negative numbers are escaped so they are not read as
    /// a prohibit operator.
    pub(crate) fn write_to(&self, out: &mut String) {
        match self {
            Self::Text(s) => write_term(out, s),
            Self::Integer(n) => {
                if *n < 0 {
                    out.push('\\');
                }
                out.push_str(&n.to_string());
            }
            Self::Float(f) => {
                if *f < 0.0 {
                    out.push('\\');
                }
                out.push_str(&f.to_string());
            }
            Self::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Null | Self::List(_) => {}
        }
    }
}

/// Writes a string term, quoting it when it would not parse as a single bare term.
fn write_term(out: &mut String, term: &str) {
    if !needs_quotes(term) {
        out.push_str(term);
        return;
    }
    out.push('"');
    for c in term.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

/// Decides whether a term must be quoted.
fn needs_quotes(term: &str) -> bool {
    let Some(first) = term.chars().next() else {
        return true;
    };
    if first == '-' || first == '+' || RESERVED.contains(&term) {
        return true;
    }
    !term
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(value: impl Into<Value>) -> String {
        let mut out = String::new();
        value.into().write_to(&mut out);
        out
    }

    #[test]
    fn plain_words_stay_bare() {
        assert_eq!(rendered("red"), "red");
        assert_eq!(rendered("t-shirt"), "t-shirt");
        assert_eq!(rendered("größe"), "größe");
    }

    #[test]
    fn syntax_gets_quoted() {
        assert_eq!(rendered("dark red"), "\"dark red\"");
        assert_eq!(rendered("a:b"), "\"a:b\"");
        assert_eq!(rendered("-red"), "\"-red\"");
        assert_eq!(rendered("OR"), "\"OR\"");
        assert_eq!(rendered(""), "\"\"");
        assert_eq!(rendered("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn negative_numbers_escaped() {
        assert_eq!(rendered(-5), "\\-5");
        assert_eq!(rendered(7), "7");
        assert_eq!(rendered(-1.5), "\\-1.5");
        assert_eq!(rendered(true), "true");
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn empty_group_detection() {
        assert!(Value::List(vec![]).is_empty_group());
        assert!(Value::List(vec![Value::List(vec![])]).is_empty_group());
        assert!(!Value::List(vec![Value::Null]).is_empty_group());
        assert!(!Value::from("a").is_empty_group());
    }
}
