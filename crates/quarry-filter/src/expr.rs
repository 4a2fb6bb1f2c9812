//! Filter expression tree.
//!
//! Rendering threads two flags top-down: `negated` and `allows_null`. Negation and
//! null admission are toggles, so wrapping twice restores the original meaning.

use std::fmt;

use crate::{FilterError, LocalParams, Value};

/// Range expression matching any document that has a value in the field.
pub const EXISTS: &str = "[* TO *]";

/// Boolean connective between two filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Both sides must match.
    And,
    /// Either side must match.
    Or,
}

impl Operator {
    /// Returns the connective to emit under the given negation (De Morgan).
    pub fn resolve(self, negated: bool) -> Self {
        match (self, negated) {
            (Self::And, true) => Self::Or,
            (Self::Or, true) => Self::And,
            (op, false) => op,
        }
    }

    /// Returns the query-syntax keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Comparison of one backend field against one or more values.
///
/// Always holds at least one value; construction goes through [`Filter::direct`] or
/// [`Filter::untagged`].
#[derive(Debug, Clone, PartialEq)]
pub struct DirectFilter {
    /// Backend field name.
    field: String,
    /// Tag used to exclude this filter from facet counts.
    tag: Option<String>,
    /// Alternatives, OR'd together.
    values: Vec<Value>,
}

impl DirectFilter {
    /// Backend field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Exclusion tag, if any.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// The compared values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Writes the comparison under the given flags.
    fn render(&self, out: &mut String, negated: bool, allows_null: bool) {
        let mut scalars = Vec::new();
        let mut has_null = false;
        for value in &self.values {
            value.flatten_into(&mut scalars, &mut has_null);
        }
        // A null next to real values means "these values, or no value at all".
        let or_missing = allows_null || (has_null && !scalars.is_empty());

        if or_missing {
            out.push('(');
        }
        if negated {
            out.push('-');
        }
        out.push_str(&self.field);
        out.push(':');
        match scalars.as_slice() {
            [] => out.push_str(EXISTS),
            [single] => single.write_to(out),
            many => {
                out.push('(');
                for (i, value) in many.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    value.write_to(out);
                }
                out.push(')');
            }
        }
        if or_missing {
            out.push_str(" OR (*:* NOT ");
            out.push_str(&self.field);
            out.push(':');
            out.push_str(EXISTS);
            out.push_str("))");
        }
    }
}

/// An immutable filter-query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field comparison.
    Direct(DirectFilter),
    /// Two filters joined by a connective.
    Boolean {
        /// Left-hand side.
        first: Box<Self>,
        /// Right-hand side.
        second: Box<Self>,
        /// Connective, before negation is applied.
        op: Operator,
    },
    /// Flips negation for the inner filter.
    Negated(Box<Self>),
    /// Flips null admission for the inner filter.
    AllowsNull(Box<Self>),
    /// Attaches an opaque local parameter without changing the boolean meaning.
    Parameterized {
        /// The decorated filter.
        inner: Box<Self>,
        /// Raw parameter text, e.g. `cache=false`.
        param: String,
    },
    /// Literal filter text, passed through untouched.
    Raw(String),
}

impl Filter {
    /// Creates a tagged comparison of `field` against `values`.
    ///
    /// Fails with [`FilterError::InvalidExpression`] if `values` is empty or holds only
    /// empty groups.
    pub fn direct<V>(
        field: impl Into<String>,
        tag: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, FilterError>
    where
        V: Into<Value>,
    {
        Self::build_direct(field.into(), Some(tag.into()), values)
    }

    /// Creates an untagged comparison of `field` against `values`.
    pub fn untagged<V>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, FilterError>
    where
        V: Into<Value>,
    {
        Self::build_direct(field.into(), None, values)
    }

    /// Shared constructor for direct filters.
    fn build_direct<V>(
        field: String,
        tag: Option<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, FilterError>
    where
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.iter().all(Value::is_empty_group) {
            return Err(FilterError::InvalidExpression { field });
        }
        Ok(Self::Direct(DirectFilter { field, tag, values }))
    }

    /// Creates a literal filter.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    /// Joins with `other`; both must match.
    pub fn and(self, other: Self) -> Self {
        self.join(other, Operator::And)
    }

    /// Joins with `other`; either may match.
    pub fn or(self, other: Self) -> Self {
        self.join(other, Operator::Or)
    }

    /// Joins with `other` using `op`.
    pub fn join(self, other: Self, op: Operator) -> Self {
        Self::Boolean {
            first: Box::new(self),
            second: Box::new(other),
            op,
        }
    }

    /// Inverts this filter.
    pub fn negated(self) -> Self {
        Self::Negated(Box::new(self))
    }

    /// Also matches documents that have no value in the filtered field.
    pub fn allows_null_values(self) -> Self {
        Self::AllowsNull(Box::new(self))
    }

    /// Asks the engine not to cache this filter.
    pub fn uncached(self) -> Self {
        self.with_param("cache=false")
    }

    /// Marks this filter as uncached and post-filtered at the given cost.
    pub fn with_cost(self, cost: u32) -> Self {
        self.with_param(format!("cache=false cost={cost}"))
    }

    /// Attaches a raw local parameter.
    pub fn with_param(self, param: impl Into<String>) -> Self {
        Self::Parameterized {
            inner: Box::new(self),
            param: param.into(),
        }
    }

    /// Renders the complete filter-query fragment, local-parameter prefix included.
    pub fn apply(&self) -> String {
        let mut params = LocalParams::new();
        self.collect_params(&mut params);
        let mut out = params.finish();
        self.render(&mut out, false, false);
        out
    }

    /// Returns the exclusion tag declared in the local-parameter prefix.
    ///
    /// Only a direct filter at the end of the decorator chain declares one; a boolean
    /// clause carries no tag of its own.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Direct(direct) => direct.tag(),
            Self::Negated(inner) | Self::AllowsNull(inner) | Self::Parameterized { inner, .. } => {
                inner.tag()
            }
            Self::Boolean { .. } | Self::Raw(_) => None,
        }
    }

    /// Walks the decorator chain collecting local parameters, innermost first.
    ///
    /// A boolean node ends the chain: a tag from one side would label the whole clause.
    fn collect_params(&self, params: &mut LocalParams) {
        match self {
            Self::Direct(direct) => {
                if let Some(tag) = direct.tag() {
                    params.add_pair("tag", tag);
                }
            }
            Self::Negated(inner) | Self::AllowsNull(inner) => inner.collect_params(params),
            Self::Parameterized { inner, param } => {
                inner.collect_params(params);
                params.add(param);
            }
            Self::Boolean { .. } | Self::Raw(_) => {}
        }
    }

    /// Writes the boolean body under the given flags.
    fn render(&self, out: &mut String, negated: bool, allows_null: bool) {
        match self {
            Self::Direct(direct) => direct.render(out, negated, allows_null),
            Self::Boolean { first, second, op } => {
                first.render(out, negated, allows_null);
                out.push(' ');
                out.push_str(op.resolve(negated).as_str());
                out.push(' ');
                second.render(out, negated, allows_null);
            }
            Self::Negated(inner) => inner.render(out, !negated, allows_null),
            Self::AllowsNull(inner) => inner.render(out, negated, !allows_null),
            Self::Parameterized { inner, .. } => inner.render(out, negated, allows_null),
            Self::Raw(text) => out.push_str(text),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.apply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Filter {
        Filter::direct("color_s", "color", ["red"]).unwrap()
    }

    fn size(n: i64) -> Filter {
        Filter::untagged("size_i", [n]).unwrap()
    }

    #[test]
    fn empty_values_rejected() {
        let err = Filter::direct("color_s", "color", Vec::<Value>::new()).unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidExpression {
                field: "color_s".into()
            }
        );
    }

    #[test]
    fn empty_nested_group_rejected() {
        let result = Filter::untagged("color_s", [Value::List(vec![])]);
        assert!(result.is_err());
    }

    #[test]
    fn single_value() {
        assert_eq!(size(3).apply(), "size_i:3");
    }

    #[test]
    fn negated_single_value() {
        assert_eq!(size(3).negated().apply(), "-size_i:3");
    }

    #[test]
    fn double_negation_cancels() {
        assert_eq!(size(3).negated().negated().apply(), "size_i:3");
    }

    #[test]
    fn tag_becomes_local_param() {
        assert_eq!(red().apply(), "{!tag=color}color_s:red");
        assert_eq!(red().negated().apply(), "{!tag=color}-color_s:red");
    }

    #[test]
    fn multiple_values_or_list() {
        let f = Filter::untagged("color_s", ["red", "dark blue"]).unwrap();
        assert_eq!(f.apply(), "color_s:(red \"dark blue\")");
    }

    #[test]
    fn negative_numbers_in_list() {
        let f = Filter::untagged("delta_i", [-1, 2]).unwrap();
        assert_eq!(f.apply(), "delta_i:(\\-1 2)");
    }

    #[test]
    fn null_is_existence_check() {
        let f = Filter::untagged("color_s", [Value::Null]).unwrap();
        assert_eq!(f.apply(), "color_s:[* TO *]");
    }

    #[test]
    fn null_with_allows_null() {
        let f = Filter::untagged("color_s", [Value::Null])
            .unwrap()
            .allows_null_values();
        assert_eq!(
            f.apply(),
            "(color_s:[* TO *] OR (*:* NOT color_s:[* TO *]))"
        );
    }

    #[test]
    fn value_with_allows_null() {
        let f = size(3).allows_null_values();
        assert_eq!(f.apply(), "(size_i:3 OR (*:* NOT size_i:[* TO *]))");
    }

    #[test]
    fn allows_null_toggles() {
        let f = size(3).allows_null_values().allows_null_values();
        assert_eq!(f.apply(), "size_i:3");
    }

    #[test]
    fn null_inside_group_admits_missing() {
        let f = Filter::untagged(
            "color_s",
            [Value::from(vec![Value::from("red"), Value::Null, Value::from("blue")])],
        )
        .unwrap();
        assert_eq!(
            f.apply(),
            "(color_s:(red blue) OR (*:* NOT color_s:[* TO *]))"
        );
    }

    #[test]
    fn boolean_and() {
        assert_eq!(size(1).and(size(2)).apply(), "size_i:1 AND size_i:2");
    }

    #[test]
    fn negated_boolean_applies_de_morgan() {
        assert_eq!(
            size(1).and(size(2)).negated().apply(),
            "-size_i:1 OR -size_i:2"
        );
        assert_eq!(
            size(1).or(size(2)).negated().apply(),
            "-size_i:1 AND -size_i:2"
        );
    }

    #[test]
    fn negation_inside_boolean_only_affects_its_side() {
        let f = size(1).and(size(2).negated());
        assert_eq!(f.apply(), "size_i:1 AND -size_i:2");
    }

    #[test]
    fn boolean_contributes_no_tag() {
        let f = red().or(size(2));
        assert_eq!(f.apply(), "color_s:red OR size_i:2");
        assert_eq!(f.tag(), None);
    }

    #[test]
    fn tag_found_through_decorators() {
        assert_eq!(red().negated().allows_null_values().uncached().tag(), Some("color"));
        assert_eq!(size(1).negated().tag(), None);
    }

    #[test]
    fn parameterized_collects_after_inner() {
        assert_eq!(red().uncached().apply(), "{!tag=color cache=false}color_s:red");
        assert_eq!(
            size(1).with_cost(200).apply(),
            "{!cache=false cost=200}size_i:1"
        );
    }

    #[test]
    fn parameters_collected_through_negation() {
        let f = red().uncached().negated();
        assert_eq!(f.apply(), "{!tag=color cache=false}-color_s:red");
    }

    #[test]
    fn raw_passthrough() {
        let f = Filter::raw("{!geofilt sfield=loc}");
        assert_eq!(f.apply(), "{!geofilt sfield=loc}");
        assert!(f.tag().is_none());
    }

    #[test]
    fn display_matches_apply() {
        assert_eq!(red().to_string(), red().apply());
    }

    #[test]
    fn operator_resolution() {
        assert_eq!(Operator::And.resolve(false), Operator::And);
        assert_eq!(Operator::And.resolve(true), Operator::Or);
        assert_eq!(Operator::Or.resolve(true), Operator::And);
    }
}
