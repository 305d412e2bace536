use crate::{error::InternalError, value::Value};
use regex::{Regex, RegexBuilder};

///
/// Predicate
///
/// Declarative row filter over field paths. Text matching (`Contains`,
/// `Matches`) is always case-insensitive.
///

#[derive(Clone, Debug)]
pub enum Predicate {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Eq { path: String, value: Value },
    Contains { path: String, needle: String },
    Matches { path: String, regex: Regex },
}

impl Predicate {
    #[must_use]
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive substring match; the needle is folded once here.
    #[must_use]
    pub fn contains(path: impl Into<String>, needle: &str) -> Self {
        Self::Contains {
            path: path.into(),
            needle: Value::fold_ci(needle).into_owned(),
        }
    }

    /// Case-insensitive regular-expression match.
    pub fn matches(path: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;

        Ok(Self::Matches {
            path: path.into(),
            regex,
        })
    }

    /// Disjunction of `terms`; an empty term list is `True`, never a
    /// vacuous `False`.
    #[must_use]
    pub fn any(terms: Vec<Self>) -> Self {
        match terms.len() {
            0 => Self::True,
            1 => terms.into_iter().next().unwrap_or(Self::True),
            _ => Self::Or(terms),
        }
    }

    /// Conjunction that folds away `True` operands.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, p) | (p, Self::True) => p,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), p) => {
                left.push(p);
                Self::And(left)
            }
            (p, q) => Self::And(vec![p, q]),
        }
    }

    #[must_use]
    pub const fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }

    /// Evaluate against one record, reading path values through `value_of`.
    pub fn eval<F>(&self, value_of: &mut F) -> Result<bool, InternalError>
    where
        F: FnMut(&str) -> Result<Value, InternalError>,
    {
        match self {
            Self::True => Ok(true),
            Self::False => Ok(false),
            Self::And(terms) => {
                for term in terms {
                    if !term.eval(value_of)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or(terms) => {
                for term in terms {
                    if term.eval(value_of)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Eq { path, value } => Ok(value_of(path)?.loose_eq(value)),
            Self::Contains { path, needle } => Ok(value_of(path)?.contains_folded(needle)),
            Self::Matches { path, regex } => Ok(value_of(path)?
                .search_text()
                .is_some_and(|text| regex.is_match(&text))),
        }
    }
}
