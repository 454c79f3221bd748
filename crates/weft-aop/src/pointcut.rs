//! Pointcuts: predicates selecting which (type, method) pairs an advice
//! applies to.
//!
//! A pointcut pairs a type-level predicate (`ClassFilter`) with a
//! method-level predicate (`MethodMatcher`); both must hold for a match.
//! Matching is a pure function of the method identity, evaluated once at
//! proxy-build time.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::error::{AopError, Result};
use crate::target::MethodRef;

/// Type-level predicate.
pub trait ClassFilter: Send + Sync {
    fn matches(&self, type_name: &str) -> bool;
}

/// Method-level predicate.
///
/// The runtime hook is an extension point for matchers that additionally
/// need argument values; none of the shipped matchers use it, and the
/// engine only consults the static path.
pub trait MethodMatcher: Send + Sync {
    fn matches(&self, method: &MethodRef) -> bool;

    /// Whether this matcher needs argument values.
    fn is_runtime(&self) -> bool {
        false
    }

    /// Argument-aware matching; only meaningful when `is_runtime` is true.
    fn matches_runtime(&self, _method: &MethodRef, _args: &Value) -> bool {
        false
    }
}

struct TrueClassFilter;

impl ClassFilter for TrueClassFilter {
    fn matches(&self, _type_name: &str) -> bool {
        true
    }
}

struct TrueMethodMatcher;

impl MethodMatcher for TrueMethodMatcher {
    fn matches(&self, _method: &MethodRef) -> bool {
        true
    }
}

/// A (class filter, method matcher) pair.
#[derive(Clone)]
pub struct Pointcut {
    class_filter: Arc<dyn ClassFilter>,
    method_matcher: Arc<dyn MethodMatcher>,
}

impl Pointcut {
    pub fn new(
        class_filter: Arc<dyn ClassFilter>,
        method_matcher: Arc<dyn MethodMatcher>,
    ) -> Self {
        Self {
            class_filter,
            method_matcher,
        }
    }

    /// Apply everywhere: both predicates always hold.
    pub fn always() -> Self {
        Self::new(Arc::new(TrueClassFilter), Arc::new(TrueMethodMatcher))
    }

    /// Name-glob pointcut over a set of method-name patterns.
    pub fn name_match<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            Arc::new(TrueClassFilter),
            Arc::new(NameMatchMethodMatcher::new(patterns)),
        )
    }

    /// Expression pointcut, parsed up front so malformed expressions fail
    /// at wiring time rather than at call time.
    pub fn expression(expr: &str) -> Result<Self> {
        Ok(Self::new(
            Arc::new(TrueClassFilter),
            Arc::new(ExpressionMethodMatcher::parse(expr)?),
        ))
    }

    /// Whether this pointcut selects the given call site.
    pub fn matches(&self, method: &MethodRef) -> bool {
        self.class_filter.matches(&method.type_name) && self.method_matcher.matches(method)
    }
}

impl fmt::Debug for Pointcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pointcut").finish_non_exhaustive()
    }
}

/// Matches when the method's simple name matches any configured pattern.
///
/// A pattern is an exact name, a `prefix*` glob, or a `*suffix` glob. An
/// empty pattern set never matches.
pub struct NameMatchMethodMatcher {
    mapped_names: Vec<String>,
}

impl NameMatchMethodMatcher {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mapped_names: patterns.into_iter().map(Into::into).collect(),
        }
    }

    fn matches_pattern(pattern: &str, name: &str) -> bool {
        if let Some(prefix) = pattern.strip_suffix('*') {
            name.starts_with(prefix)
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            name.ends_with(suffix)
        } else {
            pattern == name
        }
    }
}

impl MethodMatcher for NameMatchMethodMatcher {
    fn matches(&self, method: &MethodRef) -> bool {
        self.mapped_names
            .iter()
            .any(|pattern| Self::matches_pattern(pattern, &method.name))
    }
}

/// Expression matcher: `execution(* <path-pattern>(..))` terms combined
/// with `&&` and prefix `!`, evaluated left to right with short-circuit AND.
///
/// In a path pattern, `*` matches within one dotted segment and `..`
/// crosses any number of segments. Patterns are compiled to anchored
/// regexes at parse time; a candidate that no term resolves against is a
/// no-match, never an error.
pub struct ExpressionMethodMatcher {
    expression: String,
    terms: Vec<ExpressionTerm>,
}

struct ExpressionTerm {
    negated: bool,
    pattern: Regex,
}

impl ExpressionMethodMatcher {
    pub fn parse(expr: &str) -> Result<Self> {
        let mut terms = Vec::new();
        for raw in expr.split("&&") {
            let mut term = raw.trim();
            if term.is_empty() {
                return Err(AopError::Expression(format!("empty term in '{expr}'")));
            }
            let negated = term.starts_with('!');
            if negated {
                term = term[1..].trim_start();
            }
            let inner = term
                .strip_prefix("execution(")
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(|| {
                    AopError::Expression(format!("expected execution(...), got '{term}'"))
                })?;
            terms.push(ExpressionTerm {
                negated,
                pattern: compile_path_pattern(inner.trim())?,
            });
        }
        Ok(Self {
            expression: expr.to_string(),
            terms,
        })
    }

    /// The source expression this matcher was parsed from.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl MethodMatcher for ExpressionMethodMatcher {
    fn matches(&self, method: &MethodRef) -> bool {
        let path = method.path();
        for term in &self.terms {
            let mut hit = term.pattern.is_match(&path);
            if term.negated {
                hit = !hit;
            }
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Translate a path pattern to an anchored regex.
fn compile_path_pattern(pattern: &str) -> Result<Regex> {
    let mut body = pattern;
    // Optional return-type wildcard and argument tail, as in
    // `* hello.app..*(..)`.
    if let Some(rest) = body.strip_prefix("* ") {
        body = rest.trim_start();
    }
    if let Some(rest) = body.strip_suffix("(..)") {
        body = rest;
    }
    if body.is_empty() {
        return Err(AopError::Expression(format!("empty pattern in '{pattern}'")));
    }

    let mut regex = String::from("^");
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if chars.peek() == Some(&'.') {
                    chars.next();
                    regex.push_str("\\.(?:[^.]+\\.)*");
                } else {
                    regex.push_str("\\.");
                }
            }
            '*' => regex.push_str("[^.]*"),
            c if c.is_alphanumeric() || c == '_' => regex.push(c),
            other => {
                return Err(AopError::Expression(format!(
                    "unsupported character '{other}' in pattern '{pattern}'"
                )));
            }
        }
    }
    regex.push('$');
    Regex::new(&regex).map_err(|e| AopError::Expression(e.to_string()))
}
