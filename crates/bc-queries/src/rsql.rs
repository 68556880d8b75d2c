//! RSQL query builder
//!
//! Produces the `q` parameter of list endpoints. An expression is a chain of
//! `selector comparator argument` triples joined by `;` (AND) or `,` (OR):
//!
//! ```text
//! name=like=foo%;status==DONE
//! status=in=(NEW,BUILDING),username==jdoe
//! ```
//!
//! Two front ends share the same writer:
//! - [`query()`] is a typestate chain where an out-of-order call does not compile;
//! - [`RsqlBuilder`] checks the order at runtime and returns [`QueryError`]
//!   before anything malformed is written. Filter forms use this one because
//!   their shape comes from data.

use std::fmt;

use bc_core::error::ConsoleError;
use thiserror::Error;

/// Grammar position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Selector,
    Comparator,
    Operator,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Token::Selector => "selector",
            Token::Comparator => "comparator",
            Token::Operator => "operator",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("expected {expected} but got {found}")]
    OutOfSequence { expected: Token, found: Token },

    #[error("expression ends while a {expected} is expected")]
    Incomplete { expected: Token },

    #[error("selector must not be empty")]
    EmptySelector,

    #[error("comparison {comparison} does not take this kind of argument")]
    ArgumentMismatch { comparison: &'static str },

    #[error("comparison {comparison} needs at least one value")]
    EmptyList { comparison: &'static str },
}

impl From<QueryError> for ConsoleError {
    fn from(err: QueryError) -> Self {
        ConsoleError::Query(err.to_string())
    }
}

/// Comparison operators understood by the REST API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    /// `%` and `_` are wildcards
    Like,
    NotLike,
    IsNull,
    In,
    Out,
}

impl Comparison {
    pub fn token(&self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Neq => "!=",
            Comparison::Lt => "=lt=",
            Comparison::Le => "=le=",
            Comparison::Gt => "=gt=",
            Comparison::Ge => "=ge=",
            Comparison::Like => "=like=",
            Comparison::NotLike => "=notlike=",
            Comparison::IsNull => "=isnull=",
            Comparison::In => "=in=",
            Comparison::Out => "=out=",
        }
    }

    fn accepts(&self, argument: &Argument) -> bool {
        match self {
            Comparison::IsNull => matches!(argument, Argument::Flag(_)),
            Comparison::In | Comparison::Out => matches!(argument, Argument::List(_)),
            _ => matches!(argument, Argument::Value(_)),
        }
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Value(String),
    List(Vec<String>),
    Flag(bool),
}

impl Argument {
    pub fn value(value: impl fmt::Display) -> Self {
        Argument::Value(value.to_string())
    }

    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        Argument::List(values.into_iter().map(|v| v.to_string()).collect())
    }
}

/// `;` joins with AND, `,` with OR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn token(&self) -> char {
        match self {
            Combinator::And => ';',
            Combinator::Or => ',',
        }
    }
}

const RESERVED: &[char] = &[';', ',', '(', ')', '"', '\'', '=', '!', '<', '>', '~'];

/// Quote a value when it would otherwise break the grammar
fn write_value(out: &mut String, value: &str) {
    let needs_quotes =
        value.is_empty() || value.chars().any(|c| c.is_whitespace() || RESERVED.contains(&c));
    if !needs_quotes {
        out.push_str(value);
        return;
    }

    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

/// Runtime-checked RSQL writer
#[derive(Debug, Clone)]
pub struct RsqlBuilder {
    out: String,
    expect: Token,
    empty: bool,
}

impl Default for RsqlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RsqlBuilder {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            expect: Token::Selector,
            empty: true,
        }
    }

    fn expect(&self, found: Token) -> Result<(), QueryError> {
        if self.expect == found {
            Ok(())
        } else {
            Err(QueryError::OutOfSequence {
                expected: self.expect,
                found,
            })
        }
    }

    /// Start a comparison on `field`
    pub fn selector(&mut self, field: &str) -> Result<&mut Self, QueryError> {
        self.expect(Token::Selector)?;
        if field.trim().is_empty() {
            return Err(QueryError::EmptySelector);
        }
        self.push_selector(field);
        Ok(self)
    }

    /// Finish the pending comparison
    pub fn compare(
        &mut self,
        comparison: Comparison,
        argument: Argument,
    ) -> Result<&mut Self, QueryError> {
        self.expect(Token::Comparator)?;
        if !comparison.accepts(&argument) {
            return Err(QueryError::ArgumentMismatch {
                comparison: comparison.token(),
            });
        }
        if matches!(&argument, Argument::List(values) if values.is_empty()) {
            return Err(QueryError::EmptyList {
                comparison: comparison.token(),
            });
        }
        self.push_comparison(comparison, &argument);
        Ok(self)
    }

    /// Join the previous comparison with the next one
    pub fn combine(&mut self, combinator: Combinator) -> Result<&mut Self, QueryError> {
        self.expect(Token::Operator)?;
        self.push_combinator(combinator);
        Ok(self)
    }

    /// The finished expression; an untouched builder yields an empty string
    pub fn finish(self) -> Result<String, QueryError> {
        if self.empty || self.expect == Token::Operator {
            Ok(self.out)
        } else {
            Err(QueryError::Incomplete {
                expected: self.expect,
            })
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    fn push_selector(&mut self, field: &str) {
        self.out.push_str(field.trim());
        self.expect = Token::Comparator;
        self.empty = false;
    }

    fn push_comparison(&mut self, comparison: Comparison, argument: &Argument) {
        self.out.push_str(comparison.token());
        match argument {
            Argument::Value(value) => write_value(&mut self.out, value),
            Argument::Flag(flag) => self.out.push_str(if *flag { "true" } else { "false" }),
            Argument::List(values) => {
                self.out.push('(');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    write_value(&mut self.out, value);
                }
                self.out.push(')');
            }
        }
        self.expect = Token::Operator;
    }

    fn push_combinator(&mut self, combinator: Combinator) {
        self.out.push(combinator.token());
        self.expect = Token::Selector;
    }
}

/// Start a typestate query chain
pub fn query() -> Selector {
    Selector {
        builder: RsqlBuilder::new(),
    }
}

/// Waiting for a field name
#[derive(Debug)]
#[must_use]
pub struct Selector {
    builder: RsqlBuilder,
}

impl Selector {
    /// # Panics
    ///
    /// Panics if `name` is blank.
    pub fn field(mut self, name: &str) -> Comparator {
        assert!(!name.trim().is_empty(), "{}", QueryError::EmptySelector);
        self.builder.push_selector(name);
        Comparator {
            builder: self.builder,
        }
    }
}

/// Waiting for a comparison
#[derive(Debug)]
#[must_use]
pub struct Comparator {
    builder: RsqlBuilder,
}

impl Comparator {
    fn apply(mut self, comparison: Comparison, argument: Argument) -> Operator {
        self.builder.push_comparison(comparison, &argument);
        Operator {
            builder: self.builder,
        }
    }

    pub fn eq(self, value: impl fmt::Display) -> Operator {
        self.apply(Comparison::Eq, Argument::value(value))
    }

    pub fn neq(self, value: impl fmt::Display) -> Operator {
        self.apply(Comparison::Neq, Argument::value(value))
    }

    pub fn lt(self, value: impl fmt::Display) -> Operator {
        self.apply(Comparison::Lt, Argument::value(value))
    }

    pub fn le(self, value: impl fmt::Display) -> Operator {
        self.apply(Comparison::Le, Argument::value(value))
    }

    pub fn gt(self, value: impl fmt::Display) -> Operator {
        self.apply(Comparison::Gt, Argument::value(value))
    }

    pub fn ge(self, value: impl fmt::Display) -> Operator {
        self.apply(Comparison::Ge, Argument::value(value))
    }

    pub fn like(self, pattern: impl fmt::Display) -> Operator {
        self.apply(Comparison::Like, Argument::value(pattern))
    }

    pub fn not_like(self, pattern: impl fmt::Display) -> Operator {
        self.apply(Comparison::NotLike, Argument::value(pattern))
    }

    pub fn is_null(self) -> Operator {
        self.apply(Comparison::IsNull, Argument::Flag(true))
    }

    pub fn is_not_null(self) -> Operator {
        self.apply(Comparison::IsNull, Argument::Flag(false))
    }

    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn in_list<I, V>(self, values: I) -> Operator
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        let argument = Argument::list(values);
        assert!(
            !matches!(&argument, Argument::List(v) if v.is_empty()),
            "{}",
            QueryError::EmptyList { comparison: Comparison::In.token() }
        );
        self.apply(Comparison::In, argument)
    }

    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn out_list<I, V>(self, values: I) -> Operator
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        let argument = Argument::list(values);
        assert!(
            !matches!(&argument, Argument::List(v) if v.is_empty()),
            "{}",
            QueryError::EmptyList { comparison: Comparison::Out.token() }
        );
        self.apply(Comparison::Out, argument)
    }
}

/// A complete comparison; combine with another or end
#[derive(Debug)]
#[must_use]
pub struct Operator {
    builder: RsqlBuilder,
}

impl Operator {
    pub fn and(mut self) -> Selector {
        self.builder.push_combinator(Combinator::And);
        Selector {
            builder: self.builder,
        }
    }

    pub fn or(mut self) -> Selector {
        self.builder.push_combinator(Combinator::Or);
        Selector {
            builder: self.builder,
        }
    }

    pub fn end(self) -> String {
        self.builder.out
    }
}
