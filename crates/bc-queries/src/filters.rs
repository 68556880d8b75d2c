//! Filter sets
//!
//! A list page keeps its active filters as data (one per form field) and
//! renders them through the checked [`RsqlBuilder`] whenever they change.

use std::fmt;

use crate::rsql::{Argument, Combinator, Comparison, QueryError, RsqlBuilder};

/// A single filter condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// The attribute being filtered (e.g. "status", "buildConfigurationName")
    pub attribute: String,
    pub comparison: Comparison,
    pub argument: Argument,
}

impl Filter {
    pub fn new(attribute: impl Into<String>, comparison: Comparison, argument: Argument) -> Self {
        Self {
            attribute: attribute.into(),
            comparison,
            argument,
        }
    }

    pub fn equals(attribute: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::new(attribute, Comparison::Eq, Argument::value(value))
    }

    pub fn like(attribute: impl Into<String>, pattern: impl fmt::Display) -> Self {
        Self::new(attribute, Comparison::Like, Argument::value(pattern))
    }

    /// Case-sensitive substring match
    pub fn contains(attribute: impl Into<String>, text: &str) -> Self {
        Self::like(attribute, format!("%{}%", text))
    }

    pub fn one_of<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        Self::new(attribute, Comparison::In, Argument::list(values))
    }

    pub fn is_null(attribute: impl Into<String>) -> Self {
        Self::new(attribute, Comparison::IsNull, Argument::Flag(true))
    }

    fn write(&self, builder: &mut RsqlBuilder) -> Result<(), QueryError> {
        builder
            .selector(&self.attribute)?
            .compare(self.comparison, self.argument.clone())?;
        Ok(())
    }
}

/// Filters joined by one combinator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: Vec<Filter>,
    combinator: Combinator,
}

impl FilterSet {
    /// All filters must match
    pub fn all() -> Self {
        Self::default()
    }

    /// Any filter may match
    pub fn any() -> Self {
        Self {
            filters: Vec::new(),
            combinator: Combinator::Or,
        }
    }

    pub fn add(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    pub fn with(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replace every filter on `attribute` (a form field changed)
    pub fn set(&mut self, filter: Filter) -> &mut Self {
        self.remove(&filter.attribute);
        self.filters.push(filter);
        self
    }

    pub fn remove(&mut self, attribute: &str) {
        self.filters.retain(|f| f.attribute != attribute);
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// Render as the `q` parameter; an empty set renders as ""
    pub fn to_rsql(&self) -> Result<String, QueryError> {
        let mut builder = RsqlBuilder::new();
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                builder.combine(self.combinator)?;
            }
            filter.write(&mut builder)?;
        }
        builder.finish()
    }
}
