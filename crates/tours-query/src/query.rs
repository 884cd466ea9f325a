use bson::Document;

use crate::error::QueryError;
use crate::expression::Expression;
use crate::parse_filter::parse_filter;
use crate::projection::Projection;
use crate::sort::{Sort, parse_sort};

/// A find query under construction.
///
/// Modifiers consume and return the builder, so they chain in any order:
///
/// ```
/// use bson::doc;
/// use tours_query::Query;
///
/// let query = Query::new()
///     .filter(doc! { "price": { "$lt": 500 } })
///     .sort("-ratingsAverage price")
///     .select("name price")
///     .skip(10)
///     .take(10);
/// assert_eq!(query.sort_spec().len(), 2);
/// ```
///
/// Nothing is validated here. Malformed pieces (an unknown `$` operator, a
/// projection mixing inclusion and exclusion) are reported by
/// [`Query::predicate`] and [`Query::projection`] when the query is executed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filter: Document,
    sort: Vec<Sort>,
    select: Option<String>,
    skip: Option<usize>,
    take: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge conditions into the filter. Keys already present are replaced.
    pub fn filter(mut self, criteria: Document) -> Self {
        for (key, value) in criteria {
            self.filter.insert(key, value);
        }
        self
    }

    /// Set the sort order from a space-separated spec, `-field` for descending.
    pub fn sort(mut self, spec: &str) -> Self {
        self.sort = parse_sort(spec);
        self
    }

    /// Set the field selection from a space-separated spec, `-field` to exclude.
    pub fn select(mut self, spec: &str) -> Self {
        self.select = Some(spec.to_string());
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn take(mut self, n: usize) -> Self {
        self.take = Some(n);
        self
    }

    pub fn filter_document(&self) -> &Document {
        &self.filter
    }

    pub fn sort_spec(&self) -> &[Sort] {
        &self.sort
    }

    pub fn select_spec(&self) -> Option<&str> {
        self.select.as_deref()
    }

    pub fn skip_count(&self) -> usize {
        self.skip.unwrap_or(0)
    }

    pub fn take_count(&self) -> Option<usize> {
        self.take
    }

    pub fn predicate(&self) -> Result<Expression, QueryError> {
        Ok(parse_filter(&self.filter)?)
    }

    pub fn projection(&self) -> Result<Option<Projection>, QueryError> {
        match &self.select {
            Some(spec) => Projection::parse(spec),
            None => Ok(None),
        }
    }
}
