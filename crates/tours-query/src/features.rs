use crate::operator::prefix_operators;
use crate::params::{ParamValue, RawParameters};
use crate::query::Query;

pub const DEFAULT_SORT: &str = "-createdAt";
pub const DEFAULT_SELECT: &str = "-__v";
pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 100;

/// Translates request parameters into a [`Query`].
///
/// Built once per request, run through its four stages, then consumed:
///
/// ```
/// use tours_query::{Query, QueryFeatures, RawParameters};
///
/// let params = RawParameters::from_query_string("difficulty=easy&sort=-price&page=2&limit=5");
/// let query = QueryFeatures::new(Query::new(), params)
///     .filter()
///     .sort()
///     .limit()
///     .paginate()
///     .into_query();
/// assert_eq!(query.skip_count(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct QueryFeatures {
    query: Query,
    params: RawParameters,
    filters: RawParameters,
}

impl QueryFeatures {
    pub fn new(query: Query, params: RawParameters) -> Self {
        let filters = params.without_control_keys();
        Self {
            query,
            params,
            filters,
        }
    }

    /// Apply every non-control parameter as a field filter.
    pub fn filter(mut self) -> Self {
        let criteria = prefix_operators(&self.filters.to_document());
        tracing::trace!(?criteria, "applying filter");
        self.query = self.query.filter(criteria);
        self
    }

    /// Apply `sort=a,-b`, or newest-first when absent.
    pub fn sort(mut self) -> Self {
        let spec = match self.params.get("sort").and_then(ParamValue::joined) {
            Some(sort) => comma_to_space(&sort),
            None => DEFAULT_SORT.to_string(),
        };
        self.query = self.query.sort(&spec);
        self
    }

    /// Apply the `fields=a,b` projection, or hide the version key when absent.
    ///
    /// Selects columns, not rows; row limiting happens in [`Self::paginate`].
    pub fn limit(mut self) -> Self {
        let spec = match self.params.get("fields").and_then(ParamValue::joined) {
            Some(fields) => comma_to_space(&fields),
            None => DEFAULT_SELECT.to_string(),
        };
        self.query = self.query.select(&spec);
        self
    }

    /// Apply `page` and `limit` as skip/take.
    pub fn paginate(mut self) -> Self {
        let page = positive_param(&self.params, "page", DEFAULT_PAGE);
        let limit = positive_param(&self.params, "limit", DEFAULT_LIMIT);
        let skip = (page - 1).saturating_mul(limit);
        self.query = self.query.skip(skip).take(limit);
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn into_query(self) -> Query {
        self.query
    }
}

fn comma_to_space(list: &str) -> String {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Integer parameter clamped to at least 1. Missing or non-numeric → `default`.
fn positive_param(params: &RawParameters, key: &str, default: usize) -> usize {
    let Some(raw) = params.get(key).and_then(ParamValue::as_str) else {
        return default;
    };
    match raw.trim().parse::<i64>() {
        Ok(n) => usize::try_from(n.max(1)).unwrap_or(default),
        Err(_) => {
            tracing::debug!(key, value = raw, "non-numeric paging parameter, using default");
            default
        }
    }
}
