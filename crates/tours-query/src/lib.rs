mod error;
mod expression;
mod features;
mod operator;
mod params;
mod parse_filter;
mod projection;
mod query;
mod sort;

pub use error::{FilterParseError, QueryError};
pub use expression::Expression;
pub use features::{DEFAULT_LIMIT, DEFAULT_PAGE, DEFAULT_SELECT, DEFAULT_SORT, QueryFeatures};
pub use operator::{OPERATOR_SIGIL, Operator, prefix_operators, strip_operator_prefix};
pub use params::{CONTROL_KEYS, ParamValue, RawParameters};
pub use parse_filter::parse_filter;
pub use projection::Projection;
pub use query::Query;
pub use sort::{Sort, SortDirection, parse_sort};
