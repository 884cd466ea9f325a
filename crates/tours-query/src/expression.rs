use bson::Bson;

/// Predicate tree produced by [`crate::parse_filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Matches every document (empty filter).
    All,
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Eq(String, Bson),
    Ne(String, Bson),
    Gt(String, Bson),
    Gte(String, Bson),
    Lt(String, Bson),
    Lte(String, Bson),
    In(String, Vec<Bson>),
    Exists(String, bool),
}
