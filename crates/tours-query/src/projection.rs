use crate::error::QueryError;

/// Which fields a query returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Only these fields (plus `_id` unless excluded).
    Include { fields: Vec<String>, exclude_id: bool },
    /// Everything except these fields.
    Exclude(Vec<String>),
}

impl Projection {
    /// Parse a space-separated select spec like `"name price"` or `"-__v"`.
    ///
    /// Inclusion and exclusion cannot be mixed, except that `-_id` may
    /// accompany an inclusion list. An empty spec selects nothing special.
    pub fn parse(spec: &str) -> Result<Option<Projection>, QueryError> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for part in spec.split_whitespace() {
            match part.strip_prefix('-') {
                Some("") => continue,
                Some(field) => exclude.push(field.to_string()),
                None => include.push(part.to_string()),
            }
        }

        match (include.is_empty(), exclude.is_empty()) {
            (true, true) => Ok(None),
            (true, false) => Ok(Some(Projection::Exclude(exclude))),
            (false, true) => Ok(Some(Projection::Include {
                fields: include,
                exclude_id: false,
            })),
            (false, false) if exclude.iter().all(|f| f == "_id") => {
                Ok(Some(Projection::Include {
                    fields: include,
                    exclude_id: true,
                }))
            }
            (false, false) => Err(QueryError::MixedProjection(spec.to_string())),
        }
    }
}
