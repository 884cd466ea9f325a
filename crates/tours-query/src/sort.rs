#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Parse a space-separated sort spec like `"price -ratingsAverage"`.
/// A leading `-` means descending.
pub fn parse_sort(spec: &str) -> Vec<Sort> {
    spec.split_whitespace()
        .filter_map(|part| match part.strip_prefix('-') {
            Some("") => None,
            Some(field) => Some(Sort::desc(field)),
            None => Some(Sort::asc(part)),
        })
        .collect()
}
