//! JSON:API query building.
//!
//! Turns repository call arguments into the standard query conventions:
//! `filter[field]=v1,v2`, `sort=field,-other`, `page[limit]=n`,
//! `page[offset]=n` and `include=rel1,rel2`.
//!
//! List-valued filters are joined with `,` and the server receives one
//! string. A value that itself contains a comma cannot be told apart from two
//! values on the other side; callers must not rely on embedded commas
//! surviving.

use std::collections::BTreeMap;

/// A filter value: one string or several to be matched as alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// A single value
    One(String),
    /// Several values, sent comma-joined
    Many(Vec<String>),
}

impl FilterValue {
    /// Encode the value as it goes on the wire.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::One(value) => value.clone(),
            Self::Many(values) => values.join(","),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FilterValue {
    fn from(values: [&str; N]) -> Self {
        Self::Many(values.iter().map(|v| (*v).to_string()).collect())
    }
}

/// Filter criteria keyed by field name.
///
/// ```rust
/// use jsonapi_repository::Criteria;
///
/// let criteria = Criteria::new()
///     .with("status", "active")
///     .with("role", ["admin", "owner"]);
/// assert_eq!(criteria.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria(BTreeMap<String, FilterValue>);

impl Criteria {
    /// Create empty criteria.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a criterion, replacing any previous value for the field.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over criteria in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }
}

/// Sort directives in caller order, one per field.
///
/// A direction equal to `"asc"` (any case) sorts ascending; every other string
/// sorts descending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy(Vec<(String, String)>);

impl OrderBy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field and its direction. A field already present keeps its
    /// position and takes the new direction.
    #[must_use]
    pub fn then(mut self, field: impl Into<String>, direction: impl Into<String>) -> Self {
        let field = field.into();
        let direction = direction.into();
        match self.0.iter().position(|(f, _)| *f == field) {
            Some(index) => self.0[index].1 = direction,
            None => self.0.push((field, direction)),
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Encode each directive as a JSON:API sort field.
    #[must_use]
    pub fn sort_fields(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|(field, direction)| {
                if direction.eq_ignore_ascii_case("asc") {
                    field.clone()
                } else {
                    format!("-{field}")
                }
            })
            .collect()
    }
}

impl<F: Into<String>, D: Into<String>> FromIterator<(F, D)> for OrderBy {
    fn from_iter<I: IntoIterator<Item = (F, D)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |order_by, (field, direction)| order_by.then(field, direction))
    }
}

/// Page window for collection requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Query parameters for one GET request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub filter: Option<BTreeMap<String, String>>,
    pub sort: Option<Vec<String>>,
    pub page: Option<Page>,
    pub include: Option<Vec<String>>,
}

impl QueryParams {
    /// Build query parameters from repository call arguments.
    #[must_use]
    pub fn build(
        criteria: &Criteria,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Self {
        let filter = (!criteria.is_empty()).then(|| {
            criteria
                .iter()
                .map(|(field, value)| (field.clone(), value.encode()))
                .collect()
        });

        let sort = order_by
            .filter(|o| !o.is_empty())
            .map(OrderBy::sort_fields);

        let page = (limit.is_some() || offset.is_some()).then_some(Page { limit, offset });

        Self {
            filter,
            sort,
            page,
            include: None,
        }
    }

    /// Attach an include list. An empty list clears it.
    #[must_use]
    pub fn with_include(mut self, include: &[String]) -> Self {
        self.include = (!include.is_empty()).then(|| include.to_vec());
        self
    }

    /// Flatten into ordered key/value pairs: filters, sort, page, include.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(filter) = &self.filter {
            for (field, value) in filter {
                pairs.push((format!("filter[{field}]"), value.clone()));
            }
        }

        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.join(",")));
        }

        if let Some(page) = &self.page {
            if let Some(limit) = page.limit {
                pairs.push(("page[limit]".to_string(), limit.to_string()));
            }
            if let Some(offset) = page.offset {
                pairs.push(("page[offset]".to_string(), offset.to_string()));
            }
        }

        if let Some(include) = &self.include {
            pairs.push(("include".to_string(), include.join(",")));
        }

        pairs
    }

    /// Render the pairs as an unescaped query string, for logs and tests.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        pairs_to_string(&self.to_pairs())
    }
}

/// Join key/value pairs with `=` and `&`, without percent-encoding.
#[must_use]
pub fn pairs_to_string(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}
