//! Sort orders
//!
//! Rendered as the `sort` parameter: `=asc=name` or `=desc=submitTime`,
//! several criteria joined by `,`.

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// `=asc=`
    #[default]
    Asc,
    /// `=desc=`, newest first for time columns
    Desc,
}

impl SortDirection {
    pub fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if token.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn reverse(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// One column of a sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCriterion {
    pub attribute: String,
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn new(attribute: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            attribute: attribute.into(),
            direction,
        }
    }

    pub fn asc(attribute: impl Into<String>) -> Self {
        Self::new(attribute, SortDirection::Asc)
    }

    pub fn desc(attribute: impl Into<String>) -> Self {
        Self::new(attribute, SortDirection::Desc)
    }

    pub fn reversed(mut self) -> Self {
        self.direction = self.direction.reverse();
        self
    }

    fn to_param(&self) -> String {
        format!("={}={}", self.direction.as_str(), self.attribute)
    }

    /// Parse `=asc=name`
    fn parse(part: &str) -> Option<Self> {
        let rest = part.trim().strip_prefix('=')?;
        let (direction, attribute) = rest.split_once('=')?;
        let direction = SortDirection::parse(direction)?;
        if attribute.is_empty() {
            return None;
        }
        Some(Self::new(attribute, direction))
    }
}

/// Ordered sort columns; the first one is primary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOrder {
    criteria: Vec<SortCriterion>,
}

impl SortOrder {
    pub fn new() -> Self {
        Self { criteria: vec![] }
    }

    pub fn by(attribute: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            criteria: vec![SortCriterion::new(attribute, direction)],
        }
    }

    pub fn by_asc(attribute: impl Into<String>) -> Self {
        Self::by(attribute, SortDirection::Asc)
    }

    pub fn by_desc(attribute: impl Into<String>) -> Self {
        Self::by(attribute, SortDirection::Desc)
    }

    /// Add a criterion (builder pattern)
    pub fn then(mut self, criterion: SortCriterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn primary(&self) -> Option<&SortCriterion> {
        self.criteria.first()
    }

    /// Clicking a column header: flip if it is already the primary sort, else sort by it
    pub fn toggle(&mut self, attribute: &str) {
        match self.criteria.first_mut() {
            Some(first) if first.attribute == attribute => {
                first.direction = first.direction.reverse();
            }
            _ => {
                self.criteria = vec![SortCriterion::asc(attribute)];
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Value of the `sort` parameter
    pub fn to_param(&self) -> String {
        self.criteria
            .iter()
            .map(SortCriterion::to_param)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse a stored `sort` value; unparsable parts are skipped
    pub fn parse(param: &str) -> Self {
        Self {
            criteria: param.split(',').filter_map(SortCriterion::parse).collect(),
        }
    }
}

/// Newest builds first
pub fn default_build_sort() -> SortOrder {
    SortOrder::by_desc("submitTime")
}
