//! Comparators and query operators.
//!
//! A [`Comparator`] is what the filter editor shows next to a property
//! ("CONTAINS", "BETWEEN", ">"). A [`QueryOperator`] is what the wire tree
//! carries ("ILIKE", "DURING", ">"). The two are related by a fixed table,
//! [`COMPARATOR_TABLE`].
//!
//! Three comparators (`RELATIVE`, `EQUALS` and `=`) collapse onto the single
//! wire operator `=`. Going back, the operator resolves to
//! [`EQUALITY_COMPARATOR`] unless the decoder knows the property is a date,
//! in which case it becomes `RELATIVE`. Every other operator has exactly one
//! preimage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A predicate kind as shown in the filter editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "BEFORE")]
    Before,
    #[serde(rename = "AFTER")]
    After,
    /// Relative date window such as `P1D`.
    #[serde(rename = "RELATIVE")]
    Relative,
    /// Date interval, `from/to`.
    #[serde(rename = "BETWEEN")]
    Between,
    #[serde(rename = "INTERSECTS")]
    Intersects,
    #[serde(rename = "DWITHIN")]
    Dwithin,
    /// Case-insensitive text match.
    #[serde(rename = "CONTAINS")]
    Contains,
    /// Case-sensitive text match.
    #[serde(rename = "MATCHCASE")]
    MatchCase,
    #[serde(rename = "EQUALS")]
    Equals,
    #[serde(rename = "IS EMPTY")]
    IsEmpty,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">=")]
    Gte,
    /// Numeric range, `{lower, upper}`.
    #[serde(rename = "RANGE")]
    Range,
    /// Geospatial proximity. Has no table entry; encoded as a `proximity`
    /// filter function.
    #[serde(rename = "NEAR")]
    Near,
}

/// A predicate kind as carried by the wire tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryOperator {
    #[serde(rename = "BEFORE")]
    Before,
    #[serde(rename = "AFTER")]
    After,
    #[serde(rename = "DURING")]
    During,
    #[serde(rename = "INTERSECTS")]
    Intersects,
    #[serde(rename = "DWITHIN")]
    Dwithin,
    #[serde(rename = "ILIKE")]
    ILike,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "IS NULL")]
    IsNull,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "BETWEEN")]
    Between,
}

/// The comparator-to-operator table, in its canonical order.
pub const COMPARATOR_TABLE: [(Comparator, QueryOperator); 16] = [
    (Comparator::Before, QueryOperator::Before),
    (Comparator::After, QueryOperator::After),
    (Comparator::Relative, QueryOperator::Eq),
    (Comparator::Between, QueryOperator::During),
    (Comparator::Intersects, QueryOperator::Intersects),
    (Comparator::Dwithin, QueryOperator::Dwithin),
    (Comparator::Contains, QueryOperator::ILike),
    (Comparator::MatchCase, QueryOperator::Like),
    (Comparator::Equals, QueryOperator::Eq),
    (Comparator::IsEmpty, QueryOperator::IsNull),
    (Comparator::Gt, QueryOperator::Gt),
    (Comparator::Lt, QueryOperator::Lt),
    (Comparator::Eq, QueryOperator::Eq),
    (Comparator::Lte, QueryOperator::Lte),
    (Comparator::Gte, QueryOperator::Gte),
    (Comparator::Range, QueryOperator::Between),
];

/// What `=` decodes to when the property is not a date.
///
/// `RELATIVE` and the bare `=` comparator therefore do not survive a round
/// trip over non-date properties.
pub const EQUALITY_COMPARATOR: Comparator = Comparator::Equals;

impl Comparator {
    /// Returns the wire operator for this comparator.
    ///
    /// `NEAR` has no operator of its own and returns `None`.
    pub fn query_operator(self) -> Option<QueryOperator> {
        let op = match self {
            Comparator::Before => QueryOperator::Before,
            Comparator::After => QueryOperator::After,
            Comparator::Relative => QueryOperator::Eq,
            Comparator::Between => QueryOperator::During,
            Comparator::Intersects => QueryOperator::Intersects,
            Comparator::Dwithin => QueryOperator::Dwithin,
            Comparator::Contains => QueryOperator::ILike,
            Comparator::MatchCase => QueryOperator::Like,
            Comparator::Equals => QueryOperator::Eq,
            Comparator::IsEmpty => QueryOperator::IsNull,
            Comparator::Gt => QueryOperator::Gt,
            Comparator::Lt => QueryOperator::Lt,
            Comparator::Eq => QueryOperator::Eq,
            Comparator::Lte => QueryOperator::Lte,
            Comparator::Gte => QueryOperator::Gte,
            Comparator::Range => QueryOperator::Between,
            Comparator::Near => return None,
        };
        Some(op)
    }

    /// Returns the editor label of this comparator.
    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Before => "BEFORE",
            Comparator::After => "AFTER",
            Comparator::Relative => "RELATIVE",
            Comparator::Between => "BETWEEN",
            Comparator::Intersects => "INTERSECTS",
            Comparator::Dwithin => "DWITHIN",
            Comparator::Contains => "CONTAINS",
            Comparator::MatchCase => "MATCHCASE",
            Comparator::Equals => "EQUALS",
            Comparator::IsEmpty => "IS EMPTY",
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Eq => "=",
            Comparator::Lte => "<=",
            Comparator::Gte => ">=",
            Comparator::Range => "RANGE",
            Comparator::Near => "NEAR",
        }
    }

    /// All comparators, table entries first, then `NEAR`.
    pub fn all() -> impl Iterator<Item = Comparator> {
        COMPARATOR_TABLE
            .iter()
            .map(|(comparator, _)| *comparator)
            .chain(std::iter::once(Comparator::Near))
    }
}

impl QueryOperator {
    /// Resolves this operator back to a comparator without any metadata.
    ///
    /// `=` resolves to [`EQUALITY_COMPARATOR`]; the date special case lives
    /// in the leaf decoder, which has the metadata lookup at hand.
    pub fn comparator(self) -> Comparator {
        match self {
            QueryOperator::Before => Comparator::Before,
            QueryOperator::After => Comparator::After,
            QueryOperator::During => Comparator::Between,
            QueryOperator::Intersects => Comparator::Intersects,
            QueryOperator::Dwithin => Comparator::Dwithin,
            QueryOperator::ILike => Comparator::Contains,
            QueryOperator::Like => Comparator::MatchCase,
            QueryOperator::IsNull => Comparator::IsEmpty,
            QueryOperator::Eq => EQUALITY_COMPARATOR,
            QueryOperator::Gt => Comparator::Gt,
            QueryOperator::Lt => Comparator::Lt,
            QueryOperator::Lte => Comparator::Lte,
            QueryOperator::Gte => Comparator::Gte,
            QueryOperator::Between => Comparator::Range,
        }
    }

    /// Returns `true` if more than one comparator encodes to this operator.
    pub fn is_ambiguous(self) -> bool {
        COMPARATOR_TABLE
            .iter()
            .filter(|(_, op)| *op == self)
            .count()
            > 1
    }

    /// Returns the wire spelling of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            QueryOperator::Before => "BEFORE",
            QueryOperator::After => "AFTER",
            QueryOperator::During => "DURING",
            QueryOperator::Intersects => "INTERSECTS",
            QueryOperator::Dwithin => "DWITHIN",
            QueryOperator::ILike => "ILIKE",
            QueryOperator::Like => "LIKE",
            QueryOperator::IsNull => "IS NULL",
            QueryOperator::Eq => "=",
            QueryOperator::Gt => ">",
            QueryOperator::Lt => "<",
            QueryOperator::Lte => "<=",
            QueryOperator::Gte => ">=",
            QueryOperator::Between => "BETWEEN",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Comparator::all()
            .find(|comparator| comparator.as_str() == s)
            .ok_or_else(|| format!("unknown comparator: {s}"))
    }
}
