//! Operator taxonomy for query expressions
//!
//! Five disjoint operator families tag the expression nodes. Every family is
//! a closed enum, and the compiler pattern-matches exhaustively over the
//! values legal for each node kind. Operators without a wire mapping
//! (`not`, `inPast`, and a few projections) surface as typed compile errors
//! instead of silently defaulting.

use std::fmt;

// ============================================================================
// Operator Families
// ============================================================================

/// Null-test operators applied to a single operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// Field value is null
    IsNull,
    /// Field value is not null
    IsNotNull,
}

/// Comparison and composition operators applied to two operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOperator {
    /// Equal
    Eq,
    /// Not equal
    Neq,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Logical conjunction
    And,
    /// Logical disjunction
    Or,
    /// Logical negation (reserved, no wire mapping)
    Not,
    /// SQL LIKE pattern match
    Like,
    /// Membership in a literal list
    In,
    /// Relative past range, expanded into a gte/lte pair at build time
    InPast,
    /// Array overlaps at least one of the given values
    HasAny,
    /// Array contains every one of the given values
    HasAll,
}

/// Aggregates applied over a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOperator {
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// Row count
    Count,
    /// Count of distinct values
    CountDistinct,
    /// Arithmetic mean
    Avg,
    /// Arithmetic mean over distinct values
    AvgDistinct,
    /// Sum of values
    Sum,
}

/// Calendar and time component projections of a temporal field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionOperator {
    /// Day of month (1-31)
    Day,
    /// Day of week (reserved, no wire mapping)
    DayOfWeek,
    /// Week of year (reserved, no wire mapping)
    Week,
    /// Month of year (1-12)
    Month,
    /// Calendar year
    Year,
    /// Date part of a datetime (reserved, no wire mapping)
    Date,
    /// Time part of a datetime (reserved, no wire mapping)
    Time,
    /// Hour of day (0-23)
    Hour,
    /// Minute of hour (0-59)
    Minute,
    /// Second of minute (0-59)
    Second,
    /// Millisecond of second (0-999)
    Millisecond,
}

/// Operator families, exactly one per expression node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Plain field reference
    Identity,
    /// Null-test operator
    Unary(UnaryOperator),
    /// Boolean operator
    Boolean(BooleanOperator),
    /// Aggregate operator
    Aggregate(AggregateOperator),
    /// Projection operator
    Projection(ProjectionOperator),
}

impl From<UnaryOperator> for Operator {
    fn from(op: UnaryOperator) -> Self {
        Operator::Unary(op)
    }
}

impl From<BooleanOperator> for Operator {
    fn from(op: BooleanOperator) -> Self {
        Operator::Boolean(op)
    }
}

impl From<AggregateOperator> for Operator {
    fn from(op: AggregateOperator) -> Self {
        Operator::Aggregate(op)
    }
}

impl From<ProjectionOperator> for Operator {
    fn from(op: ProjectionOperator) -> Self {
        Operator::Projection(op)
    }
}

// ============================================================================
// Display Tokens
// ============================================================================

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            UnaryOperator::IsNull => "isNull",
            UnaryOperator::IsNotNull => "isNotNull",
        };
        f.write_str(token)
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            BooleanOperator::Eq => "eq",
            BooleanOperator::Neq => "neq",
            BooleanOperator::Gt => "gt",
            BooleanOperator::Gte => "gte",
            BooleanOperator::Lt => "lt",
            BooleanOperator::Lte => "lte",
            BooleanOperator::And => "and",
            BooleanOperator::Or => "or",
            BooleanOperator::Not => "not",
            BooleanOperator::Like => "like",
            BooleanOperator::In => "in",
            BooleanOperator::InPast => "inPast",
            BooleanOperator::HasAny => "hasAny",
            BooleanOperator::HasAll => "hasAll",
        };
        f.write_str(token)
    }
}

impl fmt::Display for AggregateOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            AggregateOperator::Min => "min",
            AggregateOperator::Max => "max",
            AggregateOperator::Count => "count",
            AggregateOperator::CountDistinct => "countDistinct",
            AggregateOperator::Avg => "avg",
            AggregateOperator::AvgDistinct => "avgDistinct",
            AggregateOperator::Sum => "sum",
        };
        f.write_str(token)
    }
}

impl fmt::Display for ProjectionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            ProjectionOperator::Day => "day",
            ProjectionOperator::DayOfWeek => "dayOfWeek",
            ProjectionOperator::Week => "week",
            ProjectionOperator::Month => "month",
            ProjectionOperator::Year => "year",
            ProjectionOperator::Date => "date",
            ProjectionOperator::Time => "time",
            ProjectionOperator::Hour => "hour",
            ProjectionOperator::Minute => "minute",
            ProjectionOperator::Second => "second",
            ProjectionOperator::Millisecond => "millisecond",
        };
        f.write_str(token)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Identity => f.write_str("ident"),
            Operator::Unary(op) => op.fmt(f),
            Operator::Boolean(op) => op.fmt(f),
            Operator::Aggregate(op) => op.fmt(f),
            Operator::Projection(op) => op.fmt(f),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_tokens() {
        assert_eq!(Operator::Identity.to_string(), "ident");
        assert_eq!(BooleanOperator::InPast.to_string(), "inPast");
        assert_eq!(AggregateOperator::CountDistinct.to_string(), "countDistinct");
        assert_eq!(AggregateOperator::AvgDistinct.to_string(), "avgDistinct");
        assert_eq!(ProjectionOperator::DayOfWeek.to_string(), "dayOfWeek");
        assert_eq!(UnaryOperator::IsNotNull.to_string(), "isNotNull");
    }

    #[test]
    fn test_family_wrapping() {
        let op: Operator = BooleanOperator::And.into();
        assert_eq!(op, Operator::Boolean(BooleanOperator::And));
        assert_eq!(op.to_string(), "and");

        let op: Operator = ProjectionOperator::Year.into();
        assert_eq!(op.to_string(), "year");
    }
}
