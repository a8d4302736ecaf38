//! Typed field builders
//!
//! [`Field<T>`] is the schema-facing handle for a column with element type
//! `T`. The type parameter constrains comparator arguments, so a string
//! column cannot be compared against a number at compile time; it carries
//! no runtime state. Aliases specialize the temporal types:
//!
//! - [`StringField`] adds `like`
//! - [`DateField`], [`TimeField`], [`DateTimeField`] add component
//!   projections, `before`/`after`, and relative `in_past` ranges
//! - [`ArrayField<T>`] supports only the array membership tests; scalar
//!   comparators and aggregates are rejected at the call site

use std::marker::PhantomData;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::warn;

use crate::error::ExprError;
use crate::scalar::Scalar;
use crate::temporal::{
    add_duration_date, add_duration_datetime, add_duration_time, DateGranularity,
    DateTimeGranularity, TimeGranularity,
};
use super::ops::{AggregateOperator, BooleanOperator, ProjectionOperator, UnaryOperator};
use super::{
    AggregateFieldExpr, BooleanFieldExpr, DerivedField, Expr, FieldRef, LiteralField,
    UnaryBooleanFieldExpr,
};

/// String-typed field
pub type StringField = Field<String>;

/// Calendar-date-typed field, no time component
pub type DateField = Field<NaiveDate>;

/// Wall-clock-time-typed field, no date component
pub type TimeField = Field<NaiveTime>;

/// UTC-datetime-typed field
pub type DateTimeField = Field<DateTime<Utc>>;

// ============================================================================
// Field
// ============================================================================

/// Typed reference to a named column
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    name: String,
    alias: Option<String>,
    _element: PhantomData<T>,
}

impl<T> Field<T> {
    /// Create a field handle for the named column
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            _element: PhantomData,
        }
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output alias, when set
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Copy of this field with the output alias set
    ///
    /// The receiver is left untouched.
    pub fn with_alias(&self, alias: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            alias: Some(alias.into()),
            _element: PhantomData,
        }
    }

    /// Field value is null
    pub fn is_null(&self) -> UnaryBooleanFieldExpr {
        UnaryBooleanFieldExpr::new(UnaryOperator::IsNull, self.to_expr())
    }

    /// Field value is not null
    pub fn is_not_null(&self) -> UnaryBooleanFieldExpr {
        UnaryBooleanFieldExpr::new(UnaryOperator::IsNotNull, self.to_expr())
    }

    /// Minimum of the field's values
    pub fn min(&self) -> AggregateFieldExpr {
        self.aggregate(AggregateOperator::Min)
    }

    /// Maximum of the field's values
    pub fn max(&self) -> AggregateFieldExpr {
        self.aggregate(AggregateOperator::Max)
    }

    /// Sum of the field's values
    pub fn sum(&self) -> AggregateFieldExpr {
        self.aggregate(AggregateOperator::Sum)
    }

    /// Count of rows
    pub fn count(&self) -> AggregateFieldExpr {
        self.aggregate(AggregateOperator::Count)
    }

    /// Count of distinct values
    pub fn count_distinct(&self) -> AggregateFieldExpr {
        self.aggregate(AggregateOperator::CountDistinct)
    }

    /// Arithmetic mean of the field's values
    pub fn avg(&self) -> AggregateFieldExpr {
        self.aggregate(AggregateOperator::Avg)
    }

    /// Arithmetic mean over the field's distinct values
    pub fn avg_distinct(&self) -> AggregateFieldExpr {
        self.aggregate(AggregateOperator::AvgDistinct)
    }

    fn aggregate(&self, op: AggregateOperator) -> AggregateFieldExpr {
        AggregateFieldExpr::new(op, self.to_expr())
    }

    fn project(&self, op: ProjectionOperator) -> DerivedField {
        DerivedField::new(op, self.to_expr())
    }

    fn to_expr(&self) -> Expr {
        Expr::Field(FieldRef {
            name: self.name.clone(),
            alias: self.alias.clone(),
        })
    }
}

impl<T: Into<Scalar>> Field<T> {
    /// Field equals the value
    pub fn eq(&self, value: impl Into<T>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Eq, value.into())
    }

    /// Field does not equal the value
    pub fn neq(&self, value: impl Into<T>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Neq, value.into())
    }

    /// Field is greater than the value
    pub fn gt(&self, value: impl Into<T>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Gt, value.into())
    }

    /// Field is greater than or equal to the value
    pub fn gte(&self, value: impl Into<T>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Gte, value.into())
    }

    /// Field is less than the value
    pub fn lt(&self, value: impl Into<T>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Lt, value.into())
    }

    /// Field is less than or equal to the value
    pub fn lte(&self, value: impl Into<T>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Lte, value.into())
    }

    /// Field value lies in the list
    pub fn is_in<V: Into<T>>(&self, values: Vec<V>) -> BooleanFieldExpr {
        let list = Scalar::List(
            values
                .into_iter()
                .map(|value| {
                    let value: T = value.into();
                    value.into()
                })
                .collect(),
        );
        BooleanFieldExpr::new(
            BooleanOperator::In,
            self.to_expr(),
            LiteralField::new(list),
        )
    }

    /// Field value lies between the bounds, inclusive
    pub fn between(&self, lower: impl Into<T>, upper: impl Into<T>) -> BooleanFieldExpr {
        self.gte(lower).and(self.lte(upper))
    }

    fn compare(&self, op: BooleanOperator, value: T) -> BooleanFieldExpr {
        BooleanFieldExpr::new(op, self.to_expr(), LiteralField::new(value))
    }
}

impl Field<String> {
    /// SQL LIKE pattern match, `%` and `_` wildcards
    pub fn like(&self, pattern: impl Into<String>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Like, pattern.into())
    }
}

// ============================================================================
// Temporal Fields
// ============================================================================

impl Field<NaiveDate> {
    /// Calendar year of the date
    pub fn year(&self) -> DerivedField {
        self.project(ProjectionOperator::Year)
    }

    /// Month of year (1-12)
    pub fn month(&self) -> DerivedField {
        self.project(ProjectionOperator::Month)
    }

    /// Week of year
    pub fn week(&self) -> DerivedField {
        self.project(ProjectionOperator::Week)
    }

    /// Day of week
    pub fn day_of_week(&self) -> DerivedField {
        self.project(ProjectionOperator::DayOfWeek)
    }

    /// Day of month (1-31)
    pub fn day(&self) -> DerivedField {
        self.project(ProjectionOperator::Day)
    }

    /// Date strictly before the given day
    pub fn before(&self, date: NaiveDate) -> BooleanFieldExpr {
        self.lt(date)
    }

    /// Date strictly after the given day
    pub fn after(&self, date: NaiveDate) -> BooleanFieldExpr {
        self.gt(date)
    }

    /// Date lies between `older_than` and `newer_than` units before today,
    /// inclusive
    ///
    /// Both bounds are computed once from the current day. Swapped bounds
    /// are corrected with a warning.
    pub fn in_past(
        &self,
        older_than: i64,
        newer_than: i64,
        granularity: DateGranularity,
    ) -> BooleanFieldExpr {
        let (older, newer) = order_bounds(older_than, newer_than);
        let today = Utc::now().date_naive();
        let upper = add_duration_date(today, older.saturating_neg(), granularity);
        let lower = add_duration_date(today, newer.saturating_neg(), granularity);
        self.gte(lower).and(self.lte(upper))
    }
}

impl Field<NaiveTime> {
    /// Hour of day (0-23)
    pub fn hour(&self) -> DerivedField {
        self.project(ProjectionOperator::Hour)
    }

    /// Minute of hour (0-59)
    pub fn minute(&self) -> DerivedField {
        self.project(ProjectionOperator::Minute)
    }

    /// Second of minute (0-59)
    pub fn second(&self) -> DerivedField {
        self.project(ProjectionOperator::Second)
    }

    /// Millisecond of second (0-999)
    pub fn millisecond(&self) -> DerivedField {
        self.project(ProjectionOperator::Millisecond)
    }

    /// Time strictly before the given instant
    pub fn before(&self, time: NaiveTime) -> BooleanFieldExpr {
        self.lt(time)
    }

    /// Time strictly after the given instant
    pub fn after(&self, time: NaiveTime) -> BooleanFieldExpr {
        self.gt(time)
    }

    /// Time lies between `older_than` and `newer_than` units before now,
    /// inclusive
    ///
    /// Bounds clamp at the day boundaries since a bare time has no date to
    /// carry into. Swapped bounds are corrected with a warning.
    pub fn in_past(
        &self,
        older_than: i64,
        newer_than: i64,
        granularity: TimeGranularity,
    ) -> BooleanFieldExpr {
        let (older, newer) = order_bounds(older_than, newer_than);
        let now = Utc::now().time();
        let upper = add_duration_time(now, older.saturating_neg(), granularity);
        let lower = add_duration_time(now, newer.saturating_neg(), granularity);
        self.gte(lower).and(self.lte(upper))
    }
}

impl Field<DateTime<Utc>> {
    /// Calendar year of the datetime
    pub fn year(&self) -> DerivedField {
        self.project(ProjectionOperator::Year)
    }

    /// Month of year (1-12)
    pub fn month(&self) -> DerivedField {
        self.project(ProjectionOperator::Month)
    }

    /// Week of year
    pub fn week(&self) -> DerivedField {
        self.project(ProjectionOperator::Week)
    }

    /// Day of week
    pub fn day_of_week(&self) -> DerivedField {
        self.project(ProjectionOperator::DayOfWeek)
    }

    /// Day of month (1-31)
    pub fn day(&self) -> DerivedField {
        self.project(ProjectionOperator::Day)
    }

    /// Hour of day (0-23)
    pub fn hour(&self) -> DerivedField {
        self.project(ProjectionOperator::Hour)
    }

    /// Minute of hour (0-59)
    pub fn minute(&self) -> DerivedField {
        self.project(ProjectionOperator::Minute)
    }

    /// Second of minute (0-59)
    pub fn second(&self) -> DerivedField {
        self.project(ProjectionOperator::Second)
    }

    /// Millisecond of second (0-999)
    pub fn millisecond(&self) -> DerivedField {
        self.project(ProjectionOperator::Millisecond)
    }

    /// Datetime strictly before the given instant
    pub fn before(&self, at: DateTime<Utc>) -> BooleanFieldExpr {
        self.lt(at)
    }

    /// Datetime strictly after the given instant
    pub fn after(&self, at: DateTime<Utc>) -> BooleanFieldExpr {
        self.gt(at)
    }

    /// Datetime lies between `older_than` and `newer_than` units before
    /// now, inclusive
    ///
    /// Accepts both date and time units. Swapped bounds are corrected with
    /// a warning.
    pub fn in_past(
        &self,
        older_than: i64,
        newer_than: i64,
        granularity: impl Into<DateTimeGranularity>,
    ) -> BooleanFieldExpr {
        let granularity = granularity.into();
        let (older, newer) = order_bounds(older_than, newer_than);
        let now = Utc::now();
        let upper = add_duration_datetime(now, older.saturating_neg(), granularity);
        let lower = add_duration_datetime(now, newer.saturating_neg(), granularity);
        self.gte(lower).and(self.lte(upper))
    }
}

fn order_bounds(older_than: i64, newer_than: i64) -> (i64, i64) {
    if older_than > newer_than {
        warn!(
            older_than,
            newer_than, "in_past called with older_than > newer_than, swapping bounds"
        );
        (newer_than, older_than)
    } else {
        (older_than, newer_than)
    }
}

impl<T> From<Field<T>> for Expr {
    fn from(field: Field<T>) -> Self {
        Expr::Field(FieldRef {
            name: field.name,
            alias: field.alias,
        })
    }
}

impl<T> From<&Field<T>> for Expr {
    fn from(field: &Field<T>) -> Self {
        field.to_expr()
    }
}

// ============================================================================
// ArrayField
// ============================================================================

/// Array-typed field with element type `T`
///
/// Only the membership tests make sense over arrays. The scalar comparators
/// and aggregates exist so call sites get a typed error instead of a
/// nonsensical query.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayField<T> {
    name: String,
    alias: Option<String>,
    _element: PhantomData<T>,
}

impl<T> ArrayField<T> {
    /// Create an array field handle for the named column
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            _element: PhantomData,
        }
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output alias, when set
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Copy of this field with the output alias set
    pub fn with_alias(&self, alias: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            alias: Some(alias.into()),
            _element: PhantomData,
        }
    }

    /// Rejected: minimum over an array field
    pub fn min(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "min"))
    }

    /// Rejected: maximum over an array field
    pub fn max(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "max"))
    }

    /// Rejected: sum over an array field
    pub fn sum(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "sum"))
    }

    /// Rejected: count over an array field
    pub fn count(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "count"))
    }

    /// Rejected: distinct count over an array field
    pub fn count_distinct(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "count_distinct"))
    }

    /// Rejected: mean over an array field
    pub fn avg(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "avg"))
    }

    /// Rejected: distinct mean over an array field
    pub fn avg_distinct(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "avg_distinct"))
    }

    /// Rejected: scalar equality over an array field
    pub fn eq(&self, _value: impl Into<Scalar>) -> Result<BooleanFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "eq"))
    }

    /// Rejected: scalar inequality over an array field
    pub fn neq(&self, _value: impl Into<Scalar>) -> Result<BooleanFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "neq"))
    }

    /// Rejected: scalar ordering over an array field
    pub fn gt(&self, _value: impl Into<Scalar>) -> Result<BooleanFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "gt"))
    }

    /// Rejected: scalar ordering over an array field
    pub fn gte(&self, _value: impl Into<Scalar>) -> Result<BooleanFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "gte"))
    }

    /// Rejected: scalar ordering over an array field
    pub fn lt(&self, _value: impl Into<Scalar>) -> Result<BooleanFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "lt"))
    }

    /// Rejected: scalar ordering over an array field
    pub fn lte(&self, _value: impl Into<Scalar>) -> Result<BooleanFieldExpr, ExprError> {
        Err(ExprError::unsupported("ArrayField", "lte"))
    }

    fn to_expr(&self) -> Expr {
        Expr::Field(FieldRef {
            name: self.name.clone(),
            alias: self.alias.clone(),
        })
    }
}

impl<T: Into<Scalar>> ArrayField<T> {
    /// Array overlaps at least one of the given values
    pub fn has_any<V: Into<T>>(&self, values: Vec<V>) -> BooleanFieldExpr {
        self.membership(BooleanOperator::HasAny, values)
    }

    /// Array contains every one of the given values
    pub fn has_all<V: Into<T>>(&self, values: Vec<V>) -> BooleanFieldExpr {
        self.membership(BooleanOperator::HasAll, values)
    }

    fn membership<V: Into<T>>(&self, op: BooleanOperator, values: Vec<V>) -> BooleanFieldExpr {
        let list = Scalar::List(
            values
                .into_iter()
                .map(|value| {
                    let value: T = value.into();
                    value.into()
                })
                .collect(),
        );
        BooleanFieldExpr::new(op, self.to_expr(), LiteralField::new(list))
    }
}

impl<T> From<ArrayField<T>> for Expr {
    fn from(field: ArrayField<T>) -> Self {
        Expr::Field(FieldRef {
            name: field.name,
            alias: field.alias,
        })
    }
}

impl<T> From<&ArrayField<T>> for Expr {
    fn from(field: &ArrayField<T>) -> Self {
        field.to_expr()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ops::Operator;

    #[test]
    fn test_with_alias_copies() {
        let price: Field<f64> = Field::new("price");
        let aliased = price.with_alias("unitPrice");

        assert_eq!(price.alias(), None);
        assert_eq!(aliased.alias(), Some("unitPrice"));
        assert_eq!(aliased.name(), "price");
    }

    #[test]
    fn test_comparator_builds_literal_node() {
        let name = StringField::new("name");
        let predicate = name.eq("widget");

        assert_eq!(predicate.op, BooleanOperator::Eq);
        assert_eq!(predicate.left.name(), "name");
        assert_eq!(predicate.right.name(), "lit(widget)");
    }

    #[test]
    fn test_like_is_string_only() {
        let name = StringField::new("name");
        let predicate = name.like("%pro%");
        assert_eq!(predicate.op, BooleanOperator::Like);
        match predicate.right.as_ref() {
            Expr::Literal(node) => assert_eq!(node.value, Scalar::String("%pro%".to_string())),
            other => panic!("expected literal operand, got {other:?}"),
        }
    }

    #[test]
    fn test_is_in_preserves_value_order() {
        let status = StringField::new("status");
        let predicate = status.is_in(vec!["new", "open"]);
        assert_eq!(predicate.op, BooleanOperator::In);
        match predicate.right.as_ref() {
            Expr::Literal(node) => {
                assert_eq!(node.value, Scalar::from(vec!["new", "open"]));
            }
            other => panic!("expected literal operand, got {other:?}"),
        }
    }

    #[test]
    fn test_aggregate_wraps_field() {
        let price: Field<f64> = Field::new("price");
        let aggregate = price.avg();
        assert_eq!(aggregate.op, AggregateOperator::Avg);
        assert_eq!(aggregate.base.name(), "price");
        assert_eq!(Expr::from(aggregate).name(), "(avg(price))");
    }

    #[test]
    fn test_null_tests() {
        let email = StringField::new("email");
        let expr = Expr::Unary(email.is_null());
        assert_eq!(expr.operator(), Operator::Unary(UnaryOperator::IsNull));
        assert_eq!(expr.name(), "(email isNull)");
    }

    #[test]
    fn test_date_projections() {
        let created: DateField = Field::new("created_on");
        assert_eq!(created.month().op, ProjectionOperator::Month);
        assert_eq!(created.day_of_week().op, ProjectionOperator::DayOfWeek);

        let seen: DateTimeField = Field::new("last_seen");
        assert_eq!(seen.millisecond().op, ProjectionOperator::Millisecond);
    }

    #[test]
    fn test_in_past_builds_inclusive_range() {
        let created: DateField = Field::new("created_on");
        let predicate = created.in_past(1, 5, DateGranularity::Days);

        assert_eq!(predicate.op, BooleanOperator::And);
        assert_eq!(
            predicate.left.operator(),
            Operator::Boolean(BooleanOperator::Gte)
        );
        assert_eq!(
            predicate.right.operator(),
            Operator::Boolean(BooleanOperator::Lte)
        );
    }

    #[test]
    fn test_array_membership() {
        let tags: ArrayField<String> = ArrayField::new("tags");
        let predicate = tags.has_any(vec!["alpha", "beta"]);
        assert_eq!(predicate.op, BooleanOperator::HasAny);
        assert_eq!(predicate.left.name(), "tags");

        let predicate = tags.has_all(vec!["alpha"]);
        assert_eq!(predicate.op, BooleanOperator::HasAll);
    }

    #[test]
    fn test_array_scalar_operations_are_rejected() {
        let tags: ArrayField<String> = ArrayField::new("tags");
        assert_eq!(
            tags.eq("alpha").unwrap_err(),
            ExprError::unsupported("ArrayField", "eq")
        );
        assert_eq!(
            tags.max().unwrap_err(),
            ExprError::unsupported("ArrayField", "max")
        );
        assert!(tags.lte(3i32).is_err());
        assert!(tags.count_distinct().is_err());
    }
}
