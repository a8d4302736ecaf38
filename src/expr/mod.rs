//! Query expression tree
//!
//! In-memory representation of the fields, literals, predicates, aggregates
//! and projections that make up a table query:
//!
//! ```text
//! Typed builders (fields)          Expression tree (this module)
//! ┌──────────────────────┐         ┌──────────────────────────┐
//! │ Field<T> / ArrayField │ ──────▶ │ Expr::{Field, Literal,   │
//! │ eq / like / avg / ...│         │   Derived, Aggregate,    │
//! └──────────────────────┘         │   Unary, Boolean}        │
//!                                  └──────────────────────────┘
//!                                              │
//!                                              ▼
//!                                       compiler lowering
//! ```
//!
//! The tree is immutable. Combinators allocate new nodes, and aliasing with
//! [`Expr::with_alias`] copies the receiver, so snapshots held by one query
//! never change underneath another.
//!
//! # Example
//!
//! ```rust
//! use wireql::expr::fields::{Field, StringField};
//! use wireql::expr::ops::BooleanOperator;
//!
//! let name = StringField::new("name");
//! let price: Field<f64> = Field::new("price");
//!
//! let predicate = name.like("%widget%").and(price.gte(10.0));
//! assert_eq!(predicate.op, BooleanOperator::And);
//! ```

pub mod fields;
pub mod ops;

use std::fmt;

use crate::error::ExprError;
use crate::scalar::Scalar;
use ops::{AggregateOperator, BooleanOperator, Operator, ProjectionOperator, UnaryOperator};

// ============================================================================
// Expression Tree
// ============================================================================

/// A node in the query expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Plain reference to a named column
    Field(FieldRef),
    /// Literal scalar or list value
    Literal(LiteralField),
    /// Projection of a calendar or time component
    Derived(DerivedField),
    /// Aggregate over a field
    Aggregate(AggregateFieldExpr),
    /// Unary null-test predicate
    Unary(UnaryBooleanFieldExpr),
    /// Binary boolean predicate
    Boolean(BooleanFieldExpr),
}

impl Expr {
    /// Operator tag for this node
    ///
    /// Plain fields and literals both report [`Operator::Identity`]; the
    /// compiler distinguishes them by node kind.
    pub fn operator(&self) -> Operator {
        match self {
            Expr::Field(_) | Expr::Literal(_) => Operator::Identity,
            Expr::Derived(node) => Operator::Projection(node.op),
            Expr::Aggregate(node) => Operator::Aggregate(node.op),
            Expr::Unary(node) => Operator::Unary(node.op),
            Expr::Boolean(node) => Operator::Boolean(node.op),
        }
    }

    /// Ordered child expressions the compiler recurses into
    ///
    /// Leaf nodes return themselves, so the operand in position zero always
    /// carries the referenced name or value.
    pub fn operands(&self) -> Vec<&Expr> {
        match self {
            Expr::Field(_) | Expr::Literal(_) => vec![self],
            Expr::Derived(node) => vec![node.base.as_ref()],
            Expr::Aggregate(node) => vec![node.base.as_ref()],
            Expr::Unary(node) => vec![node.operand.as_ref()],
            Expr::Boolean(node) => vec![node.left.as_ref(), node.right.as_ref()],
        }
    }

    /// Node name: the column name for fields, a readable rendering otherwise
    pub fn name(&self) -> String {
        match self {
            Expr::Field(node) => node.name.clone(),
            Expr::Literal(node) => format!("lit({})", node.value),
            Expr::Derived(node) => format!("({}({}))", node.op, node.base.name()),
            Expr::Aggregate(node) => format!("({}({}))", node.op, node.base.name()),
            Expr::Unary(node) => format!("({} {})", node.operand.name(), node.op),
            Expr::Boolean(node) => {
                format!("({} {} {})", node.left.name(), node.op, node.right.name())
            }
        }
    }

    /// Output alias, when one was set with [`Expr::with_alias`]
    ///
    /// Predicates carry no alias.
    pub fn alias(&self) -> Option<&str> {
        match self {
            Expr::Field(node) => node.alias.as_deref(),
            Expr::Literal(node) => node.alias.as_deref(),
            Expr::Derived(node) => node.alias.as_deref(),
            Expr::Aggregate(node) => node.alias.as_deref(),
            Expr::Unary(_) | Expr::Boolean(_) => None,
        }
    }

    /// Copy of this expression with the output alias set
    ///
    /// The receiver is left untouched. Predicates come back unchanged since
    /// they cannot appear in a projection.
    pub fn with_alias(&self, alias: impl Into<String>) -> Expr {
        let alias = alias.into();
        let mut copy = self.clone();
        match &mut copy {
            Expr::Field(node) => node.alias = Some(alias),
            Expr::Literal(node) => node.alias = Some(alias),
            Expr::Derived(node) => node.alias = Some(alias),
            Expr::Aggregate(node) => node.alias = Some(alias),
            Expr::Unary(_) | Expr::Boolean(_) => {}
        }
        copy
    }

    /// True when this node is an aggregate
    ///
    /// Drives implicit grouping: selecting any aggregate turns every
    /// non-aggregate selection into a grouping key.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Expr::Aggregate(_))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// ============================================================================
// Leaf Nodes
// ============================================================================

/// Plain reference to a named column
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    /// Column name as declared by the table schema
    pub name: String,
    /// Optional output alias
    pub alias: Option<String>,
}

impl FieldRef {
    /// Reference the named column
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }
}

/// A constant scalar or list value in expression position
///
/// Literals are usually created implicitly by comparators. Aggregates are
/// not defined over constants, so those methods return an error instead of
/// building a nonsensical node.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralField {
    /// Wrapped literal value
    pub value: Scalar,
    /// Optional output alias
    pub alias: Option<String>,
}

impl LiteralField {
    /// Wrap a value as a literal expression
    pub fn new(value: impl Into<Scalar>) -> Self {
        Self {
            value: value.into(),
            alias: None,
        }
    }

    /// Rejected: minimum of a constant
    pub fn min(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("LiteralField", "min"))
    }

    /// Rejected: maximum of a constant
    pub fn max(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("LiteralField", "max"))
    }

    /// Rejected: sum of a constant
    pub fn sum(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("LiteralField", "sum"))
    }

    /// Rejected: count of a constant
    pub fn count(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("LiteralField", "count"))
    }

    /// Rejected: distinct count of a constant
    pub fn count_distinct(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("LiteralField", "count_distinct"))
    }

    /// Rejected: mean of a constant
    pub fn avg(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("LiteralField", "avg"))
    }

    /// Rejected: distinct mean of a constant
    pub fn avg_distinct(&self) -> Result<AggregateFieldExpr, ExprError> {
        Err(ExprError::unsupported("LiteralField", "avg_distinct"))
    }
}

// ============================================================================
// Derived and Aggregate Nodes
// ============================================================================

/// Projection of a calendar or time component from a field
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedField {
    /// Projection operator
    pub op: ProjectionOperator,
    /// Field the component is projected from
    pub base: Box<Expr>,
    /// Optional output alias
    pub alias: Option<String>,
}

impl DerivedField {
    /// Project a component from the given field expression
    pub fn new(op: ProjectionOperator, base: impl Into<Expr>) -> Self {
        Self {
            op,
            base: Box::new(base.into()),
            alias: None,
        }
    }

    /// Copy of this projection with the output alias set
    pub fn with_alias(&self, alias: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.alias = Some(alias.into());
        copy
    }

    /// Projected component equals the value
    pub fn eq(&self, value: impl Into<Scalar>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Eq, value)
    }

    /// Projected component does not equal the value
    pub fn neq(&self, value: impl Into<Scalar>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Neq, value)
    }

    /// Projected component is greater than the value
    pub fn gt(&self, value: impl Into<Scalar>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Gt, value)
    }

    /// Projected component is greater than or equal to the value
    pub fn gte(&self, value: impl Into<Scalar>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Gte, value)
    }

    /// Projected component is less than the value
    pub fn lt(&self, value: impl Into<Scalar>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Lt, value)
    }

    /// Projected component is less than or equal to the value
    pub fn lte(&self, value: impl Into<Scalar>) -> BooleanFieldExpr {
        self.compare(BooleanOperator::Lte, value)
    }

    /// Projected component lies in the list
    pub fn is_in<V: Into<Scalar>>(&self, values: Vec<V>) -> BooleanFieldExpr {
        let list = Scalar::List(values.into_iter().map(Into::into).collect());
        self.compare(BooleanOperator::In, list)
    }

    /// Projected component lies between the bounds, inclusive
    pub fn between(&self, lower: impl Into<Scalar>, upper: impl Into<Scalar>) -> BooleanFieldExpr {
        self.gte(lower).and(self.lte(upper))
    }

    fn compare(&self, op: BooleanOperator, value: impl Into<Scalar>) -> BooleanFieldExpr {
        BooleanFieldExpr::new(op, self.clone(), LiteralField::new(value))
    }
}

/// Aggregate applied over a field
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateFieldExpr {
    /// Aggregate operator
    pub op: AggregateOperator,
    /// Field being aggregated
    pub base: Box<Expr>,
    /// Optional output alias
    pub alias: Option<String>,
}

impl AggregateFieldExpr {
    /// Apply the aggregate to the given field expression
    pub fn new(op: AggregateOperator, base: impl Into<Expr>) -> Self {
        Self {
            op,
            base: Box::new(base.into()),
            alias: None,
        }
    }

    /// Copy of this aggregate with the output alias set
    pub fn with_alias(&self, alias: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.alias = Some(alias.into());
        copy
    }
}

// ============================================================================
// Predicate Nodes
// ============================================================================

/// Unary null-test predicate over one sub-expression
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryBooleanFieldExpr {
    /// Null-test operator
    pub op: UnaryOperator,
    /// Operand being tested
    pub operand: Box<Expr>,
}

impl UnaryBooleanFieldExpr {
    /// Apply the null test to the given expression
    pub fn new(op: UnaryOperator, operand: impl Into<Expr>) -> Self {
        Self {
            op,
            operand: Box::new(operand.into()),
        }
    }

    /// Conjunction with another predicate
    pub fn and(self, other: impl Into<Predicate>) -> BooleanFieldExpr {
        BooleanFieldExpr::new(BooleanOperator::And, self, other.into())
    }

    /// Disjunction with another predicate
    pub fn or(self, other: impl Into<Predicate>) -> BooleanFieldExpr {
        BooleanFieldExpr::new(BooleanOperator::Or, self, other.into())
    }
}

/// Binary boolean predicate over two sub-expressions
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanFieldExpr {
    /// Boolean operator
    pub op: BooleanOperator,
    /// Left operand
    pub left: Box<Expr>,
    /// Right operand
    pub right: Box<Expr>,
}

impl BooleanFieldExpr {
    /// Combine two expressions with the given operator
    pub fn new(op: BooleanOperator, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    /// Conjunction with another predicate
    pub fn and(self, other: impl Into<Predicate>) -> BooleanFieldExpr {
        BooleanFieldExpr::new(BooleanOperator::And, self, other.into())
    }

    /// Disjunction with another predicate
    pub fn or(self, other: impl Into<Predicate>) -> BooleanFieldExpr {
        BooleanFieldExpr::new(BooleanOperator::Or, self, other.into())
    }
}

/// Filter predicate: the expression kinds a table filter accepts
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Binary boolean predicate
    Boolean(BooleanFieldExpr),
    /// Unary null-test predicate
    Unary(UnaryBooleanFieldExpr),
}

impl From<BooleanFieldExpr> for Predicate {
    fn from(node: BooleanFieldExpr) -> Self {
        Predicate::Boolean(node)
    }
}

impl From<UnaryBooleanFieldExpr> for Predicate {
    fn from(node: UnaryBooleanFieldExpr) -> Self {
        Predicate::Unary(node)
    }
}

// ============================================================================
// Conversions into Expr
// ============================================================================

impl From<FieldRef> for Expr {
    fn from(node: FieldRef) -> Self {
        Expr::Field(node)
    }
}

impl From<LiteralField> for Expr {
    fn from(node: LiteralField) -> Self {
        Expr::Literal(node)
    }
}

impl From<DerivedField> for Expr {
    fn from(node: DerivedField) -> Self {
        Expr::Derived(node)
    }
}

impl From<AggregateFieldExpr> for Expr {
    fn from(node: AggregateFieldExpr) -> Self {
        Expr::Aggregate(node)
    }
}

impl From<UnaryBooleanFieldExpr> for Expr {
    fn from(node: UnaryBooleanFieldExpr) -> Self {
        Expr::Unary(node)
    }
}

impl From<BooleanFieldExpr> for Expr {
    fn from(node: BooleanFieldExpr) -> Self {
        Expr::Boolean(node)
    }
}

impl From<Predicate> for Expr {
    fn from(predicate: Predicate) -> Self {
        match predicate {
            Predicate::Boolean(node) => Expr::Boolean(node),
            Predicate::Unary(node) => Expr::Unary(node),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Expr {
        Expr::Field(FieldRef::new(name))
    }

    #[test]
    fn test_leaf_operands_are_self_references() {
        let expr = field("price");
        assert_eq!(expr.operator(), Operator::Identity);
        let operands = expr.operands();
        assert_eq!(operands.len(), 1);
        assert_eq!(operands[0].name(), "price");
    }

    #[test]
    fn test_literal_reports_identity() {
        let expr = Expr::Literal(LiteralField::new(42i64));
        assert_eq!(expr.operator(), Operator::Identity);
        assert_eq!(expr.name(), "lit(42)");
    }

    #[test]
    fn test_boolean_node_shape() {
        let predicate = BooleanFieldExpr::new(
            BooleanOperator::Gt,
            field("price"),
            LiteralField::new(10.0f64),
        );
        let expr = Expr::Boolean(predicate);
        assert_eq!(expr.operator(), Operator::Boolean(BooleanOperator::Gt));
        assert_eq!(expr.operands().len(), 2);
        assert_eq!(expr.name(), "(price gt lit(10))");
    }

    #[test]
    fn test_and_composes_predicates() {
        let left = BooleanFieldExpr::new(BooleanOperator::Eq, field("a"), LiteralField::new(1i32));
        let right = BooleanFieldExpr::new(BooleanOperator::Eq, field("b"), LiteralField::new(2i32));
        let combined = left.and(right);
        assert_eq!(combined.op, BooleanOperator::And);
        assert_eq!(combined.left.operator(), Operator::Boolean(BooleanOperator::Eq));
        assert_eq!(combined.right.operator(), Operator::Boolean(BooleanOperator::Eq));
    }

    #[test]
    fn test_unary_name_rendering() {
        let expr = Expr::Unary(UnaryBooleanFieldExpr::new(
            UnaryOperator::IsNull,
            field("email"),
        ));
        assert_eq!(expr.name(), "(email isNull)");
        assert_eq!(expr.operator(), Operator::Unary(UnaryOperator::IsNull));
    }

    #[test]
    fn test_with_alias_copies() {
        let original = Expr::Aggregate(AggregateFieldExpr::new(
            AggregateOperator::Avg,
            field("price"),
        ));
        let aliased = original.with_alias("avgPrice");

        assert_eq!(original.alias(), None);
        assert_eq!(aliased.alias(), Some("avgPrice"));
        assert_eq!(aliased.name(), "(avg(price))");
    }

    #[test]
    fn test_predicates_never_carry_aliases() {
        let predicate = Expr::Boolean(BooleanFieldExpr::new(
            BooleanOperator::Eq,
            field("a"),
            LiteralField::new(1i32),
        ));
        let aliased = predicate.with_alias("ignored");
        assert_eq!(aliased.alias(), None);
        assert_eq!(aliased, predicate);
    }

    #[test]
    fn test_literal_aggregates_are_rejected() {
        let literal = LiteralField::new("constant");
        let err = literal.max().unwrap_err();
        assert_eq!(
            err,
            ExprError::UnsupportedOperation {
                receiver: "LiteralField",
                method: "max",
            }
        );
        assert!(literal.avg_distinct().is_err());
        assert!(literal.count().is_err());
    }

    #[test]
    fn test_derived_comparison_wraps_projection() {
        let derived = DerivedField::new(ProjectionOperator::Month, field("created_on"));
        let predicate = derived.eq(2i32);
        assert_eq!(predicate.op, BooleanOperator::Eq);
        assert_eq!(
            predicate.left.operator(),
            Operator::Projection(ProjectionOperator::Month)
        );
        assert_eq!(predicate.right.name(), "lit(2)");
    }

    #[test]
    fn test_between_expands_to_bounds() {
        let derived = DerivedField::new(ProjectionOperator::Year, field("created_on"));
        let predicate = derived.between(2020i32, 2023i32);
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
}
