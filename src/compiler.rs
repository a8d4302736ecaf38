//! Query lowering
//!
//! Pure transformation from a [`Table`] snapshot to the wire
//! [`Query`](wire::Query) message:
//!
//! ```text
//! Table snapshot
//!      │
//!      ▼
//! ┌───────────────┐
//! │    Header     │  package id, client version, table name
//! └───────────────┘
//!      │
//!      ▼
//! ┌───────────────┐
//! │  Selections   │  expressions, aliases, implicit group-by
//! └───────────────┘
//!      │
//!      ▼
//! ┌───────────────┐
//! │    Filter     │  boolean tree, operator code mapping
//! └───────────────┘
//!      │
//!      ▼
//! ┌───────────────┐
//! │ Order + Limit │  direction codes; limit only when positive
//! └───────────────┘
//! ```
//!
//! Lowering never mutates the table and holds no state, so the same
//! snapshot always produces the same message. Unknown node shapes and
//! operators without a wire code abort with a typed error instead of
//! emitting a partial query.

use tracing::debug;

use crate::error::CompileError;
use crate::expr::ops::{
    AggregateOperator, BooleanOperator, Operator, ProjectionOperator, UnaryOperator,
};
use crate::expr::{BooleanFieldExpr, Expr, Predicate, UnaryBooleanFieldExpr};
use crate::scalar::Scalar;
use crate::table::{Direction, Table};
use crate::wire;

/// Version string reported in the query header
const CODE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for lowering steps
pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Options controlling query lowering
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    /// Ask the agent to validate and compile without executing
    pub dry_run: bool,
}

// ============================================================================
// Entry Points
// ============================================================================

/// Lower a table snapshot into the wire query message
pub fn lower_table(table: &Table) -> CompileResult<wire::Query> {
    lower_table_with(table, &CompilerOptions::default())
}

/// Lower a table snapshot with explicit options
pub fn lower_table_with(table: &Table, options: &CompilerOptions) -> CompileResult<wire::Query> {
    debug!(
        table = %table.name(),
        selections = table.selection().map_or(0, <[Expr]>::len),
        has_filter = table.filter_expr().is_some(),
        dry_run = options.dry_run,
        "lowering table query"
    );

    let source = table.source();
    let mut query = wire::Query {
        id: Some(wire::QueryId::package(&source.package_id)),
        client_version: Some(wire::ClientVersion {
            client: wire::Client::Rust as i32,
            code_version: CODE_VERSION.to_string(),
            dataset_version: source.dataset_version.clone(),
        }),
        select_from: table.name().to_string(),
        select: Vec::new(),
        filter: None,
        group_by: Vec::new(),
        order_by: Vec::new(),
        limit: None,
        dry_run: options.dry_run,
    };

    if let Some(selection) = table.selection() {
        for expr in selection {
            query.select.push(lower_select(expr)?);
        }
        // Any aggregate in the projection turns every non-aggregate
        // selection into a grouping key, in selection order.
        if selection.iter().any(Expr::is_aggregate) {
            for expr in selection.iter().filter(|expr| !expr.is_aggregate()) {
                query.group_by.push(lower_group_by(expr)?);
            }
        }
    }

    if let Some(predicate) = table.filter_expr() {
        query.filter = Some(lower_predicate(predicate)?);
    }

    if let Some(ordering) = table.ordering() {
        for (expr, direction) in ordering {
            query.order_by.push(wire::OrderByExpression {
                argument: Some(lower_expression(expr)?),
                direction: lower_direction(*direction) as i32,
            });
        }
    }

    if table.limit_to() > 0 {
        query.limit = Some(table.limit_to());
    }

    Ok(query)
}

// ============================================================================
// Clause Lowering
// ============================================================================

fn lower_select(expr: &Expr) -> CompileResult<wire::SelectExpression> {
    Ok(wire::SelectExpression {
        argument: Some(lower_expression(expr)?),
        alias: expr.alias().map(str::to_string),
    })
}

fn lower_group_by(expr: &Expr) -> CompileResult<wire::GroupByExpression> {
    let ex_type = match expr {
        Expr::Derived(node) => wire::group_by_expression::ExType::Derived(wire::DerivedExpression {
            op: lower_projection_operator(node.op)? as i32,
            argument: Some(lower_expression(&node.base)?),
        }),
        Expr::Field(node) => wire::group_by_expression::ExType::Field(wire::FieldReference {
            field_name: node.name.clone(),
        }),
        _ => return Err(CompileError::UnexpectedGroupByExpression(expr.name())),
    };
    Ok(wire::GroupByExpression {
        ex_type: Some(ex_type),
    })
}

fn lower_predicate(predicate: &Predicate) -> CompileResult<wire::BooleanExpression> {
    match predicate {
        Predicate::Boolean(node) => lower_boolean(node),
        Predicate::Unary(node) => lower_unary(node),
    }
}

fn lower_boolean(node: &BooleanFieldExpr) -> CompileResult<wire::BooleanExpression> {
    let arguments = match node.op {
        // Conjunctions nest their operands as conditions so the agent sees
        // the full predicate tree.
        BooleanOperator::And | BooleanOperator::Or => vec![
            lower_condition_argument(&node.left)?,
            lower_condition_argument(&node.right)?,
        ],
        _ => vec![
            lower_expression(&node.left)?,
            lower_expression(&node.right)?,
        ],
    };
    Ok(wire::BooleanExpression {
        op: lower_boolean_operator(node.op)? as i32,
        arguments,
    })
}

fn lower_condition_argument(expr: &Expr) -> CompileResult<wire::Expression> {
    match expr {
        Expr::Boolean(node) => Ok(wire::Expression::condition(lower_boolean(node)?)),
        Expr::Unary(node) => Ok(wire::Expression::condition(lower_unary(node)?)),
        _ => Err(CompileError::UnexpectedExpression(expr.name())),
    }
}

fn lower_unary(node: &UnaryBooleanFieldExpr) -> CompileResult<wire::BooleanExpression> {
    let op = match node.op {
        UnaryOperator::IsNull => wire::BooleanOperator::IsNull,
        UnaryOperator::IsNotNull => wire::BooleanOperator::IsNotNull,
    };
    Ok(wire::BooleanExpression {
        op: op as i32,
        arguments: vec![lower_expression(&node.operand)?],
    })
}

// ============================================================================
// Expression Lowering
// ============================================================================

fn lower_expression(expr: &Expr) -> CompileResult<wire::Expression> {
    match expr {
        Expr::Literal(node) => Ok(wire::Expression::literal(lower_literal(&node.value))),
        Expr::Aggregate(node) => Ok(wire::Expression::aggregate(wire::AggregateExpression {
            op: lower_aggregate_operator(node.op) as i32,
            argument: Some(lower_expression(&node.base)?),
        })),
        Expr::Derived(node) => Ok(wire::Expression::derived(wire::DerivedExpression {
            op: lower_projection_operator(node.op)? as i32,
            argument: Some(lower_expression(&node.base)?),
        })),
        Expr::Field(node) => Ok(wire::Expression::field(wire::FieldReference {
            field_name: node.name.clone(),
        })),
        Expr::Unary(_) | Expr::Boolean(_) => Err(CompileError::UnexpectedExpression(expr.name())),
    }
}

fn lower_literal(value: &Scalar) -> wire::Literal {
    use wire::literal::LiteralType;

    let literal_type = match value {
        Scalar::Bool(v) => LiteralType::Boolean(*v),
        Scalar::I32(v) => LiteralType::I32(*v),
        Scalar::I64(v) => LiteralType::I64(*v),
        Scalar::U32(v) => LiteralType::Ui32(*v),
        Scalar::U64(v) => LiteralType::Ui64(*v),
        Scalar::F32(v) => LiteralType::F32(*v),
        Scalar::F64(v) => LiteralType::F64(*v),
        Scalar::String(v) => LiteralType::String(v.clone()),
        Scalar::Timestamp(v) => LiteralType::Timestamp(*v),
        Scalar::List(values) => LiteralType::List(wire::LiteralList {
            values: values.iter().map(lower_literal).collect(),
        }),
    };
    wire::Literal {
        literal_type: Some(literal_type),
    }
}

// ============================================================================
// Operator Mapping
// ============================================================================

fn lower_boolean_operator(op: BooleanOperator) -> CompileResult<wire::BooleanOperator> {
    match op {
        BooleanOperator::And => Ok(wire::BooleanOperator::And),
        BooleanOperator::Or => Ok(wire::BooleanOperator::Or),
        BooleanOperator::Eq => Ok(wire::BooleanOperator::Eq),
        BooleanOperator::Neq => Ok(wire::BooleanOperator::Neq),
        BooleanOperator::Gt => Ok(wire::BooleanOperator::Gt),
        BooleanOperator::Gte => Ok(wire::BooleanOperator::Gte),
        BooleanOperator::Lt => Ok(wire::BooleanOperator::Lt),
        BooleanOperator::Lte => Ok(wire::BooleanOperator::Lte),
        BooleanOperator::Like => Ok(wire::BooleanOperator::Like),
        BooleanOperator::In => Ok(wire::BooleanOperator::In),
        BooleanOperator::HasAny => Ok(wire::BooleanOperator::HasAny),
        BooleanOperator::HasAll => Ok(wire::BooleanOperator::HasAll),
        // `not` has no agent mapping yet; `inPast` is expanded into a
        // gte/lte pair at build time and must not reach the compiler.
        BooleanOperator::Not | BooleanOperator::InPast => {
            Err(CompileError::UnhandledOperator(Operator::Boolean(op)))
        }
    }
}

fn lower_aggregate_operator(op: AggregateOperator) -> wire::AggregateOperator {
    match op {
        AggregateOperator::Min => wire::AggregateOperator::Min,
        AggregateOperator::Max => wire::AggregateOperator::Max,
        AggregateOperator::Count => wire::AggregateOperator::Count,
        AggregateOperator::CountDistinct => wire::AggregateOperator::CountDistinct,
        AggregateOperator::Avg => wire::AggregateOperator::Mean,
        AggregateOperator::AvgDistinct => wire::AggregateOperator::MeanDistinct,
        AggregateOperator::Sum => wire::AggregateOperator::Sum,
    }
}

fn lower_projection_operator(op: ProjectionOperator) -> CompileResult<wire::ProjectionOperator> {
    match op {
        ProjectionOperator::Year => Ok(wire::ProjectionOperator::Year),
        ProjectionOperator::Month => Ok(wire::ProjectionOperator::Month),
        ProjectionOperator::Day => Ok(wire::ProjectionOperator::Day),
        ProjectionOperator::Hour => Ok(wire::ProjectionOperator::Hour),
        ProjectionOperator::Minute => Ok(wire::ProjectionOperator::Minute),
        ProjectionOperator::Second => Ok(wire::ProjectionOperator::Second),
        ProjectionOperator::Millisecond => Ok(wire::ProjectionOperator::Millisecond),
        // Buildable but not yet evaluated by the agent.
        ProjectionOperator::DayOfWeek
        | ProjectionOperator::Week
        | ProjectionOperator::Date
        | ProjectionOperator::Time => Err(CompileError::UnhandledOperator(Operator::Projection(op))),
    }
}

fn lower_direction(direction: Direction) -> wire::SortDirection {
    match direction {
        Direction::Asc => wire::SortDirection::Asc,
        Direction::Desc => wire::SortDirection::Desc,
    }
}

// ============================================================================
// Tests
// ============================================================================
