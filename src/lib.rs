//! wireql - Typed query-expression builder with a protobuf wire compiler
//!
//! This library provides an embedded DSL for composing table queries:
//! - Typed field handles with comparators, aggregates, and projections
//! - An immutable `Table` builder for select/filter/order/limit plans
//! - Calendar and wall-clock helpers for relative time-range predicates
//! - A compiler that lowers the expression tree into the agent wire message
//!
//! # Example
//!
//! ```rust
//! use wireql::compiler;
//! use wireql::expr::fields::{Field, StringField};
//! use wireql::table::{Table, TableSource};
//!
//! let name = StringField::new("name");
//! let price: Field<f64> = Field::new("price");
//!
//! let source = TableSource::new("pkg-123", "catalog", "0.1.0");
//! let products = Table::new(source, "products", vec![(&name).into(), (&price).into()]);
//!
//! let query = products
//!     .select(vec!["name".into(), price.avg().with_alias("avgPrice").into()])
//!     .filter(name.like("%pro%"))
//!     .limit(10);
//!
//! let message = compiler::lower_table(&query).expect("lowering succeeds");
//! assert_eq!(message.select_from, "products");
//! assert_eq!(message.select.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod expr;
pub mod scalar;
pub mod table;

/// Calendar and wall-clock arithmetic backing relative time ranges
pub mod temporal;

/// Lowering from table snapshots to wire query messages
pub mod compiler;

/// Hand-written prost messages for the agent protocol
pub mod wire;

// Re-export main types
pub use backend::{Backend, Row};
pub use error::{BackendError, CompileError, Error, ExprError, Result};
pub use expr::fields::{ArrayField, DateField, DateTimeField, Field, StringField, TimeField};
pub use expr::{
    AggregateFieldExpr, BooleanFieldExpr, DerivedField, Expr, FieldRef, LiteralField, Predicate,
    UnaryBooleanFieldExpr,
};
pub use scalar::Scalar;
pub use table::{Direction, Selector, Table, TableSource};
pub use temporal::{DateGranularity, DateTimeGranularity, TimeGranularity};
