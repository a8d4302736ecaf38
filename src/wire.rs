//! Wire query messages
//!
//! Hand-written prost messages for the query protocol consumed by the
//! remote execution agent. The schema mirrors:
//!
//! ```protobuf
//! message Query {
//!   QueryId id = 1;
//!   ClientVersion client_version = 2;
//!   string select_from = 3;
//!   repeated SelectExpression select = 4;
//!   BooleanExpression filter = 5;
//!   repeated GroupByExpression group_by = 6;
//!   repeated OrderByExpression order_by = 7;
//!   optional uint64 limit = 8;
//!   bool dry_run = 9;
//! }
//! ```
//!
//! Expression nodes are a oneof over field references, literals, derived
//! (projected) components, aggregates, and nested boolean conditions, so a
//! filter tree of any depth round-trips through one message type.
//!
//! Operator code values are fixed by the agent and must not be renumbered.
//! `BooleanOperator` skips value 2, which the agent reserves.

use prost::{Enumeration, Message};

// ============================================================================
// Query Envelope
// ============================================================================

/// Top-level query message sent to the execution agent
#[derive(Clone, PartialEq, Message)]
pub struct Query {
    /// Package or source identity the query targets
    #[prost(message, optional, tag = "1")]
    pub id: Option<QueryId>,

    /// Client and dataset version metadata
    #[prost(message, optional, tag = "2")]
    pub client_version: Option<ClientVersion>,

    /// Name of the table to select from
    #[prost(string, tag = "3")]
    pub select_from: String,

    /// Ordered projection list
    #[prost(message, repeated, tag = "4")]
    pub select: Vec<SelectExpression>,

    /// Root filter predicate
    #[prost(message, optional, tag = "5")]
    pub filter: Option<BooleanExpression>,

    /// Ordered grouping keys
    #[prost(message, repeated, tag = "6")]
    pub group_by: Vec<GroupByExpression>,

    /// Ordered result ordering
    #[prost(message, repeated, tag = "7")]
    pub order_by: Vec<OrderByExpression>,

    /// Row cap; absent means the agent default applies
    #[prost(uint64, optional, tag = "8")]
    pub limit: Option<u64>,

    /// When set, the agent validates and compiles without executing
    #[prost(bool, tag = "9")]
    pub dry_run: bool,
}

/// Identity of the package or source a query targets
#[derive(Clone, PartialEq, Message)]
pub struct QueryId {
    /// Exactly one identity kind is set
    #[prost(oneof = "query_id::IdType", tags = "1, 2")]
    pub id_type: Option<query_id::IdType>,
}

/// Oneof payload types for [`QueryId`]
pub mod query_id {
    /// Identity kind carried by a query id
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum IdType {
        /// Data package identifier
        #[prost(string, tag = "1")]
        PackageId(String),
        /// Source identifier for agent-managed deployments
        #[prost(string, tag = "2")]
        SourceId(String),
    }
}

impl QueryId {
    /// Identify a query by data package id
    pub fn package(package_id: impl Into<String>) -> Self {
        Self {
            id_type: Some(query_id::IdType::PackageId(package_id.into())),
        }
    }

    /// Identify a query by source id
    pub fn source(source_id: impl Into<String>) -> Self {
        Self {
            id_type: Some(query_id::IdType::SourceId(source_id.into())),
        }
    }
}

/// Client and dataset version metadata attached to every query
#[derive(Clone, PartialEq, Message)]
pub struct ClientVersion {
    /// Client implementation code
    #[prost(enumeration = "Client", tag = "1")]
    pub client: i32,

    /// Version of the client library that produced the query
    #[prost(string, tag = "2")]
    pub code_version: String,

    /// Version of the dataset the query was built against
    #[prost(string, tag = "3")]
    pub dataset_version: String,
}

/// Client implementations known to the agent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum Client {
    /// Dart client
    Dart = 0,
    /// Node.js client
    NodeJs = 1,
    /// Python client
    Python = 2,
    /// C# client
    Csharp = 3,
    /// Go client
    Golang = 4,
    /// Rust client
    Rust = 5,
}

// ============================================================================
// Expressions
// ============================================================================

/// Reference to a named field
#[derive(Clone, PartialEq, Message)]
pub struct FieldReference {
    /// Field name as declared by the table schema
    #[prost(string, tag = "1")]
    pub field_name: String,
}

/// A lowered expression node
#[derive(Clone, PartialEq, Message)]
pub struct Expression {
    /// Exactly one expression kind is set
    #[prost(oneof = "expression::ExType", tags = "1, 2, 3, 4, 5")]
    pub ex_type: Option<expression::ExType>,
}

/// Oneof payload types for [`Expression`]
pub mod expression {
    /// Expression kind carried by a node
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ExType {
        /// Plain field reference
        #[prost(message, tag = "1")]
        Field(super::FieldReference),
        /// Literal value
        #[prost(message, tag = "2")]
        Literal(super::Literal),
        /// Projected calendar or time component
        #[prost(message, tag = "3")]
        Derived(Box<super::DerivedExpression>),
        /// Aggregate over an expression
        #[prost(message, tag = "4")]
        Aggregate(Box<super::AggregateExpression>),
        /// Nested boolean condition
        #[prost(message, tag = "5")]
        Condition(super::BooleanExpression),
    }
}

impl Expression {
    /// Wrap a field reference
    pub fn field(reference: FieldReference) -> Self {
        Self {
            ex_type: Some(expression::ExType::Field(reference)),
        }
    }

    /// Wrap a literal
    pub fn literal(literal: Literal) -> Self {
        Self {
            ex_type: Some(expression::ExType::Literal(literal)),
        }
    }

    /// Wrap a derived expression
    pub fn derived(derived: DerivedExpression) -> Self {
        Self {
            ex_type: Some(expression::ExType::Derived(Box::new(derived))),
        }
    }

    /// Wrap an aggregate expression
    pub fn aggregate(aggregate: AggregateExpression) -> Self {
        Self {
            ex_type: Some(expression::ExType::Aggregate(Box::new(aggregate))),
        }
    }

    /// Wrap a boolean condition
    pub fn condition(condition: BooleanExpression) -> Self {
        Self {
            ex_type: Some(expression::ExType::Condition(condition)),
        }
    }
}

/// A literal wire value
#[derive(Clone, PartialEq, Message)]
pub struct Literal {
    /// Exactly one payload kind is set
    #[prost(oneof = "literal::LiteralType", tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10")]
    pub literal_type: Option<literal::LiteralType>,
}

/// Oneof payload types for [`Literal`]
pub mod literal {
    /// Payload kind carried by a literal
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum LiteralType {
        /// UTF-8 string
        #[prost(string, tag = "1")]
        String(String),
        /// Boolean
        #[prost(bool, tag = "2")]
        Boolean(bool),
        /// 32-bit signed integer
        #[prost(int32, tag = "3")]
        I32(i32),
        /// 64-bit unsigned integer
        #[prost(uint64, tag = "4")]
        Ui64(u64),
        /// 32-bit unsigned integer
        #[prost(uint32, tag = "5")]
        Ui32(u32),
        /// 64-bit signed integer
        #[prost(int64, tag = "6")]
        I64(i64),
        /// 32-bit float
        #[prost(float, tag = "7")]
        F32(f32),
        /// 64-bit float
        #[prost(double, tag = "8")]
        F64(f64),
        /// Milliseconds since the Unix epoch
        #[prost(int64, tag = "9")]
        Timestamp(i64),
        /// Ordered list of literals
        #[prost(message, tag = "10")]
        List(super::LiteralList),
    }
}

/// Ordered list of literal values
#[derive(Clone, PartialEq, Message)]
pub struct LiteralList {
    /// Entries in caller order
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<Literal>,
}

/// Projected calendar or time component
#[derive(Clone, PartialEq, Message)]
pub struct DerivedExpression {
    /// Projection operator code
    #[prost(enumeration = "ProjectionOperator", tag = "1")]
    pub op: i32,

    /// Expression the component is projected from
    #[prost(message, optional, tag = "2")]
    pub argument: Option<Expression>,
}

/// Aggregate over a lowered expression
#[derive(Clone, PartialEq, Message)]
pub struct AggregateExpression {
    /// Aggregate operator code
    #[prost(enumeration = "AggregateOperator", tag = "1")]
    pub op: i32,

    /// Expression being aggregated
    #[prost(message, optional, tag = "2")]
    pub argument: Option<Expression>,
}

/// Boolean predicate node
#[derive(Clone, PartialEq, Message)]
pub struct BooleanExpression {
    /// Boolean operator code
    #[prost(enumeration = "BooleanOperator", tag = "1")]
    pub op: i32,

    /// Operand expressions in evaluation order
    #[prost(message, repeated, tag = "2")]
    pub arguments: Vec<Expression>,
}

// ============================================================================
// Query Clauses
// ============================================================================

/// One projection entry with an optional output alias
#[derive(Clone, PartialEq, Message)]
pub struct SelectExpression {
    /// Expression being selected
    #[prost(message, optional, tag = "1")]
    pub argument: Option<Expression>,

    /// Output column alias
    #[prost(string, optional, tag = "2")]
    pub alias: Option<String>,
}

/// Grouping key
#[derive(Clone, PartialEq, Message)]
pub struct GroupByExpression {
    /// Exactly one grouping kind is set
    #[prost(oneof = "group_by_expression::ExType", tags = "1, 2")]
    pub ex_type: Option<group_by_expression::ExType>,
}

/// Oneof payload types for [`GroupByExpression`]
pub mod group_by_expression {
    /// Grouping kind carried by a group-by entry
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ExType {
        /// Group by a plain field
        #[prost(message, tag = "1")]
        Field(super::FieldReference),
        /// Group by a projected component
        #[prost(message, tag = "2")]
        Derived(super::DerivedExpression),
    }
}

/// One ordering entry
#[derive(Clone, PartialEq, Message)]
pub struct OrderByExpression {
    /// Expression ordered by
    #[prost(message, optional, tag = "1")]
    pub argument: Option<Expression>,

    /// Sort direction code
    #[prost(enumeration = "SortDirection", tag = "2")]
    pub direction: i32,
}

// ============================================================================
// Operator Codes
// ============================================================================

/// Boolean operator codes
///
/// Value 2 is reserved by the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum BooleanOperator {
    /// Logical conjunction
    And = 0,
    /// Logical disjunction
    Or = 1,
    /// Equal
    Eq = 3,
    /// Not equal
    Neq = 4,
    /// Less than
    Lt = 5,
    /// Less than or equal
    Lte = 6,
    /// Greater than
    Gt = 7,
    /// Greater than or equal
    Gte = 8,
    /// LIKE pattern match
    Like = 9,
    /// Range containment
    Between = 10,
    /// List membership
    In = 11,
    /// Null test
    IsNull = 12,
    /// Non-null test
    IsNotNull = 13,
    /// Array overlap
    HasAny = 14,
    /// Array containment
    HasAll = 15,
}

/// Aggregate operator codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum AggregateOperator {
    /// Minimum value
    Min = 0,
    /// Maximum value
    Max = 1,
    /// Arithmetic mean
    Mean = 2,
    /// Median value
    Median = 3,
    /// Row count
    Count = 4,
    /// Count of distinct values
    CountDistinct = 5,
    /// Sum of values
    Sum = 6,
    /// Arithmetic mean over distinct values
    MeanDistinct = 7,
}

/// Projection operator codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum ProjectionOperator {
    /// Calendar year
    Year = 0,
    /// Month of year
    Month = 1,
    /// Day of month
    Day = 2,
    /// Hour of day
    Hour = 3,
    /// Minute of hour
    Minute = 4,
    /// Second of minute
    Second = 5,
    /// Millisecond of second
    Millisecond = 6,
    /// Date part of a datetime
    Date = 7,
    /// Time part of a datetime
    Time = 8,
}

/// Sort direction codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum SortDirection {
    /// Ascending
    Asc = 0,
    /// Descending
    Desc = 1,
}

// ============================================================================
// Tests
// ============================================================================
