//! Immutable table query builder
//!
//! A [`Table`] snapshots one query plan over a named dataset: projection,
//! filter, ordering, and row cap. Every builder method returns a new
//! `Table` and leaves the receiver untouched, so derived queries never
//! interfere with the snapshot they were built from:
//!
//! ```rust
//! use wireql::expr::fields::{Field, StringField};
//! use wireql::table::{Table, TableSource};
//!
//! let name = StringField::new("name");
//! let price: Field<f64> = Field::new("price");
//!
//! let source = TableSource::new("pkg-123", "catalog", "0.1.0");
//! let products = Table::new(source, "products", vec![(&name).into(), (&price).into()]);
//!
//! let cheap = products.filter(price.lt(10.0)).limit(25);
//! assert_eq!(products.limit_to(), 1000);
//! assert_eq!(cheap.limit_to(), 25);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{Backend, Row};
use crate::error::{BackendError, Result};
use crate::expr::fields::{ArrayField, Field};
use crate::expr::{
    AggregateFieldExpr, DerivedField, Expr, FieldRef, LiteralField, Predicate,
};

/// Row cap applied to every new table until `limit` overrides it
const DEFAULT_LIMIT: u64 = 1000;

// ============================================================================
// Source Descriptor
// ============================================================================

/// Identity of the dataset a table belongs to
///
/// Carries the package manifest fields that say where a table's data lives
/// and which dataset version it was generated from. The package id and
/// dataset version travel in every compiled query header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSource {
    /// Data package identifier
    pub package_id: String,
    /// Dataset name within the package
    pub dataset_name: String,
    /// Semantic version of the dataset
    pub dataset_version: String,
    /// Optional path or URL the table was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl TableSource {
    /// Describe a dataset by package id, name, and version
    pub fn new(
        package_id: impl Into<String>,
        dataset_name: impl Into<String>,
        dataset_version: impl Into<String>,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            dataset_name: dataset_name.into(),
            dataset_version: dataset_version.into(),
            source: None,
        }
    }

    /// Set the origin path or URL
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

// ============================================================================
// Selectors and Ordering
// ============================================================================

/// Sort direction for an ordering entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending order
    Asc,
    /// Descending order
    Desc,
}

/// A selection or ordering argument
///
/// Plain strings resolve against the table: declared schema fields first,
/// then selection aliases. Expressions are used as given.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Column name or selection alias, resolved through the table
    Name(String),
    /// Expression used verbatim
    Expr(Expr),
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Selector::Name(name.to_string())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Selector::Name(name)
    }
}

impl From<Expr> for Selector {
    fn from(expr: Expr) -> Self {
        Selector::Expr(expr)
    }
}

impl From<FieldRef> for Selector {
    fn from(node: FieldRef) -> Self {
        Selector::Expr(node.into())
    }
}

impl From<LiteralField> for Selector {
    fn from(node: LiteralField) -> Self {
        Selector::Expr(node.into())
    }
}

impl From<DerivedField> for Selector {
    fn from(node: DerivedField) -> Self {
        Selector::Expr(node.into())
    }
}

impl From<AggregateFieldExpr> for Selector {
    fn from(node: AggregateFieldExpr) -> Self {
        Selector::Expr(node.into())
    }
}

impl<T> From<Field<T>> for Selector {
    fn from(field: Field<T>) -> Self {
        Selector::Expr(field.into())
    }
}

impl<T> From<&Field<T>> for Selector {
    fn from(field: &Field<T>) -> Self {
        Selector::Expr(field.into())
    }
}

impl<T> From<ArrayField<T>> for Selector {
    fn from(field: ArrayField<T>) -> Self {
        Selector::Expr(field.into())
    }
}

impl<T> From<&ArrayField<T>> for Selector {
    fn from(field: &ArrayField<T>) -> Self {
        Selector::Expr(field.into())
    }
}

// ============================================================================
// Table
// ============================================================================

/// Immutable query plan over one named table
///
/// The declared schema and its name index are shared between snapshots;
/// projection, filter, ordering, and limit are owned per snapshot.
#[derive(Clone)]
pub struct Table {
    source: TableSource,
    name: String,
    fields: Arc<Vec<Expr>>,
    name_index: Arc<HashMap<String, usize>>,
    filter_expr: Option<Predicate>,
    selection: Option<Vec<Expr>>,
    ordering: Option<Vec<(Expr, Direction)>>,
    limit_to: u64,
    backend: Option<Arc<dyn Backend>>,
}

impl Table {
    /// Create a table over the named dataset with its declared fields
    pub fn new(source: TableSource, name: impl Into<String>, fields: Vec<Expr>) -> Self {
        let name_index = fields
            .iter()
            .enumerate()
            .map(|(position, field)| (field.name(), position))
            .collect();
        Self {
            source,
            name: name.into(),
            fields: Arc::new(fields),
            name_index: Arc::new(name_index),
            filter_expr: None,
            selection: None,
            ordering: None,
            limit_to: DEFAULT_LIMIT,
            backend: None,
        }
    }

    /// Attach the backend used by [`Table::compile`] and [`Table::execute`]
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Dataset identity this table belongs to
    pub fn source(&self) -> &TableSource {
        &self.source
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared schema fields, in declaration order
    pub fn fields(&self) -> &[Expr] {
        &self.fields
    }

    /// Current projection, when one was set
    pub fn selection(&self) -> Option<&[Expr]> {
        self.selection.as_deref()
    }

    /// Current filter predicate, when one was set
    pub fn filter_expr(&self) -> Option<&Predicate> {
        self.filter_expr.as_ref()
    }

    /// Current ordering, when one was set
    pub fn ordering(&self) -> Option<&[(Expr, Direction)]> {
        self.ordering.as_deref()
    }

    /// Current row cap
    pub fn limit_to(&self) -> u64 {
        self.limit_to
    }

    /// Look up an expression by column name or selection alias
    ///
    /// Declared schema fields win over selection aliases. Returns `None`
    /// when neither matches.
    pub fn field(&self, name: &str) -> Option<&Expr> {
        if let Some(&position) = self.name_index.get(name) {
            return self.fields.get(position);
        }
        self.selection
            .as_ref()
            .and_then(|selection| selection.iter().find(|expr| expr.alias() == Some(name)))
    }

    /// New table with the projection replaced
    ///
    /// Entries keep caller order. Names that match neither a schema field
    /// nor a selection alias become plain field references, so the agent
    /// reports the unknown column instead of the client guessing.
    pub fn select(&self, selection: Vec<Selector>) -> Table {
        let resolved = selection
            .into_iter()
            .map(|selector| self.resolve(selector))
            .collect();
        let mut copy = self.clone();
        copy.selection = Some(resolved);
        copy
    }

    /// New table with the filter predicate replaced
    pub fn filter(&self, predicate: impl Into<Predicate>) -> Table {
        let mut copy = self.clone();
        copy.filter_expr = Some(predicate.into());
        copy
    }

    /// New table with the ordering replaced
    ///
    /// Names resolve like selection entries, so an aggregate selected under
    /// an alias can be ordered by that alias.
    pub fn order_by(&self, ordering: Vec<(Selector, Direction)>) -> Table {
        let resolved = ordering
            .into_iter()
            .map(|(selector, direction)| (self.resolve(selector), direction))
            .collect();
        let mut copy = self.clone();
        copy.ordering = Some(resolved);
        copy
    }

    /// New table with the row cap set
    ///
    /// A cap of zero drops the limit from the compiled query, leaving the
    /// row cap to the agent's own default. It does not mean unlimited.
    pub fn limit(&self, n: u64) -> Table {
        let mut copy = self.clone();
        copy.limit_to = n;
        copy
    }

    /// Compile through the attached backend into its native query string
    pub async fn compile(&self) -> Result<String> {
        let backend = self.attached_backend()?;
        debug!(table = %self.name, "compiling table query");
        Ok(backend.compile(self).await?)
    }

    /// Execute through the attached backend and return decoded rows
    pub async fn execute(&self) -> Result<Vec<Row>> {
        let backend = self.attached_backend()?;
        debug!(table = %self.name, limit = self.limit_to, "executing table query");
        Ok(backend.execute(self).await?)
    }

    fn attached_backend(&self) -> std::result::Result<&Arc<dyn Backend>, BackendError> {
        self.backend
            .as_ref()
            .ok_or_else(|| BackendError::NotAttached(self.name.clone()))
    }

    fn resolve(&self, selector: Selector) -> Expr {
        match selector {
            Selector::Name(name) => self
                .field(&name)
                .cloned()
                .unwrap_or_else(|| Expr::Field(FieldRef::new(name))),
            Selector::Expr(expr) => expr,
        }
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("selection", &self.selection)
            .field("filter", &self.filter_expr)
            .field("ordering", &self.ordering)
            .field("limit_to", &self.limit_to)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
