//! Integration tests for table-to-wire query compilation
//!
//! These tests exercise the full pipeline:
//! - Header population (package id, client version, dataset version)
//! - Selection lowering with aliases and implicit group-by inference
//! - Filter, ordering, and limit lowering
//! - Wire message encode/decode round-trips
//! - Compilation and execution through a stub backend

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use prost::Message;

use wireql::backend::{Backend, Row};
use wireql::compiler::{self, CompilerOptions};
use wireql::error::BackendError;
use wireql::expr::fields::{DateField, Field, StringField};
use wireql::table::{Direction, Table, TableSource};
use wireql::wire;

// ============================================================================
// Helpers
// ============================================================================

/// Catalog table shared across tests
fn create_test_table() -> Table {
    let source = TableSource::new("pkg-123", "catalog", "0.9.2").with_source("s3://bucket/catalog");
    Table::new(
        source,
        "products",
        vec![
            StringField::new("id").into(),
            StringField::new("name").into(),
            Field::<f64>::new("price").into(),
            DateField::new("created_on").into(),
        ],
    )
}

fn expression_kind(expr: &wire::Expression) -> &wire::expression::ExType {
    expr.ex_type.as_ref().expect("expression kind set")
}

fn select_field_name(entry: &wire::SelectExpression) -> &str {
    match expression_kind(entry.argument.as_ref().expect("select argument set")) {
        wire::expression::ExType::Field(reference) => &reference.field_name,
        other => panic!("expected field selection, got {other:?}"),
    }
}

// ============================================================================
// Lowering
// ============================================================================

#[test]
fn test_selection_only_query() {
    let table = create_test_table()
        .select(vec!["name".into(), "price".into()])
        .limit(10);
    let query = compiler::lower_table(&table).expect("lowering succeeds");

    assert_eq!(query.select_from, "products");
    assert_eq!(query.select.len(), 2);
    assert_eq!(select_field_name(&query.select[0]), "name");
    assert_eq!(select_field_name(&query.select[1]), "price");
    assert!(query.filter.is_none());
    assert!(query.group_by.is_empty());
    assert!(query.order_by.is_empty());
    assert_eq!(query.limit, Some(10));
    assert!(!query.dry_run);

    let id = query.id.expect("query id set");
    assert_eq!(
        id.id_type,
        Some(wire::query_id::IdType::PackageId("pkg-123".to_string()))
    );
    let version = query.client_version.expect("client version set");
    assert_eq!(version.client, wire::Client::Rust as i32);
    assert_eq!(version.dataset_version, "0.9.2");
}

#[test]
fn test_filtered_query_nests_conditions() {
    let name = StringField::new("name");
    let created = DateField::new("created_on");
    let cutoff = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");

    let table = create_test_table()
        .select(vec!["name".into()])
        .filter(name.like("%bah%").and(created.before(cutoff)));
    let query = compiler::lower_table(&table).expect("lowering succeeds");

    let filter = query.filter.expect("filter set");
    assert_eq!(filter.op, wire::BooleanOperator::And as i32);
    assert_eq!(filter.arguments.len(), 2);

    let like = match expression_kind(&filter.arguments[0]) {
        wire::expression::ExType::Condition(condition) => condition,
        other => panic!("expected nested condition, got {other:?}"),
    };
    assert_eq!(like.op, wire::BooleanOperator::Like as i32);
    match expression_kind(&like.arguments[1]) {
        wire::expression::ExType::Literal(literal) => assert_eq!(
            literal.literal_type,
            Some(wire::literal::LiteralType::String("%bah%".to_string()))
        ),
        other => panic!("expected literal pattern, got {other:?}"),
    }

    let before = match expression_kind(&filter.arguments[1]) {
        wire::expression::ExType::Condition(condition) => condition,
        other => panic!("expected nested condition, got {other:?}"),
    };
    assert_eq!(before.op, wire::BooleanOperator::Lt as i32);
    match expression_kind(&before.arguments[1]) {
        wire::expression::ExType::Literal(literal) => assert_eq!(
            literal.literal_type,
            Some(wire::literal::LiteralType::String("2023-01-01".to_string()))
        ),
        other => panic!("expected literal date, got {other:?}"),
    }
}

#[test]
fn test_aggregate_query_infers_grouping() {
    let created = DateField::new("created_on");
    let price: Field<f64> = Field::new("price");

    let table = create_test_table().select(vec![
        "name".into(),
        created.month().with_alias("month").into(),
        price.avg().with_alias("avgPrice").into(),
    ]);
    let query = compiler::lower_table(&table).expect("lowering succeeds");

    assert_eq!(query.select.len(), 3);
    assert_eq!(query.select[2].alias, Some("avgPrice".to_string()));

    // Grouping keys are the non-aggregate selections, in selection order
    assert_eq!(query.group_by.len(), 2);
    match query.group_by[0].ex_type.as_ref().expect("grouping set") {
        wire::group_by_expression::ExType::Field(reference) => {
            assert_eq!(reference.field_name, "name");
        }
        other => panic!("expected field grouping, got {other:?}"),
    }
    match query.group_by[1].ex_type.as_ref().expect("grouping set") {
        wire::group_by_expression::ExType::Derived(derived) => {
            assert_eq!(derived.op, wire::ProjectionOperator::Month as i32);
        }
        other => panic!("expected derived grouping, got {other:?}"),
    }
}

#[test]
fn test_single_aggregate_groups_by_remaining_field() {
    let price: Field<f64> = Field::new("price");
    let table =
        create_test_table().select(vec!["name".into(), price.max().with_alias("maxPrice").into()]);
    let query = compiler::lower_table(&table).expect("lowering succeeds");

    assert_eq!(query.group_by.len(), 1);
    match query.group_by[0].ex_type.as_ref().expect("grouping set") {
        wire::group_by_expression::ExType::Field(reference) => {
            assert_eq!(reference.field_name, "name");
        }
        other => panic!("expected field grouping, got {other:?}"),
    }

    assert_eq!(query.select[1].alias, Some("maxPrice".to_string()));
    match expression_kind(query.select[1].argument.as_ref().expect("argument set")) {
        wire::expression::ExType::Aggregate(aggregate) => {
            assert_eq!(aggregate.op, wire::AggregateOperator::Max as i32);
        }
        other => panic!("expected aggregate selection, got {other:?}"),
    }
}

#[test]
fn test_order_by_alias_targets_aggregate() {
    let price: Field<f64> = Field::new("price");
    let table = create_test_table()
        .select(vec!["name".into(), price.avg().with_alias("avgPrice").into()])
        .order_by(vec![
            ("avgPrice".into(), Direction::Desc),
            ("name".into(), Direction::Asc),
        ]);
    let query = compiler::lower_table(&table).expect("lowering succeeds");

    assert_eq!(query.order_by.len(), 2);
    assert_eq!(
        query.order_by[0].direction,
        wire::SortDirection::Desc as i32
    );
    match expression_kind(query.order_by[0].argument.as_ref().expect("argument set")) {
        wire::expression::ExType::Aggregate(aggregate) => {
            assert_eq!(aggregate.op, wire::AggregateOperator::Mean as i32);
        }
        other => panic!("expected aggregate ordering, got {other:?}"),
    }
    assert_eq!(query.order_by[1].direction, wire::SortDirection::Asc as i32);
}

#[test]
fn test_compilation_is_deterministic() {
    let name = StringField::new("name");
    let price: Field<f64> = Field::new("price");
    let table = create_test_table()
        .select(vec!["name".into(), price.sum().with_alias("total").into()])
        .filter(name.is_in(vec!["a", "b"]))
        .order_by(vec![("total".into(), Direction::Desc)])
        .limit(50);

    let first = compiler::lower_table(&table).expect("lowering succeeds");
    let second = compiler::lower_table(&table).expect("lowering succeeds");
    assert_eq!(first, second);
    assert_eq!(first.encode_to_vec(), second.encode_to_vec());
}

#[test]
fn test_wire_round_trip() {
    let price: Field<f64> = Field::new("price");
    let table = create_test_table()
        .select(vec!["name".into(), price.max().with_alias("top").into()])
        .limit(5);
    let query = compiler::lower_table(&table).expect("lowering succeeds");

    let encoded = query.encode_to_vec();
    let decoded = wire::Query::decode(encoded.as_slice()).expect("decode succeeds");
    assert_eq!(decoded, query);
}

// ============================================================================
// Backend Delegation
// ============================================================================

/// Backend stub that lowers with dry-run set and renders a fake query text
struct StubBackend;

#[async_trait]
impl Backend for StubBackend {
    async fn compile(&self, query: &Table) -> Result<String, BackendError> {
        let options = CompilerOptions { dry_run: true };
        let message = compiler::lower_table_with(query, &options)
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        assert!(message.dry_run);
        Ok(format!("SELECT * FROM \"{}\"", message.select_from))
    }

    async fn execute(&self, query: &Table) -> Result<Vec<Row>, BackendError> {
        let message = compiler::lower_table(query)
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        assert!(!message.dry_run);
        Ok(vec![serde_json::json!({ "name": "bolt", "price": 1.25 })])
    }
}

#[tokio::test]
async fn test_compile_delegates_to_backend() {
    let table = create_test_table().with_backend(Arc::new(StubBackend));
    let rendered = table.compile().await.expect("compile succeeds");
    assert_eq!(rendered, "SELECT * FROM \"products\"");
}

#[tokio::test]
async fn test_execute_returns_rows() {
    let table = create_test_table().with_backend(Arc::new(StubBackend));
    let rows = table.execute().await.expect("execute succeeds");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "bolt");
}

#[tokio::test]
async fn test_terminal_operations_require_backend() {
    let table = create_test_table();
    let err = table.compile().await.expect_err("no backend attached");
    assert_eq!(
        err.to_string(),
        "Backend error: No backend attached to table 'products'"
    );
}
