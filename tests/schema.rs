//! Tests for schema construction, JSON loading, and validation.

use tally::{NumKind, Schema, Stat};

#[test]
fn test_sales_schema_shape() {
    let schema = Schema::sales();
    assert_eq!(schema.arity(), 6);
    assert_eq!(schema.leading_column(), "id");
    assert_eq!(schema.category_index().unwrap(), 2);
    assert_eq!(schema.value_names(), vec!["price", "quantity", "revenue"]);
    assert_eq!(schema.value_count(), 3);
    assert_eq!(schema.delimiter, ',');
    schema.validate().unwrap();
}

#[test]
fn test_catalog_schema_shape() {
    let schema = Schema::catalog();
    assert_eq!(schema.arity(), 8);
    assert_eq!(schema.category_index().unwrap(), 4);
    assert_eq!(
        schema.value_names(),
        vec!["price", "rating_rate", "rating_count"]
    );
    assert!(schema.derived.is_empty());
    schema.validate().unwrap();
}

#[test]
fn test_header_line() {
    assert_eq!(
        Schema::sales().header_line(),
        "id,name,category,price,quantity,date"
    );
}

#[test]
fn test_stat_columns_order_and_integrality() {
    // Measures first, derived after; only integer totals print without
    // decimals.
    let sales = Schema::sales();
    let cols = sales.stat_columns();
    assert_eq!(cols.len(), 3);

    assert_eq!(cols[0].output, "avg_price");
    assert_eq!(cols[0].stat, Stat::Average);
    assert!(!cols[0].integral);

    assert_eq!(cols[1].output, "total_quantity");
    assert_eq!(cols[1].stat, Stat::Total);
    assert!(cols[1].integral);

    // revenue = price * quantity multiplies a float, so it keeps decimals.
    assert_eq!(cols[2].output, "total_revenue");
    assert_eq!(cols[2].stat, Stat::Total);
    assert!(!cols[2].integral);
}

#[test]
fn test_schema_from_json() {
    let schema = Schema::from_json_str(
        r#"{
            "columns": ["sensor", "zone", "reading"],
            "category": "zone",
            "measures": [
                {
                    "column": "reading",
                    "kind": "float",
                    "stat": "average",
                    "output": "avg_reading"
                }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(schema.arity(), 3);
    assert_eq!(schema.category, "zone");
    assert_eq!(schema.delimiter, ',', "delimiter should default to comma");
    assert!(schema.derived.is_empty());
    assert_eq!(schema.measures[0].kind, NumKind::Float);
    assert_eq!(schema.measures[0].stat, Stat::Average);
}

#[test]
fn test_schema_from_json_custom_delimiter() {
    let schema = Schema::from_json_str(
        r#"{
            "columns": ["item", "group", "units"],
            "category": "group",
            "measures": [
                {
                    "column": "units",
                    "kind": "integer",
                    "stat": "total",
                    "output": "total_units"
                }
            ],
            "delimiter": ";"
        }"#,
    )
    .unwrap();
    assert_eq!(schema.delimiter, ';');
}

#[test]
fn test_schema_from_json_rejects_invalid() {
    assert!(Schema::from_json_str("not json").is_err());
    // Deserializes but fails validation: category column missing.
    let err = Schema::from_json_str(
        r#"{
            "columns": ["a", "b"],
            "category": "missing",
            "measures": [
                {"column": "b", "kind": "float", "stat": "total", "output": "t"}
            ]
        }"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("missing"));
}

#[test]
fn test_validate_rejects_bad_layouts() {
    let mut schema = Schema::sales();
    schema.columns.clear();
    assert!(schema.validate().is_err());

    let mut schema = Schema::sales();
    schema.delimiter = '→';
    let err = schema.validate().unwrap_err();
    assert!(err.to_string().contains("ASCII"));

    let mut schema = Schema::sales();
    schema.measures.clear();
    schema.derived.clear();
    let err = schema.validate().unwrap_err();
    assert!(err.to_string().contains("no numeric values"));

    // Measure pointing at a column the layout does not have.
    let mut schema = Schema::sales();
    schema.measures[0].column = "cost".to_string();
    assert!(schema.validate().is_err());

    // Measure pointing at the category column itself.
    let mut schema = Schema::sales();
    schema.measures[0].column = "category".to_string();
    let err = schema.validate().unwrap_err();
    assert!(err.to_string().contains("category column"));

    // Derived operand that is not a tracked measure.
    let mut schema = Schema::sales();
    schema.derived[0].right = "date".to_string();
    let err = schema.validate().unwrap_err();
    assert!(err.to_string().contains("unknown measure"));

    // Output names must be unique across measures and derived fields.
    let mut schema = Schema::sales();
    schema.derived[0].output = "avg_price".to_string();
    let err = schema.validate().unwrap_err();
    assert!(err.to_string().contains("duplicate output"));
}
