//! Tests for record splitting and the line parser.

use tally::{LineParser, Reject, Schema, split_fields};

#[test]
fn test_split_plain_fields() {
    let fields = split_fields("1,Laptop,electronics,1200.50,2,2024-01-15", ',');
    assert_eq!(
        fields,
        Some(vec![
            "1".to_string(),
            "Laptop".to_string(),
            "electronics".to_string(),
            "1200.50".to_string(),
            "2".to_string(),
            "2024-01-15".to_string(),
        ])
    );
}

#[test]
fn test_split_quoted_delimiter() {
    let fields = split_fields(r#"2,"Mouse, wireless",electronics"#, ',');
    assert_eq!(
        fields,
        Some(vec![
            "2".to_string(),
            "Mouse, wireless".to_string(),
            "electronics".to_string(),
        ])
    );
}

#[test]
fn test_split_doubled_quote_escape() {
    let fields = split_fields(r#"1,"15"" display",tech"#, ',');
    assert_eq!(
        fields,
        Some(vec![
            "1".to_string(),
            r#"15" display"#.to_string(),
            "tech".to_string(),
        ])
    );
}

#[test]
fn test_split_unbalanced_quote_is_malformed() {
    assert_eq!(split_fields(r#"5,"Unterminated,furniture,10.00"#, ','), None);
    assert_eq!(split_fields(r#"""#, ','), None);
    assert_eq!(split_fields(r#"a,b,"c"", d"#, ','), None);
}

#[test]
fn test_split_quote_mid_field_is_literal() {
    // Quotes only open quoted mode at the start of a field.
    let fields = split_fields(r#"5'10",tall"#, ',');
    assert_eq!(
        fields,
        Some(vec![r#"5'10""#.to_string(), "tall".to_string()])
    );
}

#[test]
fn test_split_text_after_closing_quote() {
    let fields = split_fields(r#""ab"cd,x"#, ',');
    assert_eq!(fields, Some(vec!["abcd".to_string(), "x".to_string()]));
}

#[test]
fn test_split_empty_fields() {
    assert_eq!(
        split_fields(",,", ','),
        Some(vec![String::new(), String::new(), String::new()])
    );
    assert_eq!(
        split_fields(r#"a,"",b"#, ','),
        Some(vec!["a".to_string(), String::new(), "b".to_string()])
    );
    // A lone empty line still yields one empty field.
    assert_eq!(split_fields("", ','), Some(vec![String::new()]));
}

#[test]
fn test_split_alternate_delimiter() {
    let fields = split_fields("a;b,c;d", ';');
    assert_eq!(
        fields,
        Some(vec!["a".to_string(), "b,c".to_string(), "d".to_string()])
    );
}

#[test]
fn test_parser_accepts_data_row() {
    let schema = Schema::sales();
    let mut parser = LineParser::new(&schema);
    let record = parser
        .parse("1,Laptop,electronics,1200.50,2,2024-01-15")
        .unwrap();
    assert_eq!(record.fields.len(), 6);
    assert_eq!(record.fields[2], "electronics");
}

#[test]
fn test_parser_rejects_blank_lines() {
    let schema = Schema::sales();
    let mut parser = LineParser::new(&schema);
    assert_eq!(parser.parse(""), Err(Reject::HeaderOrBlank));
    assert_eq!(parser.parse("   \t  "), Err(Reject::HeaderOrBlank));
}

#[test]
fn test_parser_rejects_headers_anywhere() {
    let schema = Schema::sales();
    let mut parser = LineParser::new(&schema);
    assert!(!parser.header_seen());

    let header = "id,name,category,price,quantity,date";
    assert_eq!(parser.parse(header), Err(Reject::HeaderOrBlank));
    assert!(parser.header_seen());

    // Data between does not reset header detection.
    parser.parse("1,Laptop,electronics,1200.50,2,2024-01-15").unwrap();
    assert_eq!(parser.parse(header), Err(Reject::HeaderOrBlank));
}

#[test]
fn test_parser_header_detection_is_exact() {
    let schema = Schema::sales();
    let mut parser = LineParser::new(&schema);
    // First field must equal the leading column exactly; "ID" is data.
    let record = parser.parse("ID,name,category,price,quantity,date").unwrap();
    assert_eq!(record.fields[0], "ID");
    assert!(!parser.header_seen());

    // A quoted leading column still reads as a header once unquoted.
    assert_eq!(
        parser.parse(r#""id",name,category,price,quantity,date"#),
        Err(Reject::HeaderOrBlank)
    );
}

#[test]
fn test_parser_rejects_arity_mismatch() {
    let schema = Schema::sales();
    let mut parser = LineParser::new(&schema);
    assert_eq!(
        parser.parse("6,Pen,office,2.50"),
        Err(Reject::ArityMismatch {
            expected: 6,
            found: 4
        })
    );
    assert_eq!(
        parser.parse("6,Pen,office,2.50,1,2024-01-19,extra"),
        Err(Reject::ArityMismatch {
            expected: 6,
            found: 7
        })
    );
}

#[test]
fn test_parser_rejects_malformed_quoting_before_arity() {
    let schema = Schema::sales();
    let mut parser = LineParser::new(&schema);
    // Unbalanced quote wins even though the field count would also be off.
    assert_eq!(
        parser.parse(r#"5,"Unterminated,furniture,10.00"#),
        Err(Reject::MalformedQuoting)
    );
}

#[test]
fn test_reject_labels() {
    assert_eq!(Reject::HeaderOrBlank.label(), "header-or-blank");
    assert_eq!(Reject::MalformedQuoting.label(), "malformed-quoting");
    assert_eq!(
        Reject::ArityMismatch {
            expected: 6,
            found: 4
        }
        .label(),
        "arity-mismatch"
    );
    assert_eq!(
        Reject::TypeConversion {
            column: "price".to_string(),
            value: "abc".to_string()
        }
        .label(),
        "type-conversion-failed"
    );
}

#[test]
fn test_reject_display() {
    assert_eq!(
        Reject::ArityMismatch {
            expected: 6,
            found: 4
        }
        .to_string(),
        "expected 6 fields, found 4"
    );
    assert_eq!(
        Reject::TypeConversion {
            column: "price".to_string(),
            value: "abc".to_string()
        }
        .to_string(),
        "cannot convert 'abc' in column 'price'"
    );
}
