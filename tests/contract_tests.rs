use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use scholartrack::entities::scholarship;
use scholartrack::routes::scholarship::{ScholarshipCreate, ScholarshipRead, ScholarshipUpdate};
use serde_json::{json, Value};

#[test]
fn test_create_contract_requires_core_fields() {
    let result: Result<ScholarshipCreate, _> = serde_json::from_value(json!({
        "name": "Arts Award",
        "description": "For visual arts students"
    }));
    assert!(result.is_err());

    let create: ScholarshipCreate = serde_json::from_value(json!({
        "name": "Arts Award",
        "description": "For visual arts students",
        "amount": "1000.00",
        "deadline": "2026-03-01"
    }))
    .unwrap();
    assert_eq!(create.amount, Decimal::new(100000, 2));
    assert_eq!(create.deadline, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    assert!(create.eligibility.is_none());
    assert!(create.tags.is_none());
}

#[test]
fn test_create_contract_accepts_optional_fields() {
    let create: ScholarshipCreate = serde_json::from_value(json!({
        "name": "Arts Award",
        "description": "For visual arts students",
        "amount": 1000.5,
        "deadline": "2026-03-01",
        "eligibility": "Portfolio required",
        "application_url": "https://example.org/apply",
        "eligibility_criteria": {"min_gpa": 3.0, "region": "EU"},
        "tags": ["arts", "portfolio"]
    }))
    .unwrap();

    assert_eq!(create.eligibility.as_deref(), Some("Portfolio required"));
    assert_eq!(
        create.eligibility_criteria.as_ref().unwrap()["region"],
        "EU"
    );
    assert_eq!(
        create.tags,
        Some(vec!["arts".to_string(), "portfolio".to_string()])
    );
}

#[test]
fn test_update_contract_distinguishes_absent_from_null() {
    // Absent: leave untouched
    let update: ScholarshipUpdate = serde_json::from_value(json!({})).unwrap();
    assert!(update.eligibility.is_none());
    assert!(update.tags.is_none());

    // Explicit null: clear the stored value
    let update: ScholarshipUpdate =
        serde_json::from_value(json!({"eligibility": null, "tags": null})).unwrap();
    assert_eq!(update.eligibility, Some(None));
    assert_eq!(update.tags, Some(None));

    // Supplied value: replace
    let update: ScholarshipUpdate =
        serde_json::from_value(json!({"eligibility": "Open to all", "tags": ["open"]})).unwrap();
    assert_eq!(update.eligibility, Some(Some("Open to all".to_string())));
    assert_eq!(update.tags, Some(Some(vec!["open".to_string()])));
}

#[test]
fn test_read_contract_mirrors_persisted_record() {
    let model = scholarship::Model {
        id: 7,
        name: "STEM Futures Grant".to_string(),
        description: "Annual grant for undergraduates".to_string(),
        amount: Decimal::new(500000, 2),
        deadline: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
        eligibility: Some("Enrolled full-time".to_string()),
        application_url: Some("https://example.org/apply".to_string()),
        eligibility_criteria: Some(json!({"min_gpa": 3.5})),
        tags: Some(vec!["stem".to_string()]),
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        updated_at: Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()),
    };

    let read = ScholarshipRead::from(model);
    let value: Value = serde_json::to_value(&read).unwrap();

    assert_eq!(value["id"], 7);
    assert_eq!(value["name"], "STEM Futures Grant");
    assert_eq!(value["deadline"], "2026-06-30");
    assert_eq!(value["eligibility_criteria"]["min_gpa"], 3.5);
    assert_eq!(value["tags"][0], "stem");
    assert!(value["created_at"].is_string());
    assert!(value["updated_at"].is_string());
}
