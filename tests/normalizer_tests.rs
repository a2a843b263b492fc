/// Unit tests for lead normalization
/// Covers section projection, score parsing and merge precedence
use rust_tu_leads::errors::AppError;
use rust_tu_leads::models::LeadRecord;
use rust_tu_leads::normalizer::{normalize, Normalizer, Projected, DEMOGRAPHIC_FIELDS};
use serde_json::{json, Value};

fn record(value: Value) -> LeadRecord {
    LeadRecord::from_value(value).expect("test record must be an object")
}

#[cfg(test)]
mod personal_tests {
    use super::*;

    #[test]
    fn test_first_name_lower_cased() {
        let features = normalize(Some(&record(json!({"data": {"first": "JOHN"}})))).unwrap();

        assert_eq!(features["first"], json!("john"));
        // Only the personal keys, nothing from demo or score
        assert_eq!(features.len(), 4);
        let personal = ["email", "phone", "first", "last"];
        assert!(features.keys().all(|k| personal.contains(&k.as_str())));
    }

    #[test]
    fn test_missing_personal_keys_written_as_null() {
        let features = normalize(Some(&record(json!({"data": {"first": "JOHN"}})))).unwrap();

        assert_eq!(features["email"], Value::Null);
        assert_eq!(features["phone"], Value::Null);
        assert_eq!(features["last"], Value::Null);
    }

    #[test]
    fn test_empty_string_becomes_null() {
        let features = normalize(Some(&record(json!({"data": {"email": ""}})))).unwrap();
        assert_eq!(features["email"], Value::Null);
    }

    #[test]
    fn test_numeric_phone_kept_as_number() {
        let features = normalize(Some(&record(json!({"data": {"phone": 3124784892u64}})))).unwrap();
        assert_eq!(features["phone"], json!(3124784892u64));
    }

    #[test]
    fn test_no_data_section_writes_no_personal_keys() {
        let features = normalize(Some(&record(json!({"demo": {"age": {"years": 30}}})))).unwrap();
        assert!(!features.contains_key("first"));
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn test_absent_and_empty_stay_distinct_in_typed_view() {
        let rec = record(json!({"data": {"first": null}}));
        let typed = Normalizer::new().extract(Some(&rec)).unwrap();

        assert_eq!(typed.personal["first"], Projected::Empty);
        assert_eq!(typed.personal["last"], Projected::Absent);
        assert!(!typed.personal["first"].is_value());
    }
}

#[cfg(test)]
mod demographic_tests {
    use super::*;

    #[test]
    fn test_composite_key() {
        let features = normalize(Some(&record(json!({"demo": {"age": {"years": 45}}})))).unwrap();
        assert_eq!(features["age_years"], json!(45));
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn test_missing_qualifier_is_null() {
        let features =
            normalize(Some(&record(json!({"demo": {"income": {"euros": 1}}})))).unwrap();
        assert_eq!(features["income_dollars"], Value::Null);
    }

    #[test]
    fn test_raw_sub_values_not_lower_cased() {
        let features =
            normalize(Some(&record(json!({"demo": {"married": {"yes": "Y"}}})))).unwrap();
        assert_eq!(features["married_yes"], json!("Y"));
    }

    #[test]
    fn test_all_ten_pairs() {
        let mut demo = serde_json::Map::new();
        for (field, qualifier) in DEMOGRAPHIC_FIELDS {
            demo.insert(field.to_string(), json!({ qualifier: 1 }));
        }
        let features = normalize(Some(&record(json!({ "demo": demo })))).unwrap();

        assert_eq!(features.len(), 10);
        for (field, qualifier) in DEMOGRAPHIC_FIELDS {
            assert_eq!(features[&format!("{}_{}", field, qualifier)], json!(1));
        }
    }
}

#[cfg(test)]
mod score_tests {
    use super::*;

    #[test]
    fn test_score_parsed_to_integer() {
        let features = normalize(Some(&record(
            json!({"score": [{"name": "riskA", "score": "222"}]}),
        )))
        .unwrap();

        assert_eq!(features["riskA"], json!(222));
        assert!(features["riskA"].is_i64());
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let features = normalize(Some(&record(json!({"score": [
            {"name": "riskA", "score": "1"},
            {"name": "riskB", "score": "5"},
            {"name": "riskA", "score": "2"}
        ]}))))
        .unwrap();

        assert_eq!(features["riskA"], json!(2));
        assert_eq!(features["riskB"], json!(5));
    }

    #[test]
    fn test_incomplete_entries_skipped() {
        let features = normalize(Some(&record(json!({"score": [
            {"name": "riskA"},
            {"score": "5"},
            {"name": "riskC", "score": " 42 "}
        ]}))))
        .unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(features["riskC"], json!(42));
    }

    #[test]
    fn test_non_numeric_score_is_fatal() {
        let err = normalize(Some(&record(
            json!({"score": [{"name": "riskA", "score": "high"}]}),
        )))
        .unwrap_err();

        assert_eq!(
            err,
            AppError::InvalidScore {
                name: "riskA".to_string(),
                value: "\"high\"".to_string(),
            }
        );
    }

    #[test]
    fn test_score_overwrites_personal_field() {
        let rec = record(json!({
            "data": {"first": "JOHN"},
            "score": [{"name": "first", "score": "9"}]
        }));

        let typed = Normalizer::new().extract(Some(&rec)).unwrap();
        assert_eq!(typed.collisions(), vec!["first".to_string()]);

        let features = typed.into_map();
        assert_eq!(features["first"], json!(9));
    }
}

#[test]
fn test_absent_record() {
    assert!(normalize(None).unwrap().is_empty());
}

#[test]
fn test_normalize_is_idempotent() {
    let rec = record(json!({
        "data": {"first": "Ana", "email": "ANA@X.IO"},
        "demo": {"age": {"years": 30}, "children": {"yes": "N"}},
        "score": [{"name": "riskA", "score": "100"}]
    }));
    let normalizer = Normalizer::new();

    let first = normalizer.normalize(Some(&rec)).unwrap();
    let second = normalizer.normalize(Some(&rec)).unwrap();
    assert_eq!(first, second);
}
