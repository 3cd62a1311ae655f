//! Integration tests for the uql-mongo crate.

use chrono::{TimeZone, Utc};
use serde_json::{Value as Json, json};
use uql_core::{Document, Uql, Value};
use uql_mongo::MongoTranspiler;

const START_DATE: &str = "2001-02-11T00:00:00.000Z";
const END_DATE: &str = "2001-02-13T00:00:00.000Z";

fn uql(json: Json) -> Uql {
    serde_json::from_value(json).unwrap()
}

fn doc(json: Json) -> Document {
    Value::from(json).into_document().unwrap()
}

fn select_query(json: Json) -> Json {
    Json::Object(MongoTranspiler::new().select(&uql(json)).unwrap().query)
}

// ---------------------------------------------------------------------------
// Select
// ---------------------------------------------------------------------------

#[test]
fn select_without_conditions_is_empty() {
    assert_eq!(select_query(json!({})), json!({}));
}

#[test]
fn select_keeps_keys_and_values_as_given() {
    assert_eq!(
        select_query(json!({"where": {"name": "Jon", "lastName": "Doe", "age": 23, "rating": 5.2}})),
        json!({"name": "Jon", "lastName": "Doe", "age": 23, "rating": 5.2})
    );
}

#[test]
fn select_passes_bad_values_through() {
    assert_eq!(
        select_query(json!({"where": {"name": 123, "lastName": null, "age": null}})),
        json!({"name": 123, "lastName": null, "age": null})
    );
}

#[test]
fn select_with_date_range() {
    assert_eq!(
        select_query(json!({
            "where": {"createdAt": {"gte": {"$date": START_DATE}, "lt": {"$date": END_DATE}}}
        })),
        json!({"createdAt": {"$gte": {"$date": START_DATE}, "$lt": {"$date": END_DATE}}})
    );
}

#[test]
fn select_with_regular_conditions_and_date_range_built_in_code() {
    let mut range = Document::new();
    range.insert(
        "lt".to_string(),
        Value::from(Utc.with_ymd_and_hms(2001, 2, 13, 0, 0, 0).unwrap()),
    );
    let mut where_ = doc(json!({"name": "Jon", "tracked": true}));
    where_.insert("createdAt".to_string(), Value::Object(range));

    let find = MongoTranspiler::new()
        .select(&Uql::new().with_where(where_))
        .unwrap();
    assert_eq!(
        Json::Object(find.query),
        json!({"name": "Jon", "tracked": true, "createdAt": {"$lt": {"$date": END_DATE}}})
    );
}

#[test]
fn select_with_or_and_explicit_and() {
    assert_eq!(
        select_query(json!({"where": {"or": [{"name": "Jon"}, {"lastName": "Doe"}]}})),
        json!({"$or": [{"name": "Jon"}, {"lastName": "Doe"}]})
    );
    assert_eq!(
        select_query(json!({"where": {"and": [{"name": "Jon"}, {"lastName": "Doe"}]}})),
        json!({"$and": [{"name": "Jon"}, {"lastName": "Doe"}]})
    );
}

#[test]
fn select_with_json_inner_query() {
    assert_eq!(
        select_query(json!({"where": {"job.title": "Programmer"}})),
        json!({"job.title": "Programmer"})
    );
}

#[test]
fn select_with_order_map() {
    let find = MongoTranspiler::new()
        .select(&uql(json!({"order": {"age": "ASC", "lastName": "DESC"}})))
        .unwrap();
    assert_eq!(json!(find), json!({"query": {}, "sort": {"age": 1, "lastName": -1}}));
}

#[test]
fn select_with_order_list() {
    let find = MongoTranspiler::new()
        .select(&uql(json!({"order": [{"age": "ASC"}]})))
        .unwrap();
    assert_eq!(json!(find), json!({"query": {}, "sort": {"age": 1}}));
}

// ---------------------------------------------------------------------------
// Insert / Count / Remove
// ---------------------------------------------------------------------------

#[test]
fn insert_returns_data_unchanged() {
    let data = json!({
        "name": "Jon",
        "lastName": "Doe",
        "age": 23,
        "tracked": false,
        "job": {"title": "Programmer", "company": "VoxFeed"}
    });
    let inserted = MongoTranspiler::new().insert(&doc(data.clone()));
    assert_eq!(Json::Object(inserted), data);
}

#[test]
fn count_and_remove_return_filters() {
    let transpiler = MongoTranspiler::new();
    let query = uql(json!({"where": {"or": [{"name": "Jon"}, {"lastName": "Doe"}]}}));
    let expected = json!({"$or": [{"name": "Jon"}, {"lastName": "Doe"}]});

    assert_eq!(Json::Object(transpiler.count(&query).unwrap()), expected);
    assert_eq!(Json::Object(transpiler.remove(&query).unwrap()), expected);
    assert_eq!(Json::Object(transpiler.remove(&Uql::new()).unwrap()), json!({}));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

fn update(query: Json, data: Json) -> Option<Json> {
    MongoTranspiler::new()
        .update(&uql(query), &doc(data))
        .unwrap()
        .map(|update| json!(update))
}

#[test]
fn update_with_one_field() {
    assert_eq!(
        update(json!({"where": {"job.title": "Programmer"}}), json!({"name": "Jon"})),
        Some(json!({
            "query": {"job.title": "Programmer"},
            "update": {"$set": {"name": "Jon"}},
            "options": {"multi": true}
        }))
    );
}

#[test]
fn update_ignores_primary_key() {
    assert_eq!(
        update(json!({}), json!({"id": "1", "name": "Jon"})),
        Some(json!({
            "query": {},
            "update": {"$set": {"name": "Jon"}},
            "options": {"multi": true}
        }))
    );
}

#[test]
fn update_without_data_is_nothing() {
    assert_eq!(update(json!({"where": {"name": "Jon"}}), json!({})), None);
}

#[test]
fn update_with_json_attributes() {
    assert_eq!(
        update(
            json!({"where": {"name": "Jon"}}),
            json!({"job.title": "Programmer", "job.companyName": "VoxFeed"})
        ),
        Some(json!({
            "query": {"name": "Jon"},
            "update": {"$set": {"job.title": "Programmer", "job.companyName": "VoxFeed"}},
            "options": {"multi": true}
        }))
    );
}
