use bson::{Bson, DateTime, Document, doc};
use tours_query::{Query, QueryFeatures, RawParameters};
use tours_store::{Collection, StoreError};

fn seed() -> Collection {
    let tours = Collection::new("tours");
    tours
        .insert_many(vec![
            doc! { "name": "The Forest Hiker", "difficulty": "easy", "price": 397, "ratingsAverage": 4.7, "duration": 5, "createdAt": DateTime::from_millis(1_000) },
            doc! { "name": "The Sea Explorer", "difficulty": "medium", "price": 497, "ratingsAverage": 4.8, "duration": 7, "createdAt": DateTime::from_millis(2_000) },
            doc! { "name": "The Snow Adventurer", "difficulty": "difficult", "price": 997, "ratingsAverage": 4.5, "duration": 4, "createdAt": DateTime::from_millis(3_000) },
            doc! { "name": "The City Wanderer", "difficulty": "easy", "price": 1197, "ratingsAverage": 4.6, "duration": 9, "createdAt": DateTime::from_millis(4_000) },
            doc! { "name": "The Park Camper", "difficulty": "medium", "price": 1497, "ratingsAverage": 4.9, "duration": 10, "createdAt": DateTime::from_millis(5_000) },
            doc! { "name": "The Sports Lover", "difficulty": "difficult", "price": 2997, "ratingsAverage": 4.7, "duration": 14, "createdAt": DateTime::from_millis(6_000) },
        ])
        .unwrap();
    tours
}

fn run(tours: &Collection, query_string: &str) -> Result<Vec<Document>, StoreError> {
    let query = QueryFeatures::new(Query::new(), RawParameters::from_query_string(query_string))
        .filter()
        .sort()
        .limit()
        .paginate()
        .into_query();
    tours.find(&query)
}

fn names(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.get_str("name").unwrap()).collect()
}

#[test]
fn defaults_are_newest_first_without_version() {
    let tours = seed();
    let docs = run(&tours, "").unwrap();
    assert_eq!(docs.len(), 6);
    assert_eq!(docs[0].get_str("name").unwrap(), "The Sports Lover");
    assert_eq!(docs[5].get_str("name").unwrap(), "The Forest Hiker");
    assert!(docs.iter().all(|d| !d.contains_key("__v")));
}

#[test]
fn literal_and_range_filters() {
    let tours = seed();
    let docs = run(&tours, "difficulty=easy&price[gte]=500&sort=price").unwrap();
    assert_eq!(names(&docs), vec!["The City Wanderer"]);

    let docs = run(&tours, "duration[gte]=5&price[lt]=1500&sort=price").unwrap();
    assert_eq!(
        names(&docs),
        vec!["The Forest Hiker", "The Sea Explorer", "The City Wanderer", "The Park Camper"]
    );
}

#[test]
fn multi_key_sort() {
    let tours = seed();
    let docs = run(&tours, "sort=-ratingsAverage,price&fields=name").unwrap();
    assert_eq!(
        names(&docs),
        vec![
            "The Park Camper",
            "The Sea Explorer",
            "The Forest Hiker",
            "The Sports Lover",
            "The City Wanderer",
            "The Snow Adventurer",
        ]
    );
}

#[test]
fn projection_keeps_only_requested_fields() {
    let tours = seed();
    let docs = run(&tours, "fields=name,price&sort=price&limit=1").unwrap();
    assert_eq!(docs.len(), 1);
    let keys: Vec<&str> = docs[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["_id", "name", "price"]);
}

#[test]
fn pagination_slices_sorted_results() {
    let tours = seed();
    let docs = run(&tours, "sort=price&page=2&limit=2").unwrap();
    assert_eq!(names(&docs), vec!["The Snow Adventurer", "The City Wanderer"]);

    let docs = run(&tours, "sort=price&page=4&limit=2").unwrap();
    assert!(docs.is_empty());
}

#[test]
fn unknown_field_matches_nothing() {
    let tours = seed();
    assert!(run(&tours, "colour=red").unwrap().is_empty());
}

#[test]
fn unprefixed_operator_is_a_literal_subdocument() {
    let tours = seed();
    assert!(run(&tours, "price[ne]=397").unwrap().is_empty());
}

#[test]
fn mixed_projection_fails_at_execution() {
    let tours = seed();
    let err = run(&tours, "fields=name,-price").unwrap_err();
    assert!(matches!(err, StoreError::InvalidQuery(_)));
}

#[test]
fn raw_query_with_typed_values() {
    let tours = seed();
    let query = Query::new()
        .filter(doc! { "$or": [{ "difficulty": "easy" }, { "price": { "$gt": 2000 } }] })
        .sort("name")
        .select("name -_id");
    let docs = tours.find(&query).unwrap();
    assert_eq!(
        docs,
        vec![
            doc! { "name": "The City Wanderer" },
            doc! { "name": "The Forest Hiker" },
            doc! { "name": "The Sports Lover" },
        ]
    );
    assert!(docs.iter().all(|d| d.get("_id").is_none()));
}

#[test]
fn find_by_stringified_id() {
    let tours = seed();
    let any = tours.find(&Query::new().take(1)).unwrap().remove(0);
    let id = match any.get("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        other => panic!("expected object id, got {other:?}"),
    };
    let query = QueryFeatures::new(Query::new(), RawParameters::new().with("_id", id.as_str()))
        .filter()
        .into_query();
    assert_eq!(tours.find(&query).unwrap().len(), 1);
}

#[test]
fn repeated_filter_key_matches_any_value() {
    let tours = seed();
    let docs = run(&tours, "difficulty=easy&difficulty=medium&sort=price").unwrap();
    assert_eq!(
        names(&docs),
        vec!["The Forest Hiker", "The Sea Explorer", "The City Wanderer", "The Park Camper"]
    );
}

#[test]
fn sort_survives_mixed_price_types() {
    let tours = seed();
    tours
        .insert(doc! { "name": "The Budget Trip", "difficulty": "easy", "price": "497" })
        .unwrap();

    let docs = run(&tours, "sort=price").unwrap();
    assert_eq!(
        names(&docs),
        vec![
            "The Forest Hiker",
            "The Sea Explorer",
            "The Snow Adventurer",
            "The City Wanderer",
            "The Park Camper",
            "The Sports Lover",
            "The Budget Trip",
        ]
    );

    let docs = run(&tours, "sort=-price&limit=2").unwrap();
    assert_eq!(names(&docs), vec!["The Budget Trip", "The Sports Lover"]);
}

#[test]
fn unknown_bracket_key_beside_operator_is_rejected() {
    let tours = seed();
    for query_string in ["price[gte]=1&price[foo]=2", "price[lt]=1&price[x]=2"] {
        let err = run(&tours, query_string).unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery(_)), "{query_string}: {err:?}");
    }
}
