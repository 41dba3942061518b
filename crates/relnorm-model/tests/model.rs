//! Tests for relnorm-model types.

use relnorm_model::{Attribute, FunctionalDependency, NormalForm, Relation, SchemaError};

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn student() -> Relation {
    Relation::new(
        "Student",
        vec![
            Attribute::new("StudentID", "INT"),
            Attribute::new("Name", "VARCHAR"),
            Attribute::new("Email", "VARCHAR"),
            Attribute::new("Phones", "VARCHAR"),
        ],
        names(&["StudentID"]),
    )
    .with_candidate_keys(vec![names(&["Email"])])
    .with_multivalued_attributes(names(&["Phones"]))
    .with_dependencies(vec![
        FunctionalDependency::new(names(&["StudentID"]), names(&["Name", "Email"])).unwrap(),
    ])
}

#[test]
fn relation_serializes() {
    let relation = student().with_data(vec![names(&["1", "Ada", "ada@x", "555"])]);
    let json = serde_json::to_string(&relation).expect("serialize relation");
    let round: Relation = serde_json::from_str(&json).expect("deserialize relation");
    assert_eq!(round, relation);
}

#[test]
fn empty_data_is_omitted_and_defaulted() {
    let json = serde_json::to_value(student()).expect("serialize relation");
    assert!(json.get("data").is_none());
    let round: Relation = serde_json::from_value(json).expect("deserialize relation");
    assert!(round.data.is_empty());
}

#[test]
fn valid_relation_passes() {
    assert_eq!(student().validate(), Ok(()));
}

#[test]
fn multivalued_key_attribute_is_rejected() {
    let relation = student().with_multivalued_attributes(names(&["StudentID"]));
    assert_eq!(
        relation.validate(),
        Err(SchemaError::MultivaluedKeyAttribute {
            relation: "Student".to_string(),
            attribute: "StudentID".to_string(),
        })
    );
}

#[test]
fn dependency_on_unknown_attribute_is_rejected() {
    let relation = student().with_dependencies(vec![
        FunctionalDependency::new(names(&["Name"]), names(&["Address"])).unwrap(),
    ]);
    assert!(matches!(
        relation.validate(),
        Err(SchemaError::UnknownAttribute { attribute, .. }) if attribute == "Address"
    ));
}

#[test]
fn sample_rows_must_match_arity() {
    let mut relation = student();
    let error = relation.set_data(vec![names(&["1", "Ada"])]).unwrap_err();
    assert!(matches!(error, SchemaError::TupleArity { expected: 4, actual: 2, .. }));
    assert!(relation.data.is_empty());
}

#[test]
fn normal_forms_parse_from_tokens() {
    assert_eq!("3nf".parse::<NormalForm>(), Ok(NormalForm::Third));
    assert_eq!(" BCNF ".parse::<NormalForm>(), Ok(NormalForm::BoyceCodd));
    assert!("6NF".parse::<NormalForm>().is_err());
    let stages: Vec<NormalForm> = NormalForm::Fourth.stages().collect();
    assert_eq!(stages.len(), 5);
}
