mod common;

use common::{post_request, simple_schema, SimpleObj};
use serde_json::{json, Map, Value};
use simpleform::{Bind, Bindable, Form, FormError, Int, NotEmpty, Schema};

#[test]
fn test_bind() {
    let request = post_request("name=test");
    let mut form = Form::new(&request, simple_schema());
    assert!(form.validate());

    let mut obj = SimpleObj::default();
    form.bind(&mut obj, &[], &[]).unwrap();
    assert_eq!(obj.name.as_deref(), Some("test"));
}

#[test]
fn test_bind_not_validated_yet() {
    let request = post_request("name=test");
    let form = Form::new(&request, simple_schema());

    let mut obj = SimpleObj::default();
    assert!(matches!(
        form.bind(&mut obj, &[], &[]),
        Err(FormError::NotValidated)
    ));
}

#[test]
fn test_bind_with_errors() {
    let request = post_request("name=");
    let mut form = Form::new(&request, simple_schema());
    assert!(!form.validate());

    let mut obj = SimpleObj::default();
    assert!(matches!(
        form.bind(&mut obj, &[], &[]),
        Err(FormError::HasErrors)
    ));
}

#[test]
fn test_bind_with_exclude() {
    let request = post_request("name=test");
    let mut form = Form::new(&request, simple_schema());
    form.validate();

    let mut obj = SimpleObj::default();
    form.bind(&mut obj, &[], &["name"]).unwrap();
    assert_eq!(obj.name, None);
}

#[test]
fn test_bind_with_include() {
    let request = post_request("name=test");
    let mut form = Form::new(&request, simple_schema());
    form.validate();

    let mut obj = SimpleObj::default();
    form.bind(&mut obj, &["foo"], &[]).unwrap();
    assert_eq!(obj.name, None);
}

#[test]
fn test_bind_skips_underscore_fields() {
    let request = post_request("name=test&_csrf=csrft");
    let schema = simple_schema().allow_extra_fields(true);
    let mut form = Form::new(&request, schema);
    assert!(form.validate());

    let mut target = Map::new();
    form.bind(&mut target, &[], &[]).unwrap();
    assert_eq!(Value::Object(target), json!({"name": "test"}));
}

#[derive(Bind, Debug, Default)]
struct Account {
    name: String,
    #[bind(rename = "years")]
    age: u8,
    #[bind(skip)]
    is_admin: bool,
}

#[test]
fn test_bind_renamed_and_skipped_fields() {
    let request = post_request("name=Fred&years=40&is_admin=true");
    let schema = Schema::new()
        .field("name", NotEmpty::new())
        .field("years", Int::new())
        .allow_extra_fields(true);
    let mut form = Form::new(&request, schema);
    assert!(form.validate());

    let mut account = Account::default();
    form.bind(&mut account, &[], &[]).unwrap();
    assert_eq!(account.name, "Fred");
    assert_eq!(account.age, 40);
    assert!(!account.is_admin);
}

#[test]
fn test_bind_type_mismatch() {
    let request = post_request("name=Fred&years=400");
    let schema = Schema::new()
        .field("name", NotEmpty::new())
        .field("years", Int::new());
    let mut form = Form::new(&request, schema);
    assert!(form.validate());

    let mut account = Account::default();
    match form.bind(&mut account, &[], &[]) {
        Err(FormError::Bind { field, .. }) => assert_eq!(field, "years"),
        other => panic!("expected a bind error, got {other:?}"),
    }
}

#[test]
fn test_derived_field_access() {
    let mut account = Account {
        name: "Fred".to_string(),
        age: 40,
        is_admin: true,
    };

    assert_eq!(account.field_names(), vec!["name", "years"]);
    assert!(account.has_field("years"));
    assert!(!account.has_field("age"));
    assert!(!account.has_field("is_admin"));
    assert_eq!(account.field_value("years"), Some(json!(40)));
    assert_eq!(account.field_value("is_admin"), None);

    account.set_field("name", json!("Barney")).unwrap();
    assert_eq!(account.name, "Barney");
    assert!(account.set_field("is_admin", json!(false)).is_err());
    assert!(account.set_field("years", json!("forty")).is_err());
}

#[test]
fn test_obj_prefills_renamed_fields() {
    let request = post_request("");
    let account = Account {
        name: "Fred".to_string(),
        age: 40,
        is_admin: false,
    };
    let form = Form::builder(&request)
        .schema(
            Schema::new()
                .field("name", NotEmpty::new())
                .field("years", Int::new()),
        )
        .obj(&account)
        .build()
        .unwrap();

    assert_eq!(form.value("name"), Some(&json!("Fred")));
    assert_eq!(form.value("years"), Some(&json!(40)));
}
