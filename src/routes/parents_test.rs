use super::*;
use crate::services::role::RoleTag;

fn record() -> ParentRecord {
    ParentRecord {
        id: 1,
        username: "TestUsername".into(),
        first_name: "TestFirstName".into(),
        last_name: "TestLastName".into(),
        email: "testEMail@abv.bg".into(),
        password_hash: "$argon2id$dummy".into(),
        picture_url: None,
        roles: vec![RoleTag::Admin, RoleTag::User],
    }
}

#[test]
fn parent_response_never_serializes_password_hash() {
    let json = serde_json::to_value(ParentResponse::from(record())).unwrap();
    assert!(json.get("password_hash").is_none());
    assert!(!json.to_string().contains("argon2id"));
}

#[test]
fn parent_response_carries_role_display_names() {
    let response = ParentResponse::from(record());
    assert_eq!(response.roles, vec!["ADMIN".to_owned(), "USER".to_owned()]);
}

#[test]
fn parent_status_maps_not_found() {
    assert_eq!(parent_status(&ParentError::NotFound), StatusCode::NOT_FOUND);
}

#[test]
fn parent_status_maps_conflicts() {
    assert_eq!(parent_status(&ParentError::EmailTaken), StatusCode::CONFLICT);
    assert_eq!(parent_status(&ParentError::UsernameTaken), StatusCode::CONFLICT);
}

#[test]
fn parent_status_maps_weak_password() {
    let err = ParentError::Password(crate::services::password::PasswordError::TooShort(8));
    assert_eq!(parent_status(&err), StatusCode::UNPROCESSABLE_ENTITY);
}
