use ticklist_core::{User, UserValidationError, MIN_PASSWORD_CHARS};
use uuid::Uuid;

#[test]
fn user_new_sets_id_and_timestamp() {
    let user = User::new("Dana", "dana@example.com", "secret1");

    assert!(!user.id.is_nil());
    assert_eq!(user.name, "Dana");
    assert_eq!(user.email, "dana@example.com");
    assert_eq!(user.password, "secret1");
    assert!(user.created_at > 0);
    assert!(user.validate().is_ok());
}

#[test]
fn validate_rejects_nil_id() {
    let mut user = User::new("Dana", "dana@example.com", "secret1");
    user.id = Uuid::nil();
    assert_eq!(user.validate().unwrap_err(), UserValidationError::NilId);
}

#[test]
fn validate_rejects_blank_name() {
    let user = User::new("   ", "dana@example.com", "secret1");
    assert_eq!(user.validate().unwrap_err(), UserValidationError::EmptyName);
}

#[test]
fn validate_rejects_malformed_emails() {
    for email in ["", "dana", "dana@", "@example.com", "dana@example", "a b@example.com"] {
        let user = User::new("Dana", email, "secret1");
        assert_eq!(
            user.validate().unwrap_err(),
            UserValidationError::InvalidEmail(email.to_string()),
            "email `{email}` should be rejected"
        );
    }
}

#[test]
fn validate_rejects_short_passwords() {
    let user = User::new("Dana", "dana@example.com", "12345");
    assert_eq!(
        user.validate().unwrap_err(),
        UserValidationError::WeakPassword {
            min_chars: MIN_PASSWORD_CHARS
        }
    );

    // Exactly the minimum is accepted; length is counted in characters.
    let boundary = User::new("Dana", "dana@example.com", "123456");
    assert!(boundary.validate().is_ok());
    let unicode = User::new("Dana", "dana@example.com", "pässwd");
    assert!(unicode.validate().is_ok());
}

#[test]
fn user_serialization_round_trips() {
    let user = User::new("Dana", "dana@example.com", "secret1");
    let json = serde_json::to_value(&user).unwrap();

    assert_eq!(json["name"], "Dana");
    assert_eq!(json["email"], "dana@example.com");
    // Stored as-is; there is no hashing layer in this record.
    assert_eq!(json["password"], "secret1");

    let decoded: User = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, user);
}
