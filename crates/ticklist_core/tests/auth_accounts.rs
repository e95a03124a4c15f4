use ticklist_core::{
    AuthError, AuthService, MemoryStorage, StorageBackend, StorageError, StorageResult, TaskDraft,
    TaskStore, UserValidationError, SESSION_KEY, USERS_KEY,
};
use uuid::Uuid;

#[test]
fn register_creates_account_and_signs_it_in() {
    let mut storage = MemoryStorage::new();
    let mut auth = AuthService::new(&mut storage);

    let user = auth.register("Dana", "dana@example.com", "secret1").unwrap();
    assert!(!user.id.is_nil());
    assert_eq!(user.name, "Dana");

    let current = auth.current_user().unwrap().unwrap();
    assert_eq!(current, user);

    let users_raw = storage.get(USERS_KEY).unwrap().unwrap();
    let users: serde_json::Value = serde_json::from_str(&users_raw).unwrap();
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["email"], "dana@example.com");

    let session_raw = storage.get(SESSION_KEY).unwrap().unwrap();
    let marker: Uuid = serde_json::from_str(&session_raw).unwrap();
    assert_eq!(marker, user.id);
}

#[test]
fn register_trims_name_and_email_but_not_password() {
    let mut storage = MemoryStorage::new();
    let mut auth = AuthService::new(&mut storage);

    let user = auth
        .register("  Dana  ", "  dana@example.com  ", " secret ")
        .unwrap();
    assert_eq!(user.name, "Dana");
    assert_eq!(user.email, "dana@example.com");
    assert_eq!(user.password, " secret ");
}

#[test]
fn register_rejects_duplicate_email() {
    let mut storage = MemoryStorage::new();
    let mut auth = AuthService::new(&mut storage);
    auth.register("Dana", "dana@example.com", "secret1").unwrap();

    let err = auth
        .register("Other", "dana@example.com", "different1")
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken(email) if email == "dana@example.com"));

    // The stored list still holds exactly the first account.
    let users_raw = storage.get(USERS_KEY).unwrap().unwrap();
    let users: serde_json::Value = serde_json::from_str(&users_raw).unwrap();
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["name"], "Dana");
}

#[test]
fn register_surfaces_profile_validation_errors() {
    let mut storage = MemoryStorage::new();
    let mut auth = AuthService::new(&mut storage);

    let err = auth.register("Dana", "dana@example.com", "short").unwrap_err();
    assert!(matches!(
        err,
        AuthError::Validation(UserValidationError::WeakPassword { min_chars: 6 })
    ));

    let err = auth.register("Dana", "not-an-email", "secret1").unwrap_err();
    assert!(matches!(
        err,
        AuthError::Validation(UserValidationError::InvalidEmail(_))
    ));

    let err = auth.register("   ", "dana@example.com", "secret1").unwrap_err();
    assert!(matches!(
        err,
        AuthError::Validation(UserValidationError::EmptyName)
    ));

    // Nothing was stored along the way.
    assert!(storage.get(USERS_KEY).unwrap().is_none());
    assert!(storage.get(SESSION_KEY).unwrap().is_none());
}

#[test]
fn login_matches_exact_credentials() {
    let mut storage = MemoryStorage::new();
    let mut auth = AuthService::new(&mut storage);
    let registered = auth.register("Dana", "dana@example.com", "secret1").unwrap();
    auth.logout().unwrap();
    assert!(auth.current_user().unwrap().is_none());

    let user = auth.login("dana@example.com", "secret1").unwrap();
    assert_eq!(user.id, registered.id);
    assert_eq!(auth.current_user().unwrap().unwrap().id, registered.id);

    // The email is trimmed before matching.
    let user = auth.login("  dana@example.com ", "secret1").unwrap();
    assert_eq!(user.id, registered.id);
}

#[test]
fn login_rejects_wrong_password_and_unknown_email() {
    let mut storage = MemoryStorage::new();
    let mut auth = AuthService::new(&mut storage);
    auth.register("Dana", "dana@example.com", "secret1").unwrap();
    auth.logout().unwrap();

    let err = auth.login("dana@example.com", "wrong-password").unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = auth.login("nobody@example.com", "secret1").unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    // A failed login leaves no session behind.
    assert!(auth.current_user().unwrap().is_none());
}

#[test]
fn logout_is_idempotent() {
    let mut storage = MemoryStorage::new();
    let mut auth = AuthService::new(&mut storage);
    auth.register("Dana", "dana@example.com", "secret1").unwrap();

    auth.logout().unwrap();
    auth.logout().unwrap();
    assert!(auth.current_user().unwrap().is_none());
    assert!(storage.get(SESSION_KEY).unwrap().is_none());
}

#[test]
fn current_user_tolerates_stale_or_malformed_session_markers() {
    let mut storage = MemoryStorage::new();

    // Marker that points at no stored account.
    let orphan = serde_json::to_string(&Uuid::now_v7()).unwrap();
    storage.set(SESSION_KEY, &orphan).unwrap();
    let auth = AuthService::new(&mut storage);
    assert!(auth.current_user().unwrap().is_none());

    // Marker that does not parse at all.
    storage.set(SESSION_KEY, "not a uuid").unwrap();
    let auth = AuthService::new(&mut storage);
    assert!(auth.current_user().unwrap().is_none());
}

#[test]
fn malformed_user_list_reads_as_empty() {
    let mut storage = MemoryStorage::new();
    storage.set(USERS_KEY, "{broken").unwrap();

    let mut auth = AuthService::new(&mut storage);
    let err = auth.login("dana@example.com", "secret1").unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    // Registration replaces the junk with a fresh list.
    auth.register("Dana", "dana@example.com", "secret1").unwrap();
    let users_raw = storage.get(USERS_KEY).unwrap().unwrap();
    let users: serde_json::Value = serde_json::from_str(&users_raw).unwrap();
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[test]
fn unavailable_backend_surfaces_storage_errors() {
    let mut storage = DownStorage;
    let mut auth = AuthService::new(&mut storage);

    let err = auth.register("Dana", "dana@example.com", "secret1").unwrap_err();
    assert!(matches!(err, AuthError::Storage(_)));

    let err = auth.login("dana@example.com", "secret1").unwrap_err();
    assert!(matches!(err, AuthError::Storage(_)));
}

#[test]
fn each_account_gets_its_own_task_collection() {
    let mut storage = MemoryStorage::new();

    let mut auth = AuthService::new(&mut storage);
    let dana = auth.register("Dana", "dana@example.com", "secret1").unwrap();
    let mut store = TaskStore::load(&mut storage, Some(dana.id));
    store.add("dana's task", TaskDraft::default()).unwrap();

    let mut auth = AuthService::new(&mut storage);
    let eric = auth.register("Eric", "eric@example.com", "secret2").unwrap();
    let mut store = TaskStore::load(&mut storage, Some(eric.id));
    store.add("eric's task", TaskDraft::default()).unwrap();

    // Whoever the session points at sees only their own list.
    let auth = AuthService::new(&mut storage);
    let current = auth.current_user().unwrap().unwrap();
    assert_eq!(current.id, eric.id);
    let store = TaskStore::load(&mut storage, Some(current.id));
    assert_eq!(store.len(), 1);
    assert_eq!(store.tasks()[0].title, "eric's task");

    let dana_store = TaskStore::load(&mut storage, Some(dana.id));
    assert_eq!(dana_store.len(), 1);
    assert_eq!(dana_store.tasks()[0].title, "dana's task");
}

/// Backend double that refuses every request.
struct DownStorage;

impl StorageBackend for DownStorage {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }

    fn remove(&mut self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }
}
