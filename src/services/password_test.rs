use super::*;

#[test]
fn hash_produces_argon2id_phc_string() {
    let hash = hash_password("correct-horse-battery-staple").unwrap();
    assert!(hash.starts_with("$argon2id$"));
}

#[test]
fn hash_and_verify_round_trip() {
    let hash = hash_password("correct-horse-battery-staple").unwrap();
    assert!(verify_password("correct-horse-battery-staple", &hash).unwrap());
}

#[test]
fn wrong_password_verifies_false() {
    let hash = hash_password("real-password").unwrap();
    assert!(!verify_password("wrong-password", &hash).unwrap());
}

#[test]
fn same_password_hashes_differently() {
    let a = hash_password("duplicate").unwrap();
    let b = hash_password("duplicate").unwrap();
    assert_ne!(a, b, "random salts should produce distinct hashes");
}

#[test]
fn malformed_hash_is_an_error_not_a_mismatch() {
    let result = verify_password("anything", "not-a-phc-string");
    assert!(matches!(result, Err(PasswordError::Hash(_))));
}

#[test]
fn strength_rejects_short_passwords() {
    let err = validate_password_strength("1234").unwrap_err();
    assert!(matches!(err, PasswordError::TooShort(MIN_PASSWORD_LEN)));
}

#[test]
fn strength_accepts_minimum_length() {
    assert!(validate_password_strength("12345678").is_ok());
}

#[test]
fn strength_counts_characters_not_bytes() {
    // Eight two-byte characters must pass.
    assert!(validate_password_strength("αααααααα").is_ok());
}
