use awladna::awladna_core::AuthError;
use awladna::awladna_core::password::{
    MAX_PASSWORD_BYTES, hash_password_with_cost, is_legacy_digest, legacy_sha256_digest,
    needs_rehash, verify_legacy_sha256, verify_password,
};

const COST: u32 = 4;

#[test]
fn test_hash_password_success() {
    let password = "testpassword123";
    let result = hash_password_with_cost(password, COST);

    assert!(result.is_ok());
    let hash = result.unwrap();
    assert!(!hash.is_empty());
    assert_ne!(hash, password);
}

#[test]
fn test_hash_password_empty() {
    let result = hash_password_with_cost("", COST);
    assert!(result.is_ok());
}

#[test]
fn test_verify_password_correct() {
    let password = "correctpassword";
    let hash = hash_password_with_cost(password, COST).unwrap();

    assert!(verify_password(password, &hash));
}

#[test]
fn test_verify_password_incorrect() {
    let hash = hash_password_with_cost("correctpassword", COST).unwrap();

    assert!(!verify_password("wrongpassword", &hash));
}

#[test]
fn test_verify_password_invalid_hash_is_mismatch() {
    assert!(!verify_password("testpassword", "not_a_valid_bcrypt_hash"));
}

#[test]
fn test_hash_generates_unique_hashes() {
    let password = "samepassword";
    let hash1 = hash_password_with_cost(password, COST).unwrap();
    let hash2 = hash_password_with_cost(password, COST).unwrap();

    assert_ne!(hash1, hash2);
    assert!(verify_password(password, &hash1));
    assert!(verify_password(password, &hash2));
}

#[test]
fn test_distinct_passwords_never_cross_verify() {
    let passwords = ["a", "b", "pw", "pw ", "PW", "pässwörd", "a long passphrase with spaces"];
    let hashes: Vec<String> = passwords
        .iter()
        .map(|p| hash_password_with_cost(p, COST).unwrap())
        .collect();

    for (i, p) in passwords.iter().enumerate() {
        for (j, h) in hashes.iter().enumerate() {
            assert_eq!(verify_password(p, h), i == j, "{:?} vs hash of {:?}", p, passwords[j]);
        }
    }
}

#[test]
fn test_long_passwords_sharing_a_prefix_do_not_cross_verify() {
    let p1 = format!("{}X", "a".repeat(72));
    let p2 = format!("{}Y", "a".repeat(72));
    assert_eq!(p1.len(), 73);

    // Neither can be hashed, so neither can ever match the other
    for p in [&p1, &p2] {
        let err = hash_password_with_cost(p, COST).unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
    }

    // A digest of the shared prefix does not accept either of them
    let prefix_hash = hash_password_with_cost(&p1[..MAX_PASSWORD_BYTES], COST).unwrap();
    assert!(verify_password(&p1[..MAX_PASSWORD_BYTES], &prefix_hash));
    assert!(!verify_password(&p1, &prefix_hash));
    assert!(!verify_password(&p2, &prefix_hash));
}

#[test]
fn test_password_at_limit_is_accepted() {
    let password = "b".repeat(MAX_PASSWORD_BYTES);
    let hash = hash_password_with_cost(&password, COST).unwrap();

    assert!(verify_password(&password, &hash));
    assert!(!verify_password(&"b".repeat(MAX_PASSWORD_BYTES - 1), &hash));
}

#[test]
fn test_legacy_digest_verification() {
    let digest = legacy_sha256_digest("password");

    assert!(is_legacy_digest(&digest));
    assert!(verify_legacy_sha256("password", &digest));
    assert!(!verify_legacy_sha256("Password", &digest));
    assert!(!verify_password("password", &digest));
}

#[test]
fn test_needs_rehash() {
    let legacy = legacy_sha256_digest("password");
    let weak = hash_password_with_cost("password", COST).unwrap();

    assert!(needs_rehash(&legacy, COST));
    assert!(needs_rehash(&weak, COST + 1));
    assert!(!needs_rehash(&weak, COST));
}
