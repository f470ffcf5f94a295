//! 密码哈希功能测试
//!
//! 测试 Argon2id 密码哈希和验证功能

use auth_backend::auth::password::PasswordHasher;

#[test]
fn test_password_hash_and_verify() {
    let hasher = PasswordHasher::new();
    let password = "TestPassword123!";

    let hash = hasher.hash(password).expect("Hashing should succeed");

    // 自描述摘要：算法、版本和参数都在字符串里
    assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    assert!(hasher.verify(password, &hash));
}

#[test]
fn test_password_verify_with_wrong_password() {
    let hasher = PasswordHasher::new();

    let hash = hasher.hash("CorrectPassword123").unwrap();

    assert!(!hasher.verify("WrongPassword123", &hash));
    assert!(!hasher.verify("correctpassword123", &hash));
}

#[test]
fn test_password_hash_different_each_time() {
    let hasher = PasswordHasher::new();
    let password = "SamePassword123";

    let hash1 = hasher.hash(password).unwrap();
    let hash2 = hasher.hash(password).unwrap();

    // 每次使用新盐
    assert_ne!(hash1, hash2);
    assert!(hasher.verify(password, &hash1));
    assert!(hasher.verify(password, &hash2));
}

#[test]
fn test_password_empty_never_verifies() {
    let hasher = PasswordHasher::new();

    // 空密码也能哈希，但永远不能通过验证
    let hash = hasher.hash("").unwrap();
    assert!(!hasher.verify("", &hash));

    let other = hasher.hash("secret123").unwrap();
    assert!(!hasher.verify("", &other));
}

#[test]
fn test_password_hash_unicode() {
    let hasher = PasswordHasher::new();
    let password = "密码Test123🔒";

    let hash = hasher.hash(password).unwrap();

    assert!(hasher.verify(password, &hash));
    assert!(!hasher.verify("密码Test123", &hash));
}

#[test]
fn test_password_hash_long_password() {
    let hasher = PasswordHasher::new();
    let password = "a".repeat(1000);

    let hash = hasher.hash(&password).unwrap();

    assert!(hasher.verify(&password, &hash));
    assert!(!hasher.verify(&"a".repeat(999), &hash));
}

#[test]
fn test_password_verify_with_malformed_hash() {
    let hasher = PasswordHasher::new();

    assert!(!hasher.verify("password", "invalid_hash_format"));
    assert!(!hasher.verify("password", ""));
    assert!(!hasher.verify("password", "$argon2id$v=19$m=19456,t=2,p=1$"));
    assert!(!hasher.verify("password", "$2b$12$abcdefghijklmnopqrstuv"));
}

#[test]
fn test_password_verify_uses_params_from_digest() {
    use argon2::{Algorithm, Argon2, Params, Version};
    use password_hash::{rand_core::OsRng, PasswordHasher as _, SaltString};

    // 以更低成本生成的旧摘要仍可验证
    let params = Params::new(8192, 1, 1, None).unwrap();
    let legacy = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = legacy
        .hash_password(b"legacy-password", &salt)
        .unwrap()
        .to_string();

    let hasher = PasswordHasher::new();
    assert!(hasher.verify("legacy-password", &hash));
    assert!(!hasher.verify("other-password", &hash));
}

#[test]
fn test_equalize_timing_always_false() {
    let hasher = PasswordHasher::default();

    assert!(!hasher.equalize_timing("timing-equalizer"));
    assert!(!hasher.equalize_timing("anything"));
    assert!(!hasher.equalize_timing(""));
}

#[test]
fn test_password_hasher_is_cloneable() {
    let hasher = PasswordHasher::new();
    let cloned = hasher.clone();

    let hash = hasher.hash("shared-params").unwrap();
    assert!(cloned.verify("shared-params", &hash));
}
