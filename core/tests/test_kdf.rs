#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use envelope_core::crypto::{derive_key, derive_key_with_iterations, CryptoError};
    use envelope_core::types::EnvelopeError;

    fn salt_0_16() -> Vec<u8> {
        (0u8..16).collect()
    }

    #[test]
    fn test_known_vector_default_cost() {
        let key = derive_key("abc", &salt_0_16()).unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "546cac7650d6664491158e128fff26c0c45bf263c3c2c2be775293707e6d52a0"
        );
    }

    #[test]
    fn test_known_vector_repeated_salt() {
        let key = derive_key("password", b"saltsaltsaltsalt").unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "4fbf2d122fe6afc61a81e9f2fe393ab39f906a78ddddc797763c0e784857e9b4"
        );
    }

    // PBKDF2-HMAC-SHA256 reference values ("password", "salt").
    #[test]
    fn test_reference_vectors_explicit_iterations() {
        let k1 = derive_key_with_iterations("password", b"salt", 1).unwrap();
        assert_eq!(
            hex::encode(k1.as_bytes()),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );

        let k4096 = derive_key_with_iterations("password", b"salt", 4096).unwrap();
        assert_eq!(
            hex::encode(k4096.as_bytes()),
            "c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a"
        );
    }

    #[test]
    fn test_iterations_change_the_key() {
        let a = derive_key_with_iterations("abc", &salt_0_16(), 1000).unwrap();
        assert_eq!(
            hex::encode(a.as_bytes()),
            "d043892c880312f3e9caa8d787f01a3960cb7ce19afb01093dab22da06a31650"
        );
        let b = derive_key_with_iterations("abc", &salt_0_16(), 1001).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_salt_rejected() {
        let err = derive_key("abc", &[]).unwrap_err();
        assert_eq!(err, CryptoError::EmptySalt);
        assert!(matches!(EnvelopeError::from(err), EnvelopeError::InvalidInput(_)));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let err = derive_key_with_iterations("abc", b"salt", 0).unwrap_err();
        assert_eq!(err, CryptoError::InvalidIterations);
    }

    #[test]
    fn test_empty_password_is_allowed() {
        let a = derive_key_with_iterations("", b"salt", 10).unwrap();
        let b = derive_key_with_iterations("", b"salt", 10).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_deterministic(password in ".{0,24}", salt in any::<[u8; 16]>()) {
            let k1 = derive_key_with_iterations(&password, &salt, 50).unwrap();
            let k2 = derive_key_with_iterations(&password, &salt, 50).unwrap();
            prop_assert_eq!(k1, k2);
        }

        #[test]
        fn prop_salt_separates_keys(a in any::<[u8; 16]>(), b in any::<[u8; 16]>()) {
            prop_assume!(a != b);
            let k1 = derive_key_with_iterations("pw", &a, 50).unwrap();
            let k2 = derive_key_with_iterations("pw", &b, 50).unwrap();
            prop_assert_ne!(k1, k2);
        }
    }
}
