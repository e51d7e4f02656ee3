use profiles::auth::Claims;
use profiles::jwt::{TokenCodec, DEFAULT_TTL};
use profiles::TokenError;
use proptest::prelude::*;
use time::{Duration, OffsetDateTime};

const SECRET: &str = "property-test-secret";

fn base_time() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_760_000_000).unwrap()
}

proptest! {
    #[test]
    fn subject_survives_issue_and_extract(
        subject in "[a-z0-9._%+-]{1,24}@[a-z0-9-]{1,12}\\.[a-z]{2,6}",
        extra in proptest::collection::btree_map("[a-z]{1,8}", "[ -~]{0,16}", 0..4),
    ) {
        let codec = TokenCodec::new(SECRET);
        let mut claims = Claims::with_subject(subject.clone());
        for (k, v) in extra {
            if k != "sub" && k != "exp" {
                claims.insert(k, v);
            }
        }

        let token = codec.issue_at(&claims, None, base_time()).unwrap();
        prop_assert_eq!(codec.extract_subject_at(&token, base_time()).unwrap(), subject);
    }

    #[test]
    fn ttl_bounds_validity(ttl_secs in 1i64..86_400) {
        let codec = TokenCodec::new(SECRET);
        let ttl = Duration::seconds(ttl_secs);
        let token = codec
            .issue_at(&Claims::with_subject("alice@example.com"), Some(ttl), base_time())
            .unwrap();

        prop_assert!(codec.verify_at(&token, base_time()).is_ok());
        prop_assert!(codec.verify_at(&token, base_time() + ttl).is_ok());

        let after = codec.verify_at(&token, base_time() + ttl + Duration::seconds(1));
        prop_assert!(matches!(after, Err(TokenError::ExpiredToken { .. })), "got {:?}", after);
    }

    #[test]
    fn any_payload_or_signature_edit_is_rejected(segment in 1usize..3, pos in any::<prop::sample::Index>()) {
        let codec = TokenCodec::new(SECRET);
        let token = codec
            .issue_at(&Claims::with_subject("alice@example.com"), None, base_time())
            .unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_owned).collect();
        let target = &mut parts[segment];
        let idx = pos.index(target.len());
        let original = target.as_bytes()[idx];
        let replacement = if original == b'x' { "y" } else { "x" };
        target.replace_range(idx..idx + 1, replacement);
        let tampered = parts.join(".");

        prop_assert_eq!(codec.verify_at(&tampered, base_time()), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn foreign_secret_is_invalid_signature(other in "[a-zA-Z0-9]{1,32}") {
        prop_assume!(other != SECRET);
        let token = TokenCodec::new(other)
            .issue_at(&Claims::with_subject("alice@example.com"), None, base_time())
            .unwrap();

        prop_assert_eq!(
            TokenCodec::new(SECRET).verify_at(&token, base_time()),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_without_three_segments_is_malformed(raw in "[A-Za-z0-9_-]{0,40}(\\.[A-Za-z0-9_-]{0,40})?") {
        prop_assert_eq!(
            TokenCodec::new(SECRET).verify_at(&raw, base_time()),
            Err(TokenError::MalformedToken)
        );
    }
}

#[test]
fn alice_default_ttl_scenario() {
    let codec = TokenCodec::new(SECRET);
    let token = codec
        .issue_at(&Claims::with_subject("alice@example.com"), None, base_time())
        .unwrap();

    assert_eq!(
        codec.extract_subject_at(&token, base_time()),
        Ok("alice@example.com".to_string())
    );
    assert!(matches!(
        codec.verify_at(&token, base_time() + DEFAULT_TTL + Duration::seconds(1)),
        Err(TokenError::ExpiredToken { .. })
    ));
}

#[test]
fn subjectless_claims_scenario() {
    let codec = TokenCodec::new(SECRET);
    let mut claims = Claims::new();
    claims.insert("role", "reviewer");
    let token = codec.issue_at(&claims, None, base_time()).unwrap();

    assert_eq!(
        codec.extract_subject_at(&token, base_time()),
        Err(TokenError::MissingSubjectClaim)
    );
}
