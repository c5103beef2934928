/// Integration tests for the session store
///
/// Covers the revocation and rotation invariants: a revoked session's
/// hash never validates again, and rotation makes each refresh token
/// single-use. Run against a live database with:
///
/// DATABASE_URL=postgresql://... cargo test --test session_store_tests -- --ignored

mod common;

use common::{create_test_user, test_pool, test_session_store};
use crewdesk_shared::auth::session::CreateSession;
use crewdesk_shared::models::user::{User, UserStatus};

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_lookup_finds_active_session() {
    let pool = test_pool().await;
    let store = test_session_store(pool.clone());
    let user = create_test_user(&pool).await;

    let hash = store.hash_refresh_token("raw-refresh-token-1");
    let session = store
        .create(
            &pool,
            CreateSession {
                user_id: user.id,
                refresh_token_hash: hash.clone(),
                ip_address: Some("127.0.0.1".to_string()),
                user_agent: Some("tests".to_string()),
            },
        )
        .await
        .unwrap();

    let found = store.lookup_active_by_hash(&hash).await.unwrap();
    let (found_session, found_user) = found.expect("Active session should resolve");
    assert_eq!(found_session.id, session.id);
    assert_eq!(found_user.id, user.id);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_revoked_session_never_resolves_again() {
    let pool = test_pool().await;
    let store = test_session_store(pool.clone());
    let user = create_test_user(&pool).await;

    let hash = store.hash_refresh_token("raw-refresh-token-2");
    store
        .create(
            &pool,
            CreateSession {
                user_id: user.id,
                refresh_token_hash: hash.clone(),
                ip_address: None,
                user_agent: None,
            },
        )
        .await
        .unwrap();

    assert!(store.revoke(&hash).await.unwrap());

    // Every subsequent lookup must miss.
    assert!(store.lookup_active_by_hash(&hash).await.unwrap().is_none());
    assert!(store.lookup_active_by_hash(&hash).await.unwrap().is_none());

    // Revoking again is a no-op, not an error.
    assert!(!store.revoke(&hash).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_rotation_is_single_use() {
    let pool = test_pool().await;
    let store = test_session_store(pool.clone());
    let user = create_test_user(&pool).await;

    let old_hash = store.hash_refresh_token("raw-refresh-token-3");
    let session = store
        .create(
            &pool,
            CreateSession {
                user_id: user.id,
                refresh_token_hash: old_hash.clone(),
                ip_address: None,
                user_agent: None,
            },
        )
        .await
        .unwrap();

    let new_hash = store.hash_refresh_token("raw-refresh-token-3-rotated");
    assert!(store.rotate(session.id, &new_hash).await.unwrap());

    // The old hash is spent; the new one resolves to the same session.
    assert!(store.lookup_active_by_hash(&old_hash).await.unwrap().is_none());
    let (rotated, _) = store
        .lookup_active_by_hash(&new_hash)
        .await
        .unwrap()
        .expect("Rotated session should resolve by its new hash");
    assert_eq!(rotated.id, session.id);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_rotate_refuses_revoked_session() {
    let pool = test_pool().await;
    let store = test_session_store(pool.clone());
    let user = create_test_user(&pool).await;

    let hash = store.hash_refresh_token("raw-refresh-token-4");
    let session = store
        .create(
            &pool,
            CreateSession {
                user_id: user.id,
                refresh_token_hash: hash.clone(),
                ip_address: None,
                user_agent: None,
            },
        )
        .await
        .unwrap();

    store.revoke(&hash).await.unwrap();

    let rotated = store
        .rotate(session.id, &store.hash_refresh_token("replacement"))
        .await
        .unwrap();
    assert!(!rotated, "A revoked session must never be re-activated");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_banned_owner_rejects_lookup() {
    let pool = test_pool().await;
    let store = test_session_store(pool.clone());
    let user = create_test_user(&pool).await;

    let hash = store.hash_refresh_token("raw-refresh-token-5");
    store
        .create(
            &pool,
            CreateSession {
                user_id: user.id,
                refresh_token_hash: hash.clone(),
                ip_address: None,
                user_agent: None,
            },
        )
        .await
        .unwrap();

    assert!(store.lookup_active_by_hash(&hash).await.unwrap().is_some());

    User::set_status(&pool, user.id, UserStatus::Banned)
        .await
        .unwrap();

    // The session row is untouched but the banned owner blocks it.
    assert!(store.lookup_active_by_hash(&hash).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_revoke_all_except_keeps_current_device() {
    let pool = test_pool().await;
    let store = test_session_store(pool.clone());
    let user = create_test_user(&pool).await;

    let mut hashes = Vec::new();
    for i in 0..3 {
        let hash = store.hash_refresh_token(&format!("device-{}-token", i));
        store
            .create(
                &pool,
                CreateSession {
                    user_id: user.id,
                    refresh_token_hash: hash.clone(),
                    ip_address: None,
                    user_agent: None,
                },
            )
            .await
            .unwrap();
        hashes.push(hash);
    }

    let revoked = store
        .revoke_all_except(user.id, Some(&hashes[0]))
        .await
        .unwrap();
    assert_eq!(revoked, 2);

    assert!(store.lookup_active_by_hash(&hashes[0]).await.unwrap().is_some());
    assert!(store.lookup_active_by_hash(&hashes[1]).await.unwrap().is_none());
    assert!(store.lookup_active_by_hash(&hashes[2]).await.unwrap().is_none());

    // Without an exclusion the remaining session goes too.
    let revoked = store.revoke_all_except(user.id, None).await.unwrap();
    assert_eq!(revoked, 1);
    assert!(store.lookup_active_by_hash(&hashes[0]).await.unwrap().is_none());
}
