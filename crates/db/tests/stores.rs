//! Integration tests for the Postgres store adapters.
//!
//! These need a reachable `DATABASE_URL` and are ignored by default:
//! `cargo test -p notekeep-db -- --ignored`.

use std::time::Duration;

use notekeep_core::credentials::{CredentialStore, NewUser};
use notekeep_core::error::StoreError;
use notekeep_core::notes::{NewNote, NoteStore};
use notekeep_core::session::{SessionId, SessionRecord, SessionStore};
use notekeep_db::stores::{PgCredentialStore, PgNoteStore, PgSessionStore};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, username: &str) -> i64 {
    PgCredentialStore::new(pool.clone())
        .save(NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        })
        .await
        .expect("user creation should succeed")
        .id
}

const TTL: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_username_is_a_conflict(pool: PgPool) {
    let store = PgCredentialStore::new(pool.clone());
    let id = new_user(&pool, "alice").await;

    let found = store.find_by_username("alice").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(id));

    let result = store
        .save(NewUser {
            username: "alice".into(),
            password_hash: "other".into(),
        })
        .await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));

    let kept = store.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(kept.id, id);
    assert_eq!(kept.password_hash, "$argon2id$placeholder");
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn regenerate_replaces_all_sessions_of_user(pool: PgPool) {
    let user_id = new_user(&pool, "alice").await;
    let store = PgSessionStore::new(pool.clone());

    let first = SessionId::generate();
    store
        .put(&first, &SessionRecord::issue(user_id, TTL), TTL)
        .await
        .unwrap();

    let second = SessionId::generate();
    store
        .regenerate(None, &second, &SessionRecord::issue(user_id, TTL), TTL)
        .await
        .unwrap();

    assert!(store.get(&first).await.unwrap().is_none());
    assert_eq!(
        store.get(&second).await.unwrap().map(|r| r.user_id),
        Some(user_id)
    );
    let live: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_sessions WHERE user_id = $1 AND expires_at > NOW()",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(live, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn expired_sessions_are_invisible_and_purged(pool: PgPool) {
    let user_id = new_user(&pool, "alice").await;
    let store = PgSessionStore::new(pool.clone());

    let id = SessionId::generate();
    store
        .put(&id, &SessionRecord::issue(user_id, Duration::ZERO), Duration::ZERO)
        .await
        .unwrap();

    assert!(store.get(&id).await.unwrap().is_none());
    assert_eq!(store.purge_expired().await.unwrap(), 1);

    // Deleting what is already gone is fine.
    store.delete(&id).await.unwrap();
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn notes_are_scoped_to_their_owner(pool: PgPool) {
    let alice = new_user(&pool, "alice").await;
    let bob = new_user(&pool, "bob").await;
    let store = PgNoteStore::new(pool.clone());

    let note = store
        .insert(NewNote {
            user_id: alice,
            data: "hello".into(),
        })
        .await
        .unwrap();

    assert!(store.find_by_owner(bob).await.unwrap().is_empty());
    assert!(store
        .update_one_by_id_and_owner(note.id, bob, "hijack")
        .await
        .unwrap()
        .is_none());
    assert!(store
        .delete_one_by_id_and_owner(note.id, bob)
        .await
        .unwrap()
        .is_none());

    let updated = store
        .update_one_by_id_and_owner(note.id, alice, "world")
        .await
        .unwrap()
        .expect("owner can update");
    assert_eq!(updated.data, "world");

    let deleted = store
        .delete_one_by_id_and_owner(note.id, alice)
        .await
        .unwrap()
        .expect("owner can delete");
    assert_eq!(deleted.data, "world");
    assert!(store
        .find_one_by_id_and_owner(note.id, alice)
        .await
        .unwrap()
        .is_none());
}
