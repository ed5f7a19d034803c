use serde::{Deserialize, Serialize};
use storage::repository::{KeyValueStore, KeyValueStoreExt, Storage, StorageError};
use storage::sqlite::SqliteRepository;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Streak {
    streak: u32,
    total_days: u32,
}

#[tokio::test]
async fn sqlite_set_get_overwrite_and_remove() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("userLevel").await.unwrap(), None);

    repo.set("userLevel", "\"A2\"").await.unwrap();
    repo.set("userLevel", "\"B1\"").await.unwrap();
    assert_eq!(
        repo.get("userLevel").await.unwrap().as_deref(),
        Some("\"B1\"")
    );

    repo.remove("userLevel").await.unwrap();
    repo.remove("userLevel").await.unwrap();
    assert_eq!(repo.get("userLevel").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_lists_keys_in_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_keys?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.set("vocabulary", "[]").await.unwrap();
    repo.set("conversationHistory", "[]").await.unwrap();
    repo.set("userProgress", "{}").await.unwrap();

    assert_eq!(
        repo.keys().await.unwrap(),
        vec![
            "conversationHistory".to_string(),
            "userProgress".to_string(),
            "vocabulary".to_string(),
        ]
    );
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn storage_sqlite_round_trips_json() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_json?mode=memory&cache=shared")
        .await
        .expect("storage");

    let streak = Streak {
        streak: 4,
        total_days: 11,
    };
    storage.kv.set_json("userProgress", &streak).await.unwrap();
    let back: Option<Streak> = storage.kv.get_json("userProgress").await.unwrap();
    assert_eq!(back, Some(streak));

    storage.kv.set("userProgress", "not json").await.unwrap();
    let corrupt: Result<Option<Streak>, _> = storage.kv.get_json("userProgress").await;
    assert!(matches!(corrupt, Err(StorageError::Serialization(_))));
}
