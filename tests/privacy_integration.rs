//! End-to-end privacy tests
//!
//! Exercises the full send/receive path: custodian startup against real
//! storage, outbound protection, the record that leaves the device, and
//! on-demand reveal on the receiving side.

use a3s_veil::{
    is_decryption_failure, is_sensitive, mask, simulate_attacker_view, ConfirmationPrompt,
    CustodianConfig, DestructiveAction, EncryptionKey, FileKeyValueStore, KeyCustodian,
    KeyValueStore, MemoryKeyValueStore, MessageMeta, MessageRecord, PrivacyPipeline,
};
use async_trait::async_trait;
use std::sync::Arc;

struct Confirm;

#[async_trait]
impl ConfirmationPrompt for Confirm {
    async fn confirm(&self, action: &DestructiveAction) -> bool {
        action.message.contains("cannot be undone")
    }
}

async fn file_custodian(path: &std::path::Path) -> KeyCustodian {
    KeyCustodian::load(Arc::new(FileKeyValueStore::new(path)), CustodianConfig::default())
        .await
        .unwrap()
}

// ─── Scenarios ───────────────────────────────────────────────────

#[test]
fn test_documented_scenarios() {
    let none: &[&str] = &[];

    assert!(is_sensitive("My password is abc123", none));
    assert_eq!(mask("My password is abc123", none), "My *** is abc123");

    assert!(is_sensitive("Call me at 9876543210", none));
    assert_eq!(mask("Call me at 9876543210", none), "Call me at ***");

    let plain = "Normal message without sensitive data";
    assert!(!is_sensitive(plain, none));
    assert_eq!(mask(plain, none), plain);

    assert!(!is_sensitive("cashier report", none));
    assert!(is_sensitive("cash report", none));
}

// ─── Key Persistence ─────────────────────────────────────────────

#[tokio::test]
async fn test_key_survives_restart_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("privacy.json");

    let first = file_custodian(&path).await.key().await;
    let second = file_custodian(&path).await.key().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_key_survives_restart_memory_store() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());

    let first = KeyCustodian::load(store.clone(), CustodianConfig::default())
        .await
        .unwrap();
    let second = KeyCustodian::load(store, CustodianConfig::default())
        .await
        .unwrap();
    assert_eq!(first.key().await, second.key().await);
}

#[tokio::test]
async fn test_settings_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("privacy.json");

    {
        let custodian = file_custodian(&path).await;
        assert!(custodian.add_keyword("Falcon").await);
        assert!(custodian.toggle_encryption(false).await);
    }

    let custodian = file_custodian(&path).await;
    assert_eq!(custodian.custom_keywords().await, vec!["falcon"]);
    assert!(!custodian.encryption_enabled().await);

    assert!(custodian.reset_keywords().await);
    let custodian = file_custodian(&path).await;
    assert!(custodian.custom_keywords().await.is_empty());
}

// ─── Send & Receive ──────────────────────────────────────────────

#[tokio::test]
async fn test_send_and_reveal_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let custodian = file_custodian(&dir.path().join("privacy.json")).await;

    let result = custodian
        .protect("Wire $2,500 to jo@example.org today")
        .await
        .unwrap();
    assert!(result.is_sensitive);
    assert_eq!(result.masked, "Wire *** to *** today");

    let record = MessageRecord::outbound(&result);
    let json = serde_json::to_string(&record).unwrap();
    assert!(!json.contains("jo@example.org"));
    assert!(!json.contains("originalText"));

    // Receiver holding the same key
    let received: MessageRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(received.text, "Wire *** to *** today");
    assert_eq!(
        received.reveal(&custodian.key().await),
        "Wire $2,500 to jo@example.org today"
    );
}

#[tokio::test]
async fn test_receiver_with_wrong_key_sees_sentinel() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let custodian = KeyCustodian::load(store, CustodianConfig::default())
        .await
        .unwrap();

    let result = custodian.protect("my otp is 118822").await.unwrap();
    let record = MessageRecord::outbound(&result);

    let revealed = record.reveal(&EncryptionKey::generate());
    assert!(is_decryption_failure(&revealed));
    assert_ne!(revealed, "my otp is 118822");
}

#[tokio::test]
async fn test_regeneration_bricks_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("privacy.json");
    let custodian = file_custodian(&path).await;

    let old = custodian.protect("bank pin 4821").await.unwrap();
    assert!(custodian.regenerate_key(&Confirm).await);
    assert!(is_decryption_failure(&custodian.reveal(&old.encrypted).await));

    // Restart picks up the regenerated key, not the original one
    let restarted = file_custodian(&path).await;
    assert_eq!(restarted.key().await, custodian.key().await);

    let fresh = restarted.protect("bank pin 9090").await.unwrap();
    assert_eq!(custodian.reveal(&fresh.encrypted).await, "bank pin 9090");
}

#[tokio::test]
async fn test_concurrent_protect_during_regeneration() {
    let custodian = Arc::new(
        KeyCustodian::load(Arc::new(MemoryKeyValueStore::new()), CustodianConfig::default())
            .await
            .unwrap(),
    );
    let old_key = custodian.key().await;

    let mut handles = Vec::new();
    for i in 0..16 {
        let custodian = custodian.clone();
        handles.push(tokio::spawn(async move {
            let text = format!("account 55{:02} details", i);
            let result = custodian.protect(&text).await.unwrap();
            (text, result)
        }));
    }
    let regen = {
        let custodian = custodian.clone();
        tokio::spawn(async move { custodian.regenerate_key(&Confirm).await })
    };

    assert!(regen.await.unwrap());
    let new_key = custodian.key().await;
    assert_ne!(old_key, new_key);

    // Every blob was sealed under a key that was persisted at the time
    for handle in handles {
        let (text, result) = handle.await.unwrap();
        assert!(result.needs_decryption);
        let with_old = a3s_veil::decrypt(&result.encrypted, &old_key);
        let with_new = a3s_veil::decrypt(&result.encrypted, &new_key);
        assert!(with_old == text || with_new == text, "{text}");
    }
}

// ─── Attacker View ───────────────────────────────────────────────

#[tokio::test]
async fn test_attacker_view_from_custodian() {
    let custodian = KeyCustodian::load(
        Arc::new(MemoryKeyValueStore::new()),
        CustodianConfig::default(),
    )
    .await
    .unwrap();

    let result = custodian.protect("My password is abc123").await.unwrap();
    let view = simulate_attacker_view(&result, &MessageMeta::new("You", "Recipient"));

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["sender"], "You");
    assert_eq!(json["maskedText"], "My *** is abc123");
    assert_eq!(json["isSensitive"], true);
    assert!(!json.to_string().contains("password"));
}

#[test]
fn test_pipeline_without_custodian() {
    let key = EncryptionKey::new("shared demo key").unwrap();
    let result = PrivacyPipeline::default()
        .process_with_custom("codename osprey", &["osprey"], &key, true)
        .unwrap();

    assert_eq!(result.masked, "codename ***");
    assert_eq!(a3s_veil::decrypt(&result.encrypted, &key), "codename osprey");
}
