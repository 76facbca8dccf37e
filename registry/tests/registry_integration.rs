//! Integration tests for the ticket registry over the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use ticketry_registry::mocks::{InMemoryTicketStore, ScanlessTicketStore};
use ticketry_registry::{
    CryptoConfig, DefaultTicketFactory, RegistryError, Ticket, TicketFactory, TicketKind, TicketRegistry,
    TicketRegistryConfig, UNKNOWN_COUNT,
};
use ticketry_testing::{fixtures, init_test_tracing, test_clock};

/// Store a TGT with `services` service tickets and one PGT per entry of
/// `proxied`, each PGT carrying that many service tickets of its own.
async fn seed_session(
    registry: &TicketRegistry<InMemoryTicketStore>,
    services: usize,
    proxied: &[usize],
) -> String {
    let mut tgt = fixtures::ticket_granting_ticket("TGT-1");
    let mut children = Vec::new();

    for i in 0..services {
        children.push(Ticket::from(fixtures::service_ticket(&format!("ST-{i}"), &mut tgt)));
    }
    for (p, &count) in proxied.iter().enumerate() {
        let mut pgt = fixtures::proxy_granting_ticket(&format!("PGT-{p}"), &mut tgt);
        for s in 0..count {
            children.push(Ticket::from(fixtures::service_ticket(
                &format!("ST-P{p}-{s}"),
                &mut pgt.ticket_granting_ticket,
            )));
        }
        children.push(Ticket::from(pgt));
    }

    registry.add_ticket(tgt.clone()).await.unwrap();
    for child in children {
        registry.add_ticket(child).await.unwrap();
    }
    tgt.id
}

#[tokio::test]
async fn test_cascade_removes_whole_session() {
    init_test_tracing();
    let (registry, store) = fixtures::registry();
    let id = seed_session(&registry, 3, &[2, 1]).await;
    assert_eq!(store.len(), 1 + 3 + 2 + 3);

    // 1 + M + K + sum(S_i)
    assert_eq!(registry.delete_ticket(&id).await.unwrap(), 1 + 3 + 2 + 3);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_cascade_with_encryption() {
    init_test_tracing();
    let (registry, store) = fixtures::encrypted_registry();
    let mut tgt = fixtures::ticket_granting_ticket("TGT-1");
    let st = fixtures::service_ticket("ST-1", &mut tgt);
    let mut pgt = fixtures::proxy_granting_ticket("PGT-1", &mut tgt);
    let proxied = fixtures::service_ticket("ST-2", &mut pgt.ticket_granting_ticket);
    registry.add_ticket(tgt).await.unwrap();
    registry.add_ticket(st).await.unwrap();
    registry.add_ticket(pgt).await.unwrap();
    registry.add_ticket(proxied).await.unwrap();

    assert_eq!(registry.delete_ticket("TGT-1").await.unwrap(), 4);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_cascade_skips_missing_children() {
    let (registry, store) = fixtures::registry();
    let mut tgt = fixtures::ticket_granting_ticket("TGT-1");
    let _expired_elsewhere = fixtures::service_ticket("ST-gone", &mut tgt);
    let _ = fixtures::proxy_granting_ticket("PGT-gone", &mut tgt);
    registry.add_ticket(tgt).await.unwrap();

    assert_eq!(registry.delete_ticket("TGT-1").await.unwrap(), 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_delete_unknown_ticket_writes_nothing() {
    let (registry, store) = fixtures::encrypted_registry();
    registry.add_ticket(fixtures::ticket_granting_ticket("TGT-1")).await.unwrap();
    let writes = store.write_count();

    assert_eq!(registry.delete_ticket("TGT-404").await.unwrap(), 0);
    assert_eq!(store.write_count(), writes);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_encrypted_store_holds_no_plaintext() {
    let (registry, store) = fixtures::encrypted_registry();
    let mut tgt = fixtures::ticket_granting_ticket("TGT-secret");
    let st = fixtures::service_ticket("ST-secret", &mut tgt);
    registry.add_ticket(tgt.clone()).await.unwrap();
    registry.add_ticket(st).await.unwrap();

    for key in store.keys() {
        assert!(!key.contains("secret"));
        assert_eq!(key.len(), 128);
        let Some(Ticket::Encoded(encoded)) = store.raw(&key) else {
            panic!("store must only hold encoded tickets");
        };
        assert!(!String::from_utf8_lossy(&encoded.encoded_ticket).contains("casuser"));
    }

    let found = registry.get_ticket("TGT-secret").await.unwrap();
    assert_eq!(found, Some(Ticket::from(tgt)));
}

#[tokio::test]
async fn test_plaintext_ticket_is_readable_after_enabling_encryption() {
    let store = InMemoryTicketStore::new();
    let plain = TicketRegistry::new(store.clone());
    let tgt = fixtures::ticket_granting_ticket("TGT-1");
    plain.add_ticket(tgt.clone()).await.unwrap();

    // A legacy plaintext entry keyed by the raw id is not found by hashed lookup.
    let encrypted = TicketRegistry::with_cipher(store.clone(), fixtures::test_cipher());
    assert!(encrypted.get_ticket("TGT-1").await.unwrap().is_none());

    // But it decodes unchanged when scanned.
    assert_eq!(encrypted.get_tickets().await.unwrap(), vec![Ticket::from(tgt)]);
}

#[tokio::test]
async fn test_typed_lookups() {
    let (registry, _) = fixtures::registry();
    let mut tgt = fixtures::ticket_granting_ticket("TGT-1");
    let st = fixtures::service_ticket("ST-1", &mut tgt);
    registry.add_ticket(tgt).await.unwrap();
    registry.add_ticket(st.clone()).await.unwrap();

    assert_eq!(registry.get_service_ticket("ST-1").await.unwrap(), Some(st));
    assert_eq!(registry.get_service_ticket("ST-404").await.unwrap(), None);
    assert_eq!(registry.get_proxy_granting_ticket("PGT-404").await.unwrap(), None);

    let err = registry
        .get_ticket_as("TGT-1", TicketKind::Service)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::TypeMismatch {
            id: "TGT-1".to_string(),
            expected: "ServiceTicket".to_string(),
            actual: "TicketGrantingTicket".to_string(),
        }
    );
    assert!(matches!(
        registry.get_proxy_granting_ticket("TGT-1").await,
        Err(RegistryError::TypeMismatch { .. })
    ));
}

#[tokio::test]
async fn test_counts_and_unknown_sentinel() {
    let (registry, _) = fixtures::encrypted_registry();
    seed_session(&registry, 2, &[1]).await;
    assert_eq!(registry.session_count().await, 2);
    assert_eq!(registry.service_ticket_count().await, 3);

    let scanless = TicketRegistry::new(ScanlessTicketStore::new(InMemoryTicketStore::new()));
    scanless.add_ticket(fixtures::ticket_granting_ticket("TGT-1")).await.unwrap();
    assert_eq!(scanless.session_count().await, UNKNOWN_COUNT);
    assert_eq!(scanless.service_ticket_count().await, UNKNOWN_COUNT);
}

#[tokio::test]
async fn test_expired_tickets_are_still_counted() {
    let (registry, _) = fixtures::registry();
    let mut tgt = fixtures::ticket_granting_ticket("TGT-1");
    tgt.expiration_policy = ticketry_registry::ExpirationPolicy::AlwaysExpires;
    registry.add_ticket(tgt).await.unwrap();

    assert_eq!(registry.session_count().await, 1);
}

#[tokio::test]
async fn test_update_ticket_replaces_stored_value() {
    let (registry, store) = fixtures::encrypted_registry();
    let mut tgt = fixtures::ticket_granting_ticket("TGT-1");
    registry.add_ticket(tgt.clone()).await.unwrap();

    let _ = fixtures::service_ticket("ST-1", &mut tgt);
    registry.update_ticket(tgt.clone()).await.unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(registry.get_ticket("TGT-1").await.unwrap(), Some(Ticket::from(tgt)));
}

#[tokio::test]
async fn test_factory_issued_session_round_trip() {
    let store = InMemoryTicketStore::new();
    let key = base64::Engine::encode(
        &base64::engine::general_purpose::STANDARD,
        fixtures::TEST_ENCRYPTION_KEY,
    );
    let config = TicketRegistryConfig::new().with_crypto(CryptoConfig::new().with_encryption_key(key));
    let registry = TicketRegistry::from_config(store.clone(), &config).unwrap();
    assert!(registry.is_cipher_enabled());

    let factory = DefaultTicketFactory::with_clock(Arc::new(test_clock())).with_expiration(config.expiration);
    let mut tgt = factory.create_ticket_granting_ticket(fixtures::authentication("casuser"));
    let st = factory.grant_service_ticket(&mut tgt, fixtures::service("app"), true);
    let pgt = factory.grant_proxy_granting_ticket(&mut tgt, fixtures::service("proxy"));

    registry.add_ticket(tgt.clone()).await.unwrap();
    registry.add_ticket(st.clone()).await.unwrap();
    registry.add_ticket(pgt.clone()).await.unwrap();

    assert_eq!(registry.get_service_ticket(&st.id).await.unwrap(), Some(st.clone()));
    assert!(!registry.is_orphaned(&st).await.unwrap());
    assert_eq!(registry.delete_ticket(&tgt.id).await.unwrap(), 3);
    assert!(registry.is_orphaned(&st).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_adds_from_many_tasks() {
    let (registry, store) = fixtures::encrypted_registry();
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry
                    .add_ticket(fixtures::ticket_granting_ticket(&format!("TGT-{i}")))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.len(), 16);
    assert_eq!(registry.session_count().await, 16);
    assert_eq!(registry.delete_all().await.unwrap(), 16);
}

#[tokio::test]
async fn test_invalid_crypto_config_is_rejected() {
    let config = TicketRegistryConfig::new().with_crypto(CryptoConfig::new().with_encryption_key("c2hvcnQ="));
    let result = TicketRegistry::from_config(InMemoryTicketStore::new(), &config);
    assert!(matches!(result, Err(RegistryError::Configuration(_))));
}
