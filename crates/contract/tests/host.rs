//! Submit / evaluate semantics of the ledger host.

use std::sync::Arc;

use enginelife_contract::{ContractError, EngineRecord, Invocation, LedgerHost};
use enginelife_state::{MemoryWorldState, Write, WorldState};

fn create(id: &str, owner: &str) -> Invocation {
    Invocation::new(
        "CreateEngine",
        [id, "GE Aviation", "GE90", "5", "Operational", owner],
    )
}

#[tokio::test]
async fn submit_commits_single_write_for_create() {
    let host = LedgerHost::new(MemoryWorldState::new());

    let receipt = host.submit(&create("e1", "AirlineB")).await.unwrap();

    assert_eq!(receipt.write_set.len(), 1);
    match receipt.write_set.iter().next() {
        Some(Write::Put { key, value }) => {
            assert_eq!(key, "e1");
            assert_eq!(value, &receipt.payload);
        }
        other => panic!("expected a put, got {other:?}"),
    }
    assert_eq!(
        host.state().get("e1").await.unwrap(),
        Some(receipt.payload)
    );
}

#[tokio::test]
async fn failed_submit_leaves_store_untouched() {
    let host = LedgerHost::new(MemoryWorldState::new());
    host.submit(&create("e1", "AirlineA")).await.unwrap();
    let before = host.state().snapshot().unwrap();

    let err = host.submit(&create("e1", "AirlineZ")).await.unwrap_err();

    assert!(matches!(err, ContractError::AlreadyExists { .. }));
    assert_eq!(host.state().snapshot().unwrap(), before);
}

#[tokio::test]
async fn init_commits_one_write_per_seed() {
    let host = LedgerHost::new(MemoryWorldState::new());

    let receipt = host
        .submit(&Invocation::new("InitLedger", Vec::<String>::new()))
        .await
        .unwrap();

    assert!(receipt.payload.is_empty());
    assert_eq!(receipt.write_set.len(), 2);
    assert_eq!(host.state().len().unwrap(), 2);
}

#[tokio::test]
async fn evaluate_discards_writes() {
    let host = LedgerHost::new(MemoryWorldState::new());

    let payload = host.evaluate(&create("e1", "AirlineA")).await.unwrap();

    let rec: EngineRecord = serde_json::from_slice(&payload).unwrap();
    assert_eq!(rec.id, "e1");
    assert!(host.state().is_empty().unwrap());
}

#[tokio::test]
async fn evaluate_sees_committed_state() {
    let host = LedgerHost::new(MemoryWorldState::new());
    host.submit(&create("e1", "AirlineA")).await.unwrap();

    let exists = host
        .evaluate(&Invocation::new("EngineExists", ["e1"]))
        .await
        .unwrap();
    assert_eq!(exists, b"true".to_vec());

    let missing = host
        .evaluate(&Invocation::new("Exists", ["e2"]))
        .await
        .unwrap();
    assert_eq!(missing, b"false".to_vec());
}

#[tokio::test]
async fn transfer_receipt_carries_previous_owner() {
    let host = LedgerHost::new(MemoryWorldState::new());
    host.submit(&create("e1", "AirlineA")).await.unwrap();

    let receipt = host
        .submit(&Invocation::new("TransferEngineOwnership", ["e1", "AirlineB"]))
        .await
        .unwrap();

    assert_eq!(receipt.payload, b"AirlineA".to_vec());
    assert_eq!(receipt.write_set.len(), 1);
}

#[tokio::test]
async fn replicas_produce_identical_write_sets() {
    let script = vec![
        Invocation::new("Init", Vec::<String>::new()),
        create("e7", "AirlineC"),
        Invocation::new("AddServiceRecord", ["e7", "fan blade replacement"]),
        Invocation::new("TransferOwner", ["e7", "LessorX"]),
        Invocation::new(
            "UpdateEngine",
            ["engine1", "Rolls Royce", "Trent 1000", "3", "Overhaul", "AirlineA"],
        ),
        Invocation::new("DeleteEngine", ["engine2"]),
    ];

    let a = LedgerHost::new(MemoryWorldState::new());
    let b = LedgerHost::new(MemoryWorldState::new());
    for inv in &script {
        let ra = a.submit(inv).await.unwrap();
        let rb = b.submit(inv).await.unwrap();
        assert_eq!(ra.write_set.digest(), rb.write_set.digest(), "{inv:?}");
        assert_eq!(ra.payload, rb.payload);
    }
    assert_eq!(a.state().snapshot().unwrap(), b.state().snapshot().unwrap());
}

#[tokio::test]
async fn concurrent_submits_all_apply() {
    let host = Arc::new(LedgerHost::new(MemoryWorldState::new()));
    host.submit(&create("e1", "AirlineA")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let h = Arc::clone(&host);
        handles.push(tokio::spawn(async move {
            h.submit(&Invocation::new(
                "AddServiceRecord",
                ["e1".to_string(), format!("check {i}")],
            ))
            .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let bytes = host.state().get("e1").await.unwrap().unwrap();
    let rec: EngineRecord = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(rec.services.len(), 10);
}
