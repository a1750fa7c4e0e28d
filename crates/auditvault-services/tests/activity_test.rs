#[path = "helpers/mod.rs"]
mod helpers;

use auditvault_core::models::ActivityItem;
use auditvault_core::LedgerGateway;
use auditvault_services::activity::group_by_actor;

use helpers::FakeLedger;

fn item(kind: &str, actor: &str, ts: i64) -> ActivityItem {
    ActivityItem {
        kind: kind.to_string(),
        timestamp: Some(ts),
        block_number: Some(ts as u64),
        tx_hash: None,
        actor: Some(actor.to_string()),
        subject: Some(format!("cert-{}", ts)),
        details: None,
    }
}

#[tokio::test]
async fn test_recent_activity_grouped_one_row_per_actor() {
    let ledger = FakeLedger::new();
    *ledger.activity.lock().unwrap() = vec![
        item("inspection", "0xaaa", 1),
        item("certificate_onchain", "0xbbb", 2),
        item("inspection", "0xaaa", 3),
        item("approval", "0xccc", 4),
        item("inspection", "0xaaa", 5),
        item("certificate_onchain", "0xbbb", 6),
    ];

    let response = ledger.fetch_recent_activity(50).await.unwrap();
    let rows = group_by_actor(&response.items, "");

    assert_eq!(rows.len(), 3);
    let counts: Vec<(&str, usize)> = rows
        .iter()
        .map(|r| (r.actor.as_str(), r.action_count()))
        .collect();
    assert_eq!(counts, vec![("0xaaa", 3), ("0xbbb", 2), ("0xccc", 1)]);
    assert_eq!(rows[0].latest_timestamp, Some(5));
}

#[tokio::test]
async fn test_search_matches_subject() {
    let ledger = FakeLedger::new();
    *ledger.activity.lock().unwrap() =
        vec![item("inspection", "0xaaa", 1), item("mint", "0xbbb", 2)];

    let response = ledger.fetch_recent_activity(50).await.unwrap();
    let rows = group_by_actor(&response.items, "CERT-2");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].actor, "0xbbb");
}
