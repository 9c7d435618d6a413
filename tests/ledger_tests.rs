use stockfolio::services::ledger;

mod common;

use common::{seed_user, setup_test_db};

#[tokio::test]
async fn find_user_by_uid_roundtrips() {
    let pool = setup_test_db().await;
    let user_id = seed_user(&pool, "uid-1", 500.0).await;

    let mut conn = pool.acquire().await.unwrap();
    let user = ledger::find_user_by_uid(&mut conn, "uid-1")
        .await
        .unwrap()
        .expect("user should exist");
    assert_eq!(user.id, user_id);
    assert_eq!(user.firebase_uid, "uid-1");

    assert!(ledger::find_user_by_uid(&mut conn, "uid-unknown")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn adjust_balance_applies_delta_and_rounds() {
    let pool = setup_test_db().await;
    let user_id = seed_user(&pool, "uid-bal", 100.0).await;

    let mut conn = pool.acquire().await.unwrap();
    let new_amount = ledger::adjust_balance(&mut conn, user_id, -10.0 / 3.0)
        .await
        .unwrap()
        .expect("balance row exists");
    assert_eq!(new_amount, 96.67);

    let balance = ledger::get_balance(&mut conn, user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(balance.amount, 96.67);
}

#[tokio::test]
async fn adjust_balance_without_row_returns_none() {
    let pool = setup_test_db().await;

    let mut conn = pool.acquire().await.unwrap();
    let result = ledger::adjust_balance(&mut conn, 42, 10.0).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn upsert_holding_creates_adds_and_deletes_at_zero() {
    let pool = setup_test_db().await;
    let user_id = seed_user(&pool, "uid-hold", 100.0).await;

    let mut conn = pool.acquire().await.unwrap();

    // first buy creates the row
    let qty = ledger::upsert_holding(&mut conn, user_id, "AAPL", 5)
        .await
        .unwrap();
    assert_eq!(qty, 5);

    // second buy adds
    let qty = ledger::upsert_holding(&mut conn, user_id, "AAPL", 2)
        .await
        .unwrap();
    assert_eq!(qty, 7);

    // partial sell decrements
    let qty = ledger::upsert_holding(&mut conn, user_id, "AAPL", -4)
        .await
        .unwrap();
    assert_eq!(qty, 3);

    // full liquidation removes the row
    let qty = ledger::upsert_holding(&mut conn, user_id, "AAPL", -3)
        .await
        .unwrap();
    assert_eq!(qty, 0);
    assert!(ledger::get_holding(&mut conn, user_id, "AAPL")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn holdings_are_tracked_per_symbol() {
    let pool = setup_test_db().await;
    let user_id = seed_user(&pool, "uid-multi", 100.0).await;

    let mut conn = pool.acquire().await.unwrap();
    ledger::upsert_holding(&mut conn, user_id, "AAPL", 1)
        .await
        .unwrap();
    ledger::upsert_holding(&mut conn, user_id, "TSLA", 2)
        .await
        .unwrap();

    let holdings = ledger::list_holdings(&mut conn, user_id).await.unwrap();
    assert_eq!(holdings.len(), 2);
    assert_eq!(holdings[0].symbol, "AAPL");
    assert_eq!(holdings[1].symbol, "TSLA");
}

#[tokio::test]
async fn transactions_are_listed_newest_first() {
    let pool = setup_test_db().await;
    let user_id = seed_user(&pool, "uid-tx", 100.0).await;

    let mut conn = pool.acquire().await.unwrap();
    ledger::append_transaction(&mut conn, user_id, "AAPL", 1, 10.0, "buy", 1_000)
        .await
        .unwrap();
    ledger::append_transaction(&mut conn, user_id, "AAPL", 1, 12.0, "sell", 2_000)
        .await
        .unwrap();
    ledger::append_transaction(&mut conn, user_id, "TSLA", 3, 20.0, "buy", 1_500)
        .await
        .unwrap();

    let transactions = ledger::list_transactions(&mut conn, user_id).await.unwrap();
    assert_eq!(transactions.len(), 3);
    assert_eq!(transactions[0].executed_at, 2_000);
    assert_eq!(transactions[0].side, "sell");
    assert_eq!(transactions[1].symbol, "TSLA");
    assert_eq!(transactions[2].executed_at, 1_000);
}

#[tokio::test]
async fn transactions_do_not_leak_across_users() {
    let pool = setup_test_db().await;
    let alice = seed_user(&pool, "uid-alice", 100.0).await;
    let bob = seed_user(&pool, "uid-bob", 100.0).await;

    let mut conn = pool.acquire().await.unwrap();
    ledger::append_transaction(&mut conn, alice, "AAPL", 1, 10.0, "buy", 1_000)
        .await
        .unwrap();

    let bobs = ledger::list_transactions(&mut conn, bob).await.unwrap();
    assert!(bobs.is_empty());
}
