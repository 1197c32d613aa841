use anyhow::Result;
use dexliquid::{
    constants::{LOGS_KEY, TOTALS_KEY},
    gateway::GatewayError,
    networks::NetworkId,
    session::Session,
    store::{FileStorage, KeyValueStore, Ledger, LiquidityAction, MemoryStorage},
};
use ethers::types::Address;

mod common;

#[test_log::test(tokio::test)]
async fn test_add_remove_clamp_scenario() -> Result<()> {
    let (manager, _) =
        common::manager_with(common::accepting_gateway(), Box::new(MemoryStorage::new()));
    let wallet = Address::random();

    // empty stores, add on core
    let entry = manager
        .add_liquidity(NetworkId::Core, wallet, "1.5", "100")
        .await?;
    {
        let ledger = manager.session().ledger().await;
        assert_eq!(ledger.total(NetworkId::Core), 1.5);
        assert_eq!(ledger.logs(NetworkId::Core).len(), 1);
        assert_eq!(entry.action, LiquidityAction::Add);
        assert_eq!(entry.amount, 1.5);
    }

    manager
        .remove_liquidity(NetworkId::Core, wallet, "0.5", "50")
        .await?;
    {
        let ledger = manager.session().ledger().await;
        assert_eq!(ledger.total(NetworkId::Core), 1.0);
        assert_eq!(ledger.logs(NetworkId::Core).len(), 2);
    }

    manager
        .remove_liquidity(NetworkId::Core, wallet, "5", "50")
        .await?;
    assert_eq!(manager.session().ledger().await.total(NetworkId::Core), 0.0);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_ledger_survives_restart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    let wallet = Address::random();

    {
        let (manager, _) = common::manager_with(
            common::accepting_gateway(),
            Box::new(FileStorage::new(&path)),
        );
        manager.add_liquidity(NetworkId::Base, wallet, "3", "30").await?;
        manager.remove_liquidity(NetworkId::Base, wallet, "1", "10").await?;
    }

    let session = Session::open(Box::new(FileStorage::new(&path)), NetworkId::Core);
    let ledger = session.ledger().await;
    assert_eq!(ledger.total(NetworkId::Base), 2.0);

    let logs = ledger.logs(NetworkId::Base);
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].action, LiquidityAction::Add);
    assert_eq!(logs[1].action, LiquidityAction::Remove);
    assert!(logs.iter().all(|e| e.timestamp.ends_with('Z')));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_failed_approve_is_not_persisted() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");

    let mut gateway = common::MockGateway::new();
    gateway
        .expect_approve()
        .returning(|_, _, _| Err(GatewayError::Rejected("user rejected request".into())));
    gateway.expect_add_liquidity().never();

    let (manager, notifier) =
        common::manager_with(gateway, Box::new(FileStorage::new(&path)));
    assert!(manager
        .add_liquidity(NetworkId::Neon, Address::random(), "1", "1")
        .await
        .is_err());

    assert_eq!(notifier.messages().len(), 1);
    assert!(manager.session().ledger().await.all_logs().is_empty());
    assert_eq!(FileStorage::new(&path).get(LOGS_KEY), None);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_corrupt_logs_key_keeps_totals() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    let storage = FileStorage::new(&path);
    storage.set(LOGS_KEY, "[oops")?;
    storage.set(TOTALS_KEY, r#"{"xdc": 4.5, "core": 1}"#)?;

    let session = Session::open(Box::new(storage), NetworkId::Xdc);
    let ledger = session.ledger().await;
    assert!(ledger.all_logs().is_empty());
    assert_eq!(ledger.total(NetworkId::Xdc), 4.5);
    assert_eq!(ledger.total(NetworkId::Core), 1.0);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_save_then_load_is_identity() -> Result<()> {
    let (manager, _) =
        common::manager_with(common::accepting_gateway(), Box::new(MemoryStorage::new()));
    let wallet = Address::random();
    manager.add_liquidity(NetworkId::Tlos, wallet, "7", "1").await?;
    manager.add_liquidity(NetworkId::Xdc, wallet, "0.125", "1").await?;

    let ledger = manager.session().ledger().await.clone();
    let storage = MemoryStorage::new();
    ledger.save(&storage)?;
    assert_eq!(Ledger::load(&storage), ledger);
    Ok(())
}
