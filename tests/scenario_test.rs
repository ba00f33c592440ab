use ledgerd::application::engine::{LedgerEngine, Operation};
use ledgerd::domain::account::AccountNumber;
use ledgerd::domain::transaction::TransactionKind;
use ledgerd::error::{ErrorKind, LedgerError};
use ledgerd::infrastructure::in_memory::InMemoryLedgerStore;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::sync::Arc;

fn engine() -> LedgerEngine {
    LedgerEngine::new(Arc::new(InMemoryLedgerStore::new()))
}

#[tokio::test]
async fn test_account_lifecycle_scenario() {
    let engine = engine();

    engine.open_account(1001, 1234, "alice", dec!(500.00)).await.unwrap();

    let deposit = engine.deposit(1001, dec!(150.00)).await.unwrap();
    assert_eq!(deposit.kind, TransactionKind::Deposit);
    assert_eq!(engine.balance(1001).await.unwrap().value(), dec!(650.00));

    let rejected = engine.withdraw(1001, dec!(800.00)).await;
    assert!(matches!(rejected, Err(LedgerError::InsufficientFunds { .. })));
    assert_eq!(engine.balance(1001).await.unwrap().value(), dec!(650.00));

    engine.open_account(1002, 4321, "bob", dec!(0.00)).await.unwrap();
    let transfer = engine.transfer(1001, 1002, dec!(650.00)).await.unwrap();

    assert_eq!(engine.balance(1001).await.unwrap().value(), dec!(0.00));
    assert_eq!(engine.balance(1002).await.unwrap().value(), dec!(650.00));

    let history = engine.history().await.unwrap();
    assert_eq!(history, vec![deposit, transfer]);
    let transfers: Vec<_> = history
        .iter()
        .filter(|r| r.kind == TransactionKind::Transfer)
        .collect();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].sender_account_number, Some(1001));
    assert_eq!(transfers[0].receiver_account_number, Some(1002));
    assert_eq!(transfers[0].amount.value(), dec!(650.00));
    assert!(history.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn test_rejections_have_no_effect() {
    let engine = engine();
    engine.open_account(1, 1, "a", dec!(10)).await.unwrap();
    engine.open_account(2, 2, "b", dec!(10)).await.unwrap();

    let rejected = [
        Operation::Deposit {
            account: 1,
            amount: dec!(0),
        },
        Operation::Deposit {
            account: 3,
            amount: dec!(1),
        },
        Operation::Withdraw {
            account: 1,
            amount: dec!(10.000001),
        },
        Operation::Transfer {
            sender: 1,
            receiver: 1,
            amount: dec!(1),
        },
        Operation::Transfer {
            sender: 3,
            receiver: 1,
            amount: dec!(1),
        },
        Operation::Transfer {
            sender: 2,
            receiver: 1,
            amount: dec!(-1),
        },
    ];
    let expected_kinds = [
        ErrorKind::InvalidAmount,
        ErrorKind::AccountNotFound,
        ErrorKind::InsufficientFunds,
        ErrorKind::SameAccountTransfer,
        ErrorKind::AccountNotFound,
        ErrorKind::InvalidAmount,
    ];

    for (operation, kind) in rejected.into_iter().zip(expected_kinds) {
        let err = engine.execute(operation).await.unwrap_err();
        assert_eq!(err.kind(), kind, "{:?}", operation);
    }

    assert_eq!(engine.balance(1).await.unwrap().value(), dec!(10));
    assert_eq!(engine.balance(2).await.unwrap().value(), dec!(10));
    assert!(engine.history().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_random_sequences_keep_books_balanced() {
    let engine = engine();
    let accounts: Vec<AccountNumber> = (1..=6).collect();
    let mut opening = BTreeMap::new();
    for &account in &accounts {
        let balance = Decimal::new(account as i64 * 1000, 2);
        engine.open_account(account, 0, "holder", balance).await.unwrap();
        opening.insert(account, balance);
    }

    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let account = accounts[rng.gen_range(0..accounts.len())];
        let other = accounts[rng.gen_range(0..accounts.len())];
        let amount = Decimal::new(rng.gen_range(-100..5000), 2);
        let operation = match rng.gen_range(0..3) {
            0 => Operation::Deposit { account, amount },
            1 => Operation::Withdraw { account, amount },
            _ => Operation::Transfer {
                sender: account,
                receiver: other,
                amount,
            },
        };
        // Rejections are expected; the books must hold either way.
        let _ = engine.execute(operation).await;
    }

    let mut expected = opening.clone();
    for record in engine.history().await.unwrap() {
        if let Some(sender) = record.sender_account_number {
            *expected.get_mut(&sender).unwrap() -= record.amount.value();
        }
        if let Some(receiver) = record.receiver_account_number {
            *expected.get_mut(&receiver).unwrap() += record.amount.value();
        }
    }

    for account in engine.accounts().await.unwrap() {
        assert!(account.balance.value() >= Decimal::ZERO);
        assert_eq!(account.balance.value(), expected[&account.account_number]);
    }

    let total: Decimal = engine
        .accounts()
        .await
        .unwrap()
        .iter()
        .map(|a| a.balance.value())
        .sum();
    let deposits: Decimal = engine
        .history()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.kind == TransactionKind::Deposit)
        .map(|r| r.amount.value())
        .sum();
    let withdrawals: Decimal = engine
        .history()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.kind == TransactionKind::Withdraw)
        .map(|r| r.amount.value())
        .sum();
    assert_eq!(total, opening.values().sum::<Decimal>() + deposits - withdrawals);
    assert!(engine.reconcile().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deposit_withdraw_round_trip_is_exact() {
    let engine = engine();
    engine.open_account(7, 7, "g", dec!(0.07)).await.unwrap();
    for amount in [dec!(0.1), dec!(0.2), dec!(0.3), dec!(1234.5678), dec!(0.0000001)] {
        engine.deposit(7, amount).await.unwrap();
        engine.withdraw(7, amount).await.unwrap();
        assert_eq!(engine.balance(7).await.unwrap().value(), dec!(0.07));
    }
}
