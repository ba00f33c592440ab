use crate::domain::account::AccountNumber;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Registry = HashMap<AccountNumber, Arc<AsyncMutex<()>>>;

/// Registry of per-account critical sections.
///
/// Each account gets its own async mutex, created on first use and removed
/// once nobody holds or waits for it. Operations on disjoint accounts never
/// contend; operations touching several accounts take them in ascending
/// account number order, so two opposite transfers between the same pair
/// cannot deadlock.
#[derive(Default)]
pub struct AccountLocks {
    locks: Arc<Mutex<Registry>>,
}

/// Holds one account's critical section. Dropping it releases the account.
pub struct AccountGuard {
    account: AccountNumber,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<Mutex<Registry>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks every listed account, waiting as needed. Duplicates are ignored.
    /// The guards release the accounts when dropped.
    pub async fn acquire(&self, accounts: &[AccountNumber]) -> Vec<AccountGuard> {
        let mut ordered = accounts.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut guards = Vec::with_capacity(ordered.len());
        for account in ordered {
            let lock = self.lock_for(account);
            guards.push(AccountGuard {
                account,
                guard: Some(lock.lock_owned().await),
                locks: self.locks.clone(),
            });
        }
        guards
    }

    /// Number of accounts that currently have a critical section registered.
    pub fn tracked(&self) -> usize {
        registry(&self.locks).len()
    }

    fn lock_for(&self, account: AccountNumber) -> Arc<AsyncMutex<()>> {
        registry(&self.locks).entry(account).or_default().clone()
    }
}

impl Drop for AccountGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Clones are only handed out under the registry lock, so a count of one
        // means no holder and no waiter is left.
        let mut locks = registry(&self.locks);
        if locks
            .get(&self.account)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.account);
        }
    }
}

// Entries are inserted and removed whole, so a poisoned guard is still consistent.
fn registry(locks: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_account_is_exclusive() {
        let locks = Arc::new(AccountLocks::new());
        let held = locks.acquire(&[1]).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move { locks.acquire(&[1]).await.len() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(held);
        assert_eq!(contender.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_disjoint_accounts_do_not_block() {
        let locks = AccountLocks::new();
        let _first = locks.acquire(&[1]).await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire(&[2])).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_duplicates_are_locked_once() {
        let locks = AccountLocks::new();
        let guards = locks.acquire(&[3, 3]).await;
        assert_eq!(guards.len(), 1);
    }

    #[tokio::test]
    async fn test_released_accounts_leave_the_registry() {
        let locks = Arc::new(AccountLocks::new());
        let held = locks.acquire(&[1, 2]).await;
        assert_eq!(locks.tracked(), 2);

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guards = locks.acquire(&[1]).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(held);
        waiter.await.unwrap();
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn test_waiter_keeps_entry_alive() {
        let locks = Arc::new(AccountLocks::new());
        let held = locks.acquire(&[7]).await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move { locks.acquire(&[7]).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(held);
        // The waiter now owns the section, so the entry must survive.
        let guards = waiter.await.unwrap();
        assert_eq!(locks.tracked(), 1);
        drop(guards);
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn test_opposite_orders_do_not_deadlock() {
        let locks = Arc::new(AccountLocks::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let locks = locks.clone();
            let pair = if i % 2 == 0 { [1, 2] } else { [2, 1] };
            handles.push(tokio::spawn(async move {
                let _guards = locks.acquire(&pair).await;
                tokio::task::yield_now().await;
            }));
        }

        let all = async {
            for handle in handles {
                handle.await.unwrap();
            }
        };
        tokio::time::timeout(Duration::from_secs(5), all)
            .await
            .expect("lock ordering deadlocked");
        assert_eq!(locks.tracked(), 0);
    }
}
