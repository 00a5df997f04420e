//! The account ledger.

use chrono::Utc;
use desk_core::error::LedgerError;
use desk_core::traits::{AccountStore, AuditLog, LogCategory};
use desk_core::types::{Account, AccountReport};
use desk_market::PriceOracle;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::TradeLimits;

/// The trading desk ledger.
///
/// Every mutating operation (buy, sell, deposit, withdraw, reset) is
/// serialized per account name through a lazily-populated lock table:
/// concurrent operations on the same name queue up, operations on different
/// names proceed in parallel with no shared lock. The per-account lock is
/// held for the full duration of a trade, including the oracle lookup and
/// its retries.
///
/// Precondition failures abort before any mutation: a failed operation
/// leaves the account exactly as it was, in memory and in the store.
pub struct Desk {
    limits: TradeLimits,
    oracle: Arc<PriceOracle>,
    accounts: Arc<dyn AccountStore>,
    audit: Arc<dyn AuditLog>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Desk {
    pub fn new(
        limits: TradeLimits,
        oracle: Arc<PriceOracle>,
        accounts: Arc<dyn AccountStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            limits,
            oracle,
            accounts,
            audit,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The lock guarding a single account's mutations, created on first use.
    fn lock_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Load an account by name, creating and persisting a fresh one with the
    /// configured initial balance on first lookup. Case-insensitive.
    pub async fn get_or_create(&self, name: &str) -> Result<Account, LedgerError> {
        let key = name.to_lowercase();
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;
        self.load_or_create(&key).await
    }

    async fn load_or_create(&self, key: &str) -> Result<Account, LedgerError> {
        if let Some(account) = self.accounts.read(key).await? {
            return Ok(account);
        }
        let account = Account::new(key, self.limits.initial_balance);
        self.accounts.write(&account).await?;
        info!(name = %key, "opened account");
        Ok(account)
    }

    /// Deposit funds into an account.
    pub async fn deposit(&self, name: &str, amount: Decimal) -> Result<Account, LedgerError> {
        let key = name.to_lowercase();
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let mut account = self.load_or_create(&key).await?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }

        account.balance += amount;
        self.accounts.write(&account).await?;
        self.audit
            .record(
                &key,
                LogCategory::Audit,
                &format!("Deposited {}, new balance {}", amount, account.balance),
            )
            .await;
        Ok(account)
    }

    /// Withdraw funds, refusing to drive the balance negative.
    pub async fn withdraw(&self, name: &str, amount: Decimal) -> Result<Account, LedgerError> {
        let key = name.to_lowercase();
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let mut account = self.load_or_create(&key).await?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if amount > account.balance {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: account.balance,
            });
        }

        account.balance -= amount;
        self.accounts.write(&account).await?;
        self.audit
            .record(
                &key,
                LogCategory::Audit,
                &format!("Withdrew {}, new balance {}", amount, account.balance),
            )
            .await;
        Ok(account)
    }

    /// Buy shares at the oracle price plus spread.
    pub async fn buy(
        &self,
        name: &str,
        symbol: &str,
        quantity: i64,
        rationale: &str,
    ) -> Result<Account, LedgerError> {
        let key = name.to_lowercase();
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let mut account = self.load_or_create(&key).await?;
        self.limits.check_quantity(quantity)?;
        self.limits
            .check_daily(account.trades_on(Utc::now().date_naive()))?;

        let price = self.oracle.price(symbol).await;
        if price.is_zero() {
            self.risk(&key, format!("Buy {} {} rejected: unrecognized symbol", quantity, symbol))
                .await;
            return Err(LedgerError::UnknownSymbol(symbol.to_string()));
        }

        let cost = self.limits.buy_price(price) * Decimal::from(quantity);
        let portfolio_value = self.value_of(&account).await;
        if let Err(err) = self.limits.check_trade_value(cost, portfolio_value) {
            self.risk(
                &key,
                format!("Buy {} {} rejected: trade value {} exceeds limit", quantity, symbol, cost),
            )
            .await;
            return Err(err);
        }
        if cost > account.balance {
            self.risk(&key, format!("Buy {} {} rejected: insufficient funds", quantity, symbol))
                .await;
            return Err(LedgerError::InsufficientFunds {
                required: cost,
                available: account.balance,
            });
        }

        account.apply_buy(symbol, quantity, price, cost, rationale);
        self.accounts.write(&account).await?;
        self.audit
            .record(
                &key,
                LogCategory::Audit,
                &format!("Bought {} {} at {}", quantity, symbol, price),
            )
            .await;
        Ok(account)
    }

    /// Sell held shares at the oracle price minus spread.
    pub async fn sell(
        &self,
        name: &str,
        symbol: &str,
        quantity: i64,
        rationale: &str,
    ) -> Result<Account, LedgerError> {
        let key = name.to_lowercase();
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let mut account = self.load_or_create(&key).await?;
        self.limits.check_quantity(quantity)?;
        self.limits
            .check_daily(account.trades_on(Utc::now().date_naive()))?;

        let held = account.holding(symbol);
        if held < quantity {
            self.risk(&key, format!("Sell {} {} rejected: insufficient shares", quantity, symbol))
                .await;
            return Err(LedgerError::InsufficientShares {
                symbol: symbol.to_string(),
                requested: quantity,
                held,
            });
        }

        let price = self.oracle.price(symbol).await;
        let proceeds = self.limits.sell_price(price) * Decimal::from(quantity);
        let portfolio_value = self.value_of(&account).await;
        if let Err(err) = self.limits.check_trade_value(proceeds, portfolio_value) {
            self.risk(
                &key,
                format!("Sell {} {} rejected: trade value {} exceeds limit", quantity, symbol, proceeds),
            )
            .await;
            return Err(err);
        }

        account.apply_sell(symbol, quantity, price, proceeds, rationale);
        self.accounts.write(&account).await?;
        self.audit
            .record(
                &key,
                LogCategory::Audit,
                &format!("Sold {} {} at {}", quantity, symbol, price),
            )
            .await;
        Ok(account)
    }

    /// Cash plus the mark-to-market value of all holdings at current
    /// resolvable prices. Uncached beyond what the oracle itself provides.
    pub async fn portfolio_value(&self, name: &str) -> Result<Decimal, LedgerError> {
        let key = name.to_lowercase();
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let account = self.load_or_create(&key).await?;
        Ok(self.value_of(&account).await)
    }

    async fn value_of(&self, account: &Account) -> Decimal {
        let mut total = account.balance;
        for (symbol, quantity) in &account.holdings {
            total += self.oracle.price(symbol).await * Decimal::from(*quantity);
        }
        total
    }

    /// Produce a report with derived values, appending a valuation sample.
    pub async fn report(&self, name: &str) -> Result<AccountReport, LedgerError> {
        let key = name.to_lowercase();
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let mut account = self.load_or_create(&key).await?;
        let value = self.value_of(&account).await;
        account.record_valuation(value);
        self.accounts.write(&account).await?;
        self.audit
            .record(&key, LogCategory::Audit, "Retrieved account details")
            .await;
        Ok(AccountReport::new(&account, value))
    }

    /// Restore the opening balance, wipe state, and set a new strategy.
    pub async fn reset(&self, name: &str, strategy: &str) -> Result<Account, LedgerError> {
        let key = name.to_lowercase();
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let mut account = self.load_or_create(&key).await?;
        account.reset(strategy);
        self.accounts.write(&account).await?;
        self.audit
            .record(&key, LogCategory::Audit, "Reset account")
            .await;
        Ok(account)
    }

    /// Change the account's trading strategy.
    pub async fn set_strategy(&self, name: &str, strategy: &str) -> Result<Account, LedgerError> {
        let key = name.to_lowercase();
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let mut account = self.load_or_create(&key).await?;
        account.strategy = strategy.to_string();
        self.accounts.write(&account).await?;
        self.audit
            .record(&key, LogCategory::Audit, "Changed strategy")
            .await;
        Ok(account)
    }

    async fn risk(&self, key: &str, message: String) {
        self.audit.record(key, LogCategory::Risk, &message).await;
    }

    /// The limits this desk enforces.
    pub fn limits(&self) -> &TradeLimits {
        &self.limits
    }
}
