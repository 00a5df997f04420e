//! Account and transaction types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A single executed trade.
///
/// Records are append-only: once pushed onto an account's history they are
/// never rewritten. The `price` is the unadjusted execution price; the
/// spread is a cost, not part of the recorded trade price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID
    pub id: Uuid,
    /// Symbol traded
    pub symbol: String,
    /// Signed quantity: positive for a buy, negative for a sell
    pub quantity: i64,
    /// Execution price before spread adjustment
    pub price: Decimal,
    /// When the trade executed
    pub timestamp: DateTime<Utc>,
    /// Free-text trading rationale supplied by the caller
    pub rationale: String,
}

impl Transaction {
    /// Create a new transaction stamped with the current time.
    pub fn new(symbol: impl Into<String>, quantity: i64, price: Decimal, rationale: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            quantity,
            price,
            timestamp: Utc::now(),
            rationale: rationale.to_string(),
        }
    }

    /// Check if this is a buy (positive quantity).
    pub fn is_buy(&self) -> bool {
        self.quantity > 0
    }

    /// Absolute trade value at the recorded price.
    pub fn notional(&self) -> Decimal {
        Decimal::from(self.quantity.abs()) * self.price
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} shares of {} at {} each",
            self.quantity.abs(),
            self.symbol,
            self.price
        )
    }
}

/// A timestamped portfolio-value sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
}

/// A named trading account.
///
/// Accounts are keyed case-insensitively: `name` is stored lowercase and all
/// lookups go through the same normalization. Holdings never carry a zero or
/// negative entry; a sell that empties a position removes the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique lowercase identifier
    pub name: String,
    /// Available cash
    pub balance: Decimal,
    /// The balance the account was opened with
    pub initial_balance: Decimal,
    /// Free-text trading strategy, mutable at any time
    pub strategy: String,
    /// Symbol to quantity held; entries are always positive
    pub holdings: HashMap<String, i64>,
    /// Append-only trade history
    pub transactions: Vec<Transaction>,
    /// Portfolio-value samples appended whenever a report is produced
    #[serde(default)]
    pub valuations: Vec<ValuationPoint>,
}

impl Account {
    /// Create a fresh account with the given starting balance.
    pub fn new(name: &str, initial_balance: Decimal) -> Self {
        Self {
            name: name.to_lowercase(),
            balance: initial_balance,
            initial_balance,
            strategy: String::new(),
            holdings: HashMap::new(),
            transactions: Vec::new(),
            valuations: Vec::new(),
        }
    }

    /// Quantity currently held for a symbol (0 if absent).
    pub fn holding(&self, symbol: &str) -> i64 {
        self.holdings.get(symbol).copied().unwrap_or(0)
    }

    /// Number of trades (buys + sells) executed on the given calendar date.
    pub fn trades_on(&self, date: NaiveDate) -> usize {
        self.transactions
            .iter()
            .filter(|t| t.timestamp.date_naive() == date)
            .count()
    }

    /// Apply an executed buy: debit the cost, credit the holding, and append
    /// the transaction record at the unadjusted price.
    pub fn apply_buy(
        &mut self,
        symbol: &str,
        quantity: i64,
        price: Decimal,
        cost: Decimal,
        rationale: &str,
    ) {
        self.balance -= cost;
        *self.holdings.entry(symbol.to_string()).or_insert(0) += quantity;
        self.transactions
            .push(Transaction::new(symbol, quantity, price, rationale));
    }

    /// Apply an executed sell: credit the proceeds, debit the holding
    /// (removing the entry when it reaches zero), and append the transaction
    /// record with the negative-quantity convention.
    pub fn apply_sell(
        &mut self,
        symbol: &str,
        quantity: i64,
        price: Decimal,
        proceeds: Decimal,
        rationale: &str,
    ) {
        self.balance += proceeds;
        if let Some(held) = self.holdings.get_mut(symbol) {
            *held -= quantity;
            if *held == 0 {
                self.holdings.remove(symbol);
            }
        }
        self.transactions
            .push(Transaction::new(symbol, -quantity, price, rationale));
    }

    /// Restore the opening balance and wipe holdings, history, and
    /// valuations, keeping the account name.
    pub fn reset(&mut self, strategy: &str) {
        self.balance = self.initial_balance;
        self.strategy = strategy.to_string();
        self.holdings.clear();
        self.transactions.clear();
        self.valuations.clear();
    }

    /// Append a portfolio-value sample.
    pub fn record_valuation(&mut self, value: Decimal) {
        self.valuations.push(ValuationPoint {
            timestamp: Utc::now(),
            value,
        });
    }

    /// Profit or loss relative to the opening balance. Pure function of a
    /// valuation; does not refetch prices.
    pub fn profit_loss(&self, portfolio_value: Decimal) -> Decimal {
        portfolio_value - self.initial_balance
    }
}

/// Serializable account snapshot with derived values filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountReport {
    pub name: String,
    pub balance: Decimal,
    pub strategy: String,
    pub holdings: HashMap<String, i64>,
    pub transactions: Vec<Transaction>,
    pub portfolio_value: Decimal,
    pub profit_loss: Decimal,
}

impl AccountReport {
    /// Build a report from an account and a valuation computed for it.
    pub fn new(account: &Account, portfolio_value: Decimal) -> Self {
        Self {
            name: account.name.clone(),
            balance: account.balance,
            strategy: account.strategy.clone(),
            holdings: account.holdings.clone(),
            transactions: account.transactions.clone(),
            portfolio_value,
            profit_loss: account.profit_loss(portfolio_value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_new_lowercases_name() {
        let account = Account::new("Alice", dec!(10000));
        assert_eq!(account.name, "alice");
        assert_eq!(account.balance, dec!(10000));
        assert_eq!(account.initial_balance, dec!(10000));
        assert!(account.holdings.is_empty());
    }

    #[test]
    fn test_apply_buy_updates_holdings_and_history() {
        let mut account = Account::new("alice", dec!(10000));
        account.apply_buy("AAPL", 10, dec!(100), dec!(1010), "entry");

        assert_eq!(account.balance, dec!(8990));
        assert_eq!(account.holding("AAPL"), 10);
        assert_eq!(account.transactions.len(), 1);
        assert_eq!(account.transactions[0].quantity, 10);
        assert_eq!(account.transactions[0].price, dec!(100));
    }

    #[test]
    fn test_apply_sell_removes_empty_holding() {
        let mut account = Account::new("alice", dec!(10000));
        account.apply_buy("AAPL", 5, dec!(100), dec!(500), "entry");
        account.apply_sell("AAPL", 5, dec!(100), dec!(500), "exit");

        assert!(!account.holdings.contains_key("AAPL"));
        assert_eq!(account.transactions.len(), 2);
        assert_eq!(account.transactions[1].quantity, -5);
    }

    #[test]
    fn test_trades_on_counts_todays_trades() {
        let mut account = Account::new("alice", dec!(10000));
        account.apply_buy("AAPL", 1, dec!(100), dec!(100), "t1");
        account.apply_sell("AAPL", 1, dec!(100), dec!(100), "t2");

        let today = Utc::now().date_naive();
        assert_eq!(account.trades_on(today), 2);
        assert_eq!(account.trades_on(today.pred_opt().unwrap()), 0);
    }

    #[test]
    fn test_reset_restores_opening_state() {
        let mut account = Account::new("alice", dec!(10000));
        account.apply_buy("AAPL", 10, dec!(100), dec!(1000), "entry");
        account.reset("momentum");

        assert_eq!(account.balance, dec!(10000));
        assert_eq!(account.strategy, "momentum");
        assert!(account.holdings.is_empty());
        assert!(account.transactions.is_empty());
    }

    #[test]
    fn test_transaction_notional() {
        let txn = Transaction::new("AAPL", -5, dec!(100), "exit");
        assert_eq!(txn.notional(), dec!(500));
        assert!(!txn.is_buy());
    }

    #[test]
    fn test_profit_loss_relative_to_initial() {
        let account = Account::new("alice", dec!(10000));
        assert_eq!(account.profit_loss(dec!(10500)), dec!(500));
        assert_eq!(account.profit_loss(dec!(9400)), dec!(-600));
    }
}
