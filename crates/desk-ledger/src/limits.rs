//! Trade limits configuration and checks.

use desk_core::error::LedgerError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Trading limits applied to every account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeLimits {
    /// Balance every account is opened with
    pub initial_balance: Decimal,
    /// Fractional transaction cost applied against the trader on both sides
    pub spread: Decimal,
    /// Maximum shares in a single order
    pub max_order_size: i64,
    /// Maximum buys + sells per account per calendar day
    pub daily_trade_limit: u32,
    /// Maximum single-trade value as a fraction of portfolio value
    pub max_trade_fraction: Decimal,
}

impl Default for TradeLimits {
    fn default() -> Self {
        Self {
            initial_balance: dec!(10000),
            spread: dec!(0.002),
            max_order_size: 1000,
            daily_trade_limit: 20,
            max_trade_fraction: dec!(0.3),
        }
    }
}

impl TradeLimits {
    /// Validate an order quantity against the positivity and size limits.
    pub fn check_quantity(&self, quantity: i64) -> Result<(), LedgerError> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        if quantity > self.max_order_size {
            return Err(LedgerError::OrderTooLarge {
                quantity,
                max: self.max_order_size,
            });
        }
        Ok(())
    }

    /// Validate today's executed trade count against the daily limit.
    pub fn check_daily(&self, executed_today: usize) -> Result<(), LedgerError> {
        if executed_today >= self.daily_trade_limit as usize {
            return Err(LedgerError::DailyLimitReached {
                limit: self.daily_trade_limit,
            });
        }
        Ok(())
    }

    /// Validate a trade's value against the portfolio-fraction risk limit.
    pub fn check_trade_value(
        &self,
        notional: Decimal,
        portfolio_value: Decimal,
    ) -> Result<(), LedgerError> {
        let limit = portfolio_value * self.max_trade_fraction;
        if notional > limit {
            return Err(LedgerError::TradeLimitExceeded { notional, limit });
        }
        Ok(())
    }

    /// Effective price paid by a buyer, spread applied against them.
    pub fn buy_price(&self, price: Decimal) -> Decimal {
        price * (Decimal::ONE + self.spread)
    }

    /// Effective price received by a seller, spread applied against them.
    pub fn sell_price(&self, price: Decimal) -> Decimal {
        price * (Decimal::ONE - self.spread)
    }
}
