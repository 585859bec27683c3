use crate::domain::errors::StrategyError;
use crate::domain::trading::signals::{SignalAction, TradingSignal};
use crate::domain::trading::simulation::{ProfitSimulation, Transaction, TransactionKind};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Checks that a path and an investment can be simulated at all.
pub fn validate(prices: &[f64], investment: Decimal) -> Result<(), StrategyError> {
    if prices.is_empty() {
        return Err(StrategyError::EmptyForecast);
    }
    if investment <= Decimal::ZERO {
        return Err(StrategyError::InvalidInvestment {
            amount: investment.to_string(),
        });
    }
    for (day, &price) in prices.iter().enumerate() {
        to_price(day, price)?;
    }
    Ok(())
}

fn to_price(day: usize, price: f64) -> Result<Decimal, StrategyError> {
    Decimal::from_f64(price)
        .filter(|p| *p > Decimal::ZERO)
        .ok_or(StrategyError::InvalidPrice { day, price })
}

/// All-in/all-out account: exactly one of cash and shares is non-zero between trades.
struct Account {
    cash: Decimal,
    shares: Decimal,
    transactions: Vec<Transaction>,
}

impl Account {
    fn new(cash: Decimal) -> Self {
        Self {
            cash,
            shares: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    fn buy(
        &mut self,
        day: usize,
        price: Decimal,
        kind: TransactionKind,
    ) -> Result<(), StrategyError> {
        if self.cash <= Decimal::ZERO {
            return Ok(());
        }
        let bought = self
            .cash
            .checked_div(price)
            .ok_or(StrategyError::Overflow { day, price })?;
        self.shares = self
            .shares
            .checked_add(bought)
            .ok_or(StrategyError::Overflow { day, price })?;
        self.cash = Decimal::ZERO;
        self.record(day, SignalAction::Buy, kind, price, bought);
        Ok(())
    }

    fn sell(
        &mut self,
        day: usize,
        price: Decimal,
        kind: TransactionKind,
    ) -> Result<(), StrategyError> {
        if self.shares <= Decimal::ZERO {
            return Ok(());
        }
        let sold = self.shares;
        let proceeds = sold
            .checked_mul(price)
            .and_then(|p| self.cash.checked_add(p))
            .ok_or(StrategyError::Overflow { day, price })?;
        self.cash = proceeds;
        self.shares = Decimal::ZERO;
        self.record(day, SignalAction::Sell, kind, price, sold);
        Ok(())
    }

    /// Closes the books; the profit percentage must also fit in a `Decimal`.
    fn finish(
        self,
        investment: Decimal,
        day: usize,
        price: Decimal,
    ) -> Result<ProfitSimulation, StrategyError> {
        self.cash
            .checked_sub(investment)
            .and_then(|profit| profit.checked_div(investment))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or(StrategyError::Overflow { day, price })?;
        Ok(ProfitSimulation::new(investment, self.cash, self.transactions))
    }

    fn record(
        &mut self,
        day: usize,
        action: SignalAction,
        kind: TransactionKind,
        price: Decimal,
        shares_traded: Decimal,
    ) {
        self.transactions.push(Transaction {
            day,
            action,
            kind,
            price,
            shares_traded,
            cash_after: self.cash,
            shares_after: self.shares,
        });
    }
}

/// Replays `signals` against `investment`, liquidating any open position on the last day.
pub fn simulate(
    prices: &[f64],
    signals: &[TradingSignal],
    investment: Decimal,
) -> Result<ProfitSimulation, StrategyError> {
    validate(prices, investment)?;
    let mut account = Account::new(investment);

    for signal in signals {
        let price = to_price(signal.day, signal.price)?;
        match signal.action {
            SignalAction::Buy => account.buy(signal.day, price, TransactionKind::Signal)?,
            SignalAction::Sell => account.sell(signal.day, price, TransactionKind::Signal)?,
        }
    }

    let last_day = prices.len() - 1;
    let last_price = to_price(last_day, prices[last_day])?;
    account.sell(last_day, last_price, TransactionKind::FinalLiquidation)?;

    account.finish(investment, last_day, last_price)
}

/// Buy on the first forecast day, sell on the last.
pub fn buy_and_hold(
    prices: &[f64],
    investment: Decimal,
) -> Result<ProfitSimulation, StrategyError> {
    let first = prices.first().copied().ok_or(StrategyError::EmptyForecast)?;
    let last_day = prices.len() - 1;
    let entry = to_price(0, first)?;
    let exit = to_price(last_day, prices[last_day])?;
    if investment <= Decimal::ZERO {
        return Err(StrategyError::InvalidInvestment {
            amount: investment.to_string(),
        });
    }

    let mut account = Account::new(investment);
    account.buy(0, entry, TransactionKind::BuyAndHold)?;
    account.sell(last_day, exit, TransactionKind::BuyAndHold)?;

    account.finish(investment, last_day, exit)
}
