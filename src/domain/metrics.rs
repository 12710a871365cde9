//! Trade ledger and performance summary.

use super::ohlcv::OhlcvBar;
use super::position::{Side, Trade};
use chrono::NaiveDateTime;

/// One realised trade, priced from bar closes.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub side: Side,
    pub pnl_pct: f64,
    /// Running sum of `pnl_pct` up to and including this row.
    pub cumulative_pnl_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total_trades: usize,
    pub total_pnl_pct: f64,
    pub avg_pnl_pct: f64,
    pub win_rate_pct: f64,
    pub max_drawdown_pct: f64,
}

/// Price each trade at the closes of its entry and exit bars. Trades whose
/// indices fall outside `bars` are skipped.
pub fn build_ledger(trades: &[Trade], bars: &[OhlcvBar]) -> Vec<LedgerRow> {
    let mut cumulative = 0.0;
    let mut ledger = Vec::with_capacity(trades.len());

    for trade in trades {
        let (Some(entry), Some(exit)) = (bars.get(trade.entry_index), bars.get(trade.exit_index))
        else {
            continue;
        };

        let pnl_pct = trade.side.pnl_pct(entry.close, exit.close);
        cumulative += pnl_pct;

        ledger.push(LedgerRow {
            entry_time: entry.timestamp,
            exit_time: exit.timestamp,
            entry_price: entry.close,
            exit_price: exit.close,
            side: trade.side,
            pnl_pct,
            cumulative_pnl_pct: cumulative,
        });
    }

    ledger
}

impl Summary {
    pub fn compute(ledger: &[LedgerRow]) -> Self {
        if ledger.is_empty() {
            return Summary::default();
        }

        let pnls: Vec<f64> = ledger.iter().map(|row| row.pnl_pct).collect();
        let total_trades = pnls.len();
        let total_pnl_pct: f64 = pnls.iter().sum();
        // breakeven trades are not wins
        let wins = pnls.iter().filter(|&&p| p > 0.0).count();

        Summary {
            total_trades,
            total_pnl_pct,
            avg_pnl_pct: total_pnl_pct / total_trades as f64,
            win_rate_pct: 100.0 * wins as f64 / total_trades as f64,
            max_drawdown_pct: compute_max_drawdown_pct(&pnls),
        }
    }
}

/// Compounded equity after each trade: equity[k] = prod(1 + pnl[j]/100, j <= k).
pub fn equity_curve(pnl_pcts: &[f64]) -> Vec<f64> {
    pnl_pcts
        .iter()
        .scan(1.0, |equity, pnl| {
            *equity *= 1.0 + pnl / 100.0;
            Some(*equity)
        })
        .collect()
}

/// Deepest decline of the compounded equity curve from its running peak, in
/// percent (<= 0). The curve starts at the first trade, not at 1.0, and only
/// steps on trade exits.
pub fn compute_max_drawdown_pct(pnl_pcts: &[f64]) -> f64 {
    let curve = equity_curve(pnl_pcts);
    let Some(&first) = curve.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut min_dd = 0.0_f64;

    for equity in curve {
        if equity > peak {
            peak = equity;
        }
        let dd = (equity - peak) / peak;
        if dd < min_dd {
            min_dd = dd;
        }
    }

    min_dd * 100.0
}
