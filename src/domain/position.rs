//! Position state and closed trades.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }

    /// Percentage return of a round trip at the given prices.
    pub fn pnl_pct(&self, entry_price: f64, exit_price: f64) -> f64 {
        match self {
            Side::Long => 100.0 * (exit_price - entry_price) / entry_price,
            Side::Short => 100.0 * (entry_price - exit_price) / entry_price,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Walk state. At most one position is ever open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Flat,
    Open { side: Side, entry_index: usize },
}

impl Position {
    /// Close the open position at `exit_index`. `None` when flat or when the
    /// exit would not come strictly after the entry.
    pub fn close(&self, exit_index: usize) -> Option<Trade> {
        match *self {
            Position::Open { side, entry_index } if entry_index < exit_index => Some(Trade {
                entry_index,
                exit_index,
                side,
            }),
            _ => None,
        }
    }
}

/// A completed round trip, as bar indices into the series it was walked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    pub entry_index: usize,
    pub exit_index: usize,
    pub side: Side,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_flat() {
        assert_eq!(Position::default(), Position::Flat);
    }

    #[test]
    fn close_emits_trade() {
        let pos = Position::Open {
            side: Side::Short,
            entry_index: 4,
        };
        assert_eq!(
            pos.close(9),
            Some(Trade {
                entry_index: 4,
                exit_index: 9,
                side: Side::Short
            })
        );
    }

    #[test]
    fn close_requires_later_exit() {
        let pos = Position::Open {
            side: Side::Long,
            entry_index: 4,
        };
        assert_eq!(pos.close(4), None);
        assert_eq!(Position::Flat.close(10), None);
    }

    #[test]
    fn pnl_pct_long() {
        assert!((Side::Long.pnl_pct(100.0, 110.0) - 10.0).abs() < 1e-12);
        assert!((Side::Long.pnl_pct(100.0, 95.0) + 5.0).abs() < 1e-12);
    }

    #[test]
    fn pnl_pct_short() {
        assert!((Side::Short.pnl_pct(100.0, 90.0) - 10.0).abs() < 1e-12);
        assert!((Side::Short.pnl_pct(100.0, 105.0) + 5.0).abs() < 1e-12);
    }

    #[test]
    fn side_display() {
        assert_eq!(Side::Long.to_string(), "long");
        assert_eq!(Side::Short.to_string(), "short");
    }
}
