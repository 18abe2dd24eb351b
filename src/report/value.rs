//! Position/signal combination and per-order PnL

use super::{Cell, ReportError, ResultTable};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Status of the position snapshot taken after orders are filled
pub const POST_TRADE: &str = "post_trade";

/// Columns of the combined frame, after `datetime`
pub const COMBINED_COLUMNS: [&str; 5] = [
    "current_price",
    "total_pnl",
    "close_price",
    "signal",
    "order_volume",
];

/// Row of the engine's position table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRecord {
    pub datetime: String,
    pub status: String,
    pub current_price: Option<f64>,
    pub total_pnl: Option<f64>,
}

/// Row of the engine's signal table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRecord {
    pub datetime: String,
    pub close_price: Option<f64>,
    pub signal: Option<f64>,
    pub order_volume: Option<f64>,
}

/// Position and signal columns aligned on `datetime`.
///
/// A side without a row at this datetime leaves its columns empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRow {
    pub datetime: String,
    pub current_price: Option<f64>,
    pub total_pnl: Option<f64>,
    pub close_price: Option<f64>,
    pub signal: Option<f64>,
    pub order_volume: Option<f64>,
}

impl CombinedRow {
    fn empty(datetime: &str) -> Self {
        Self {
            datetime: datetime.to_string(),
            current_price: None,
            total_pnl: None,
            close_price: None,
            signal: None,
            order_volume: None,
        }
    }

    /// Every row except those whose `order_volume` is exactly zero.
    ///
    /// A row without a signal side (a position outside the signal window)
    /// has no volume and counts as an order.
    pub fn is_order(&self) -> bool {
        !matches!(self.order_volume, Some(v) if v == 0.0)
    }
}

/// Combined row with an order and the PnL attributed to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub datetime: String,
    pub total_pnl: Option<f64>,
    pub order_volume: Option<f64>,
    pub order_pnl: Option<f64>,
}

/// Outer join of post-trade positions and signals from `start_date` on.
///
/// `start_date` is compared as text against the stored datetimes.
pub fn combine(
    positions: &[PositionRecord],
    signals: &[SignalRecord],
    start_date: &str,
) -> Result<Vec<CombinedRow>, ReportError> {
    let mut frame: BTreeMap<String, CombinedRow> = BTreeMap::new();

    for position in positions.iter().filter(|p| p.status == POST_TRADE) {
        if frame.contains_key(&position.datetime) {
            return Err(ReportError::DuplicateDatetime {
                table: "position",
                datetime: position.datetime.clone(),
            });
        }
        let mut row = CombinedRow::empty(&position.datetime);
        row.current_price = position.current_price;
        row.total_pnl = position.total_pnl;
        frame.insert(position.datetime.clone(), row);
    }

    let mut seen = HashSet::new();
    for signal in signals.iter().filter(|s| s.datetime.as_str() >= start_date) {
        if !seen.insert(signal.datetime.as_str()) {
            return Err(ReportError::DuplicateDatetime {
                table: "signal",
                datetime: signal.datetime.clone(),
            });
        }
        let row = frame
            .entry(signal.datetime.clone())
            .or_insert_with(|| CombinedRow::empty(&signal.datetime));
        row.close_price = signal.close_price;
        row.signal = signal.signal;
        row.order_volume = signal.order_volume;
    }

    Ok(frame.into_values().collect())
}

/// PnL attributed to each order.
///
/// Each order is credited with the change in `total_pnl` up to the next
/// order. The last order has no successor and is credited with
/// `final_total_pnl` minus its own `total_pnl`.
pub fn order_pnl(combined: &[CombinedRow], final_total_pnl: Option<f64>) -> Vec<OrderRow> {
    let orders: Vec<&CombinedRow> = combined.iter().filter(|r| r.is_order()).collect();

    orders
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let next = match orders.get(i + 1) {
                Some(next) => next.total_pnl,
                None => final_total_pnl,
            };
            OrderRow {
                datetime: row.datetime.clone(),
                total_pnl: row.total_pnl,
                order_volume: row.order_volume,
                order_pnl: next.zip(row.total_pnl).map(|(n, c)| n - c),
            }
        })
        .collect()
}

/// Everything the value workflow reports
#[derive(Debug, Clone, Serialize)]
pub struct ValueReport {
    pub start_date: String,
    /// Last `total_pnl` of the unfiltered position table
    pub final_pnl: Option<f64>,
    pub combined: Vec<CombinedRow>,
    pub orders: Vec<OrderRow>,
}

impl ValueReport {
    pub fn build(
        positions: &[PositionRecord],
        signals: &[SignalRecord],
        start_date: &str,
    ) -> Result<Self, ReportError> {
        let combined = combine(positions, signals, start_date)?;
        let final_pnl = positions.last().and_then(|p| p.total_pnl);
        let orders = order_pnl(&combined, final_pnl);

        tracing::debug!(
            positions = positions.len(),
            signals = signals.len(),
            combined = combined.len(),
            orders = orders.len(),
            "Combined position and signal tables"
        );

        Ok(Self {
            start_date: start_date.to_string(),
            final_pnl,
            combined,
            orders,
        })
    }

    /// Combined frame as a generic table
    pub fn combined_table(&self) -> ResultTable {
        let mut columns = vec!["datetime".to_string()];
        columns.extend(COMBINED_COLUMNS.iter().map(|c| c.to_string()));
        ResultTable {
            columns,
            rows: self
                .combined
                .iter()
                .map(|r| {
                    vec![
                        Cell::from(r.datetime.as_str()),
                        r.current_price.into(),
                        r.total_pnl.into(),
                        r.close_price.into(),
                        r.signal.into(),
                        r.order_volume.into(),
                    ]
                })
                .collect(),
        }
    }

    /// Orders as a generic table
    pub fn orders_table(&self) -> ResultTable {
        ResultTable {
            columns: ["datetime", "total_pnl", "order_volume", "order_pnl"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows: self
                .orders
                .iter()
                .map(|r| {
                    vec![
                        Cell::from(r.datetime.as_str()),
                        r.total_pnl.into(),
                        r.order_volume.into(),
                        r.order_pnl.into(),
                    ]
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(datetime: &str, status: &str, total_pnl: f64) -> PositionRecord {
        PositionRecord {
            datetime: datetime.to_string(),
            status: status.to_string(),
            current_price: Some(4000.0 + total_pnl),
            total_pnl: Some(total_pnl),
        }
    }

    fn signal(datetime: &str, order_volume: f64) -> SignalRecord {
        SignalRecord {
            datetime: datetime.to_string(),
            close_price: Some(4000.0),
            signal: Some(order_volume.signum()),
            order_volume: Some(order_volume),
        }
    }

    #[test]
    fn test_combine_keeps_post_trade_only() {
        let positions = vec![
            position("2021-01-04 09:00:00", "pre_trade", 0.0),
            position("2021-01-04 09:00:00", POST_TRADE, 1.0),
        ];
        let combined = combine(&positions, &[], "2021-01-01").unwrap();
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].total_pnl, Some(1.0));
    }

    #[test]
    fn test_combine_outer_join_leaves_gaps() {
        let positions = vec![
            position("2021-01-04 09:00:00", POST_TRADE, 1.0),
            position("2021-01-04 10:00:00", POST_TRADE, 2.0),
        ];
        let signals = vec![
            signal("2021-01-04 10:00:00", 1.0),
            signal("2021-01-04 11:00:00", 0.0),
        ];

        let combined = combine(&positions, &signals, "2021-01-01").unwrap();
        let keys: Vec<&str> = combined.iter().map(|r| r.datetime.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "2021-01-04 09:00:00",
                "2021-01-04 10:00:00",
                "2021-01-04 11:00:00"
            ]
        );

        // position only
        assert_eq!(combined[0].total_pnl, Some(1.0));
        assert_eq!(combined[0].close_price, None);
        assert_eq!(combined[0].order_volume, None);
        // both
        assert_eq!(combined[1].total_pnl, Some(2.0));
        assert_eq!(combined[1].order_volume, Some(1.0));
        // signal only
        assert_eq!(combined[2].current_price, None);
        assert_eq!(combined[2].total_pnl, None);
        assert_eq!(combined[2].close_price, Some(4000.0));
    }

    #[test]
    fn test_combine_filters_signals_before_start() {
        let signals = vec![
            signal("2020-12-31 15:00:00", 1.0),
            signal("2021-01-04 09:00:00", -1.0),
        ];
        let combined = combine(&[], &signals, "2021-01-01").unwrap();
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].datetime, "2021-01-04 09:00:00");
    }

    #[test]
    fn test_combine_rejects_duplicate_keys() {
        let positions = vec![
            position("2021-01-04 09:00:00", POST_TRADE, 1.0),
            position("2021-01-04 09:00:00", POST_TRADE, 2.0),
        ];
        assert!(matches!(
            combine(&positions, &[], "2021-01-01"),
            Err(ReportError::DuplicateDatetime { table: "position", .. })
        ));

        let signals = vec![signal("2021-01-04 09:00:00", 1.0), signal("2021-01-04 09:00:00", 0.0)];
        assert!(matches!(
            combine(&[], &signals, "2021-01-01"),
            Err(ReportError::DuplicateDatetime { table: "signal", .. })
        ));
    }

    #[test]
    fn test_combined_table_columns() {
        let report = ValueReport::build(
            &[position("2021-01-04 09:00:00", POST_TRADE, 1.0)],
            &[signal("2021-01-04 10:00:00", 1.0)],
            "2021-01-01",
        )
        .unwrap();
        let table = report.combined_table();
        assert_eq!(
            table.columns,
            vec![
                "datetime",
                "current_price",
                "total_pnl",
                "close_price",
                "signal",
                "order_volume"
            ]
        );
        assert_eq!(table.rows[0][3], Cell::Null);
        assert_eq!(table.rows[1][1], Cell::Null);
    }

    #[test]
    fn test_order_pnl_three_orders() {
        let positions = vec![
            position("2021-01-04 09:00:00", POST_TRADE, 10.0),
            position("2021-01-04 10:00:00", POST_TRADE, 12.0),
            position("2021-01-04 11:00:00", POST_TRADE, 15.0),
            position("2021-01-04 12:00:00", POST_TRADE, 11.0),
            position("2021-01-04 13:00:00", POST_TRADE, 20.0),
            position("2021-01-04 13:00:00", "pre_trade", 24.0),
        ];
        let signals = vec![
            signal("2021-01-04 09:00:00", 1.0),
            signal("2021-01-04 10:00:00", 0.0),
            signal("2021-01-04 11:00:00", -2.0),
            signal("2021-01-04 12:00:00", 0.0),
            signal("2021-01-04 13:00:00", 2.0),
        ];

        let report = ValueReport::build(&positions, &signals, "2021-01-01").unwrap();
        assert_eq!(report.final_pnl, Some(24.0));

        let orders = &report.orders;
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].datetime, "2021-01-04 09:00:00");
        assert_eq!(orders[0].order_pnl, Some(15.0 - 10.0));
        assert_eq!(orders[1].datetime, "2021-01-04 11:00:00");
        assert_eq!(orders[1].order_pnl, Some(20.0 - 15.0));
        // last order: final position pnl minus its own pnl
        assert_eq!(orders[2].datetime, "2021-01-04 13:00:00");
        assert_eq!(orders[2].order_pnl, Some(24.0 - 20.0));
        assert_eq!(orders[2].order_volume, Some(2.0));
    }

    #[test]
    fn test_order_pnl_missing_operand() {
        let mut combined = vec![CombinedRow::empty("a"), CombinedRow::empty("b")];
        combined[0].order_volume = Some(1.0);
        combined[0].total_pnl = Some(5.0);
        combined[1].order_volume = Some(-1.0);

        let orders = order_pnl(&combined, Some(9.0));
        assert_eq!(orders[0].order_pnl, None);
        assert_eq!(orders[1].order_pnl, None);
    }

    #[test]
    fn test_rows_without_volume_are_orders() {
        let mut combined = vec![CombinedRow::empty("a"), CombinedRow::empty("b")];
        combined[0].total_pnl = Some(1.0);
        combined[1].total_pnl = Some(1.5);
        combined[1].order_volume = Some(f64::NAN);

        let orders = order_pnl(&combined, Some(2.0));
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_volume, None);
        assert_eq!(orders[0].order_pnl, Some(0.5));
        assert_eq!(orders[1].order_pnl, Some(0.5));
    }

    #[test]
    fn test_positions_before_start_count_as_orders() {
        let positions = vec![
            position("2020-12-31 15:00:00", POST_TRADE, 1.0),
            position("2021-01-04 09:00:00", POST_TRADE, 3.0),
        ];
        let signals = vec![
            signal("2020-12-31 15:00:00", 0.0),
            signal("2021-01-04 09:00:00", 1.0),
        ];

        let report = ValueReport::build(&positions, &signals, "2021-01-01").unwrap();
        assert_eq!(report.combined.len(), 2);

        let orders: Vec<(&str, Option<f64>)> = report
            .orders
            .iter()
            .map(|o| (o.datetime.as_str(), o.order_pnl))
            .collect();
        assert_eq!(
            orders,
            vec![
                ("2020-12-31 15:00:00", Some(2.0)),
                ("2021-01-04 09:00:00", Some(0.0)),
            ]
        );
    }

    #[test]
    fn test_zero_volume_is_not_an_order() {
        let mut combined = vec![CombinedRow::empty("a")];
        combined[0].order_volume = Some(0.0);
        assert!(order_pnl(&combined, Some(2.0)).is_empty());
    }

    #[test]
    fn test_no_orders() {
        assert!(order_pnl(&[], None).is_empty());
    }
}
