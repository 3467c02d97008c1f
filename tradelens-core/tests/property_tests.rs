//! Property tests for parser invariants.
//!
//! Uses proptest to verify:
//! 1. Net profit identity — every parsed trade has net = profit + commission + swap
//! 2. Idempotence — parsing the same text twice yields identical trades
//! 3. Row accounting — every generated row becomes exactly one trade, in order

use proptest::prelude::*;
use tradelens_core::report::{parse_report, parse_report_detailed};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_money() -> impl Strategy<Value = f64> {
    (-5000.0..5000.0_f64).prop_map(|v| (v * 100.0).round() / 100.0)
}

fn arb_cost() -> impl Strategy<Value = f64> {
    (-50.0..0.0_f64).prop_map(|v| (v * 100.0).round() / 100.0)
}

fn arb_symbol() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["eurusd", "GBPUSD", "UsdJpy", "xauusd"]).prop_map(String::from)
}

#[derive(Debug, Clone)]
struct Row {
    side: &'static str,
    symbol: String,
    day: u32,
    hour: u32,
    commission: f64,
    swap: f64,
    profit: f64,
}

fn arb_row() -> impl Strategy<Value = Row> {
    (
        prop::sample::select(vec!["buy", "sell"]),
        arb_symbol(),
        1..28u32,
        0..23u32,
        arb_cost(),
        arb_cost(),
        arb_money(),
    )
        .prop_map(|(side, symbol, day, hour, commission, swap, profit)| Row {
            side,
            symbol,
            day,
            hour,
            commission,
            swap,
            profit,
        })
}

fn render(rows: &[Row]) -> String {
    let mut text = String::from("Closed Transactions:\nTicket\tOpen Time\tType\tSize\tItem\n");
    for (i, r) in rows.iter().enumerate() {
        text.push_str(&format!(
            "{}\t2024.03.{:02} {:02}:00\t{}\t0.10\t{}\t1.1000\t0\t0\t2024.03.{:02} {:02}:30\t1.1010\t{:.2}\t0.00\t{:.2}\t{:.2}\n",
            1000 + i,
            r.day,
            r.hour,
            r.side,
            r.symbol,
            r.day,
            r.hour,
            r.commission,
            r.swap,
            r.profit,
        ));
    }
    text.push_str("Closed P/L:\t0\n");
    text
}

proptest! {
    #[test]
    fn net_profit_identity(rows in prop::collection::vec(arb_row(), 1..30)) {
        let trades = parse_report(&render(&rows));
        prop_assert_eq!(trades.len(), rows.len());
        for t in &trades {
            prop_assert!((t.net_profit - (t.profit + t.commission + t.swap)).abs() < 1e-9);
            prop_assert_eq!(t.is_win, t.net_profit > 0.0);
            prop_assert_eq!(t.duration_minutes, 30);
            prop_assert_eq!(t.symbol.clone(), t.symbol.to_uppercase());
        }
    }

    #[test]
    fn parsing_is_idempotent(rows in prop::collection::vec(arb_row(), 0..30)) {
        let text = render(&rows);
        let a = parse_report_detailed(&text);
        let b = parse_report_detailed(&text);
        prop_assert_eq!(a.trades, b.trades);
        prop_assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn rows_keep_encounter_order(rows in prop::collection::vec(arb_row(), 1..30)) {
        let trades = parse_report(&render(&rows));
        let tickets: Vec<String> = trades.iter().map(|t| t.ticket.clone()).collect();
        let expected: Vec<String> = (0..rows.len()).map(|i| (1000 + i).to_string()).collect();
        prop_assert_eq!(tickets, expected);
    }
}
