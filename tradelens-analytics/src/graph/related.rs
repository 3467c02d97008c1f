//! Related-trade discovery by breadth-first expansion.
//!
//! Two trades are adjacent when they share a symbol, a close date or an
//! opening session. The hop limit here is independent of [`GraphDepth`].
//!
//! [`GraphDepth`]: super::model::GraphDepth

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use tradelens_core::domain::{Session, Trade};

/// A trade reached from the focal trade, with the hop it was first seen at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedTrade<'a> {
    pub trade: &'a Trade,
    pub hops: usize,
}

/// Adjacency lookup by each of the three shared keys.
struct Adjacency<'a> {
    by_symbol: HashMap<&'a str, Vec<usize>>,
    by_date: HashMap<NaiveDate, Vec<usize>>,
    by_session: HashMap<Session, Vec<usize>>,
}

impl<'a> Adjacency<'a> {
    fn index(trades: &'a [Trade]) -> Self {
        let mut adj = Adjacency {
            by_symbol: HashMap::new(),
            by_date: HashMap::new(),
            by_session: HashMap::new(),
        };
        for (i, t) in trades.iter().enumerate() {
            adj.by_symbol.entry(t.symbol.as_str()).or_default().push(i);
            adj.by_date.entry(t.close_date()).or_default().push(i);
            adj.by_session.entry(t.session()).or_default().push(i);
        }
        adj
    }

    /// Add the members of every group of `trade` not expanded yet.
    ///
    /// A group is expanded at most once per search: every member it holds is
    /// reached the first time, so later visits add nothing.
    fn expand(&self, trade: &Trade, seen: &mut ExpandedGroups<'a>, out: &mut BTreeSet<usize>) {
        if let Some((key, members)) = self.by_symbol.get_key_value(trade.symbol.as_str()) {
            if seen.symbols.insert(*key) {
                out.extend(members);
            }
        }
        let date = trade.close_date();
        if seen.dates.insert(date) {
            if let Some(members) = self.by_date.get(&date) {
                out.extend(members);
            }
        }
        let session = trade.session();
        if seen.sessions.insert(session) {
            if let Some(members) = self.by_session.get(&session) {
                out.extend(members);
            }
        }
    }
}

/// Group keys already expanded during one search.
#[derive(Default)]
struct ExpandedGroups<'a> {
    symbols: HashSet<&'a str>,
    dates: HashSet<NaiveDate>,
    sessions: HashSet<Session>,
}

/// Trades reachable from `focal` within `max_hops`, excluding `focal` itself.
///
/// `max_hops == 1` returns only direct neighbours. Results are in discovery
/// order: by hop, then by position in `all`. A ticket is visited once, so
/// duplicates of the focal ticket (or of any reached ticket) are skipped.
pub fn related_trades<'a>(focal: &Trade, all: &'a [Trade], max_hops: usize) -> Vec<&'a Trade> {
    related_trades_with_hops(focal, all, max_hops)
        .into_iter()
        .map(|r| r.trade)
        .collect()
}

/// Like [`related_trades`], also reporting the hop at which each was found.
pub fn related_trades_with_hops<'a>(
    focal: &Trade,
    all: &'a [Trade],
    max_hops: usize,
) -> Vec<RelatedTrade<'a>> {
    let adjacency = Adjacency::index(all);
    let mut expanded = ExpandedGroups::default();
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(focal.ticket.as_str());

    let mut found = Vec::new();
    let mut frontier: Vec<&Trade> = vec![focal];

    for hop in 1..=max_hops {
        let mut reached = BTreeSet::new();
        for trade in &frontier {
            adjacency.expand(trade, &mut expanded, &mut reached);
        }

        let mut next = Vec::new();
        for i in reached {
            let candidate = &all[i];
            if visited.insert(candidate.ticket.as_str()) {
                found.push(RelatedTrade {
                    trade: candidate,
                    hops: hop,
                });
                next.push(candidate);
            }
        }

        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    debug!(
        focal = %focal.ticket,
        max_hops,
        related = found.len(),
        "related trade search"
    );
    found
}

/// Look up a trade by ticket; the first match wins.
pub fn find_by_ticket<'a>(trades: &'a [Trade], ticket: &str) -> Option<&'a Trade> {
    trades.iter().find(|t| t.ticket == ticket)
}
