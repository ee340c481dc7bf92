use std::collections::{BTreeSet, HashMap};

use crate::model::TxRecord;
use crate::units;

/// Undirected adjacency over all (from, to) pairs, keyed by lowercase
/// address. Neighbor sets are BTreeSets so iteration order is fixed,
/// which keeps DFS results reproducible.
#[derive(Debug, Default)]
pub struct AddressGraph {
    adjacency: HashMap<String, BTreeSet<String>>,
}

impl AddressGraph {
    /// Build the relationship graph, skipping transactions with an empty
    /// endpoint. Both directions are inserted.
    pub fn build(transactions: &[TxRecord]) -> Self {
        let mut adjacency: HashMap<String, BTreeSet<String>> = HashMap::new();
        for tx in transactions {
            let from = tx.sender();
            let to = tx.recipient();
            if from.is_empty() || to.is_empty() {
                continue;
            }
            adjacency.entry(from.clone()).or_default().insert(to.clone());
            adjacency.entry(to).or_default().insert(from);
        }
        Self { adjacency }
    }

    pub fn contains(&self, address: &str) -> bool {
        self.adjacency.contains_key(address)
    }

    /// Neighbors of an address in sorted order; empty for unknown nodes.
    pub fn neighbors(&self, address: &str) -> impl Iterator<Item = &String> {
        self.adjacency.get(address).into_iter().flatten()
    }

    pub fn neighbor_count(&self, address: &str) -> usize {
        self.adjacency.get(address).map_or(0, |set| set.len())
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }
}

/// A (counterparty, cumulative value) ranking entry.
pub type RankedVolume = (String, f64);

/// Directed flow graph with per-edge summed normalized value. Used for
/// volume-in/out computation and counterparty rankings relative to a root.
#[derive(Debug, Default)]
pub struct FlowGraph {
    edges: HashMap<(String, String), f64>,
    // first-seen order of edges, so equal-value rankings stay stable
    order: Vec<(String, String)>,
}

impl FlowGraph {
    pub fn build(transactions: &[TxRecord], exponent: u32) -> Self {
        let mut edges: HashMap<(String, String), f64> = HashMap::new();
        let mut order = Vec::new();
        for tx in transactions {
            let from = tx.sender();
            let to = tx.recipient();
            if from.is_empty() || to.is_empty() {
                continue;
            }
            let value = units::to_human(&tx.value, exponent);
            let key = (from, to);
            if !edges.contains_key(&key) {
                order.push(key.clone());
            }
            *edges.entry(key).or_insert(0.0) += value;
        }
        Self { edges, order }
    }

    pub fn edge_weight(&self, from: &str, to: &str) -> Option<f64> {
        self.edges
            .get(&(from.to_string(), to.to_string()))
            .copied()
    }

    /// Total inbound volume to the given (lowercase) address.
    pub fn volume_in(&self, address: &str) -> f64 {
        self.edges
            .iter()
            .filter(|((_, to), _)| to == address)
            .map(|(_, value)| value)
            .sum()
    }

    /// Total outbound volume from the given (lowercase) address.
    pub fn volume_out(&self, address: &str) -> f64 {
        self.edges
            .iter()
            .filter(|((from, _), _)| from == address)
            .map(|(_, value)| value)
            .sum()
    }

    /// Counterparties that sent to `address`, ranked by cumulative value
    /// descending. Stable sort: ties keep first-seen order.
    pub fn top_senders(&self, address: &str, limit: usize) -> Vec<RankedVolume> {
        let mut ranked: Vec<RankedVolume> = self
            .order
            .iter()
            .filter(|(_, to)| to == address)
            .map(|(from, to)| (from.clone(), self.edges[&(from.clone(), to.clone())]))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(limit);
        ranked
    }

    /// Counterparties that `address` sent to, ranked by cumulative value
    /// descending, first-seen tie order.
    pub fn top_recipients(&self, address: &str, limit: usize) -> Vec<RankedVolume> {
        let mut ranked: Vec<RankedVolume> = self
            .order
            .iter()
            .filter(|(from, _)| from == address)
            .map(|(from, to)| (to.clone(), self.edges[&(from.clone(), to.clone())]))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(limit);
        ranked
    }

    /// Successor addresses of a node in first-seen edge order.
    pub fn successors(&self, address: &str) -> Vec<&String> {
        self.order
            .iter()
            .filter(|(from, _)| from == address)
            .map(|(_, to)| to)
            .collect()
    }
}
