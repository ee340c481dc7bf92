use std::collections::{HashMap, HashSet};

use crate::config::ClusteringConfig;
use crate::graph::AddressGraph;
use crate::model::TxRecord;
use crate::units;

use super::types::{AmountFinding, CounterpartyFinding, DustFinding, TimingFinding};

/// Frequency, dust, timing and amount clustering over the flat transaction
/// list. Each sub-analysis is independent; the circular-pattern search runs
/// separately over the address graph and is merged into the report by the
/// engine.
pub struct ClusterFindings {
    pub suspicious_counterparties: Vec<CounterpartyFinding>,
    pub dust_attacks: Vec<DustFinding>,
    pub timing_clusters: Vec<TimingFinding>,
    pub amount_clusters: Vec<AmountFinding>,
}

pub fn cluster_counterparties(
    transactions: &[TxRecord],
    graph: &AddressGraph,
    root_address: &str,
    exponent: u32,
    config: &ClusteringConfig,
) -> ClusterFindings {
    let root = root_address.trim().to_lowercase();
    ClusterFindings {
        suspicious_counterparties: frequent_counterparties(graph, &root),
        dust_attacks: dust_attacks(transactions, &root, exponent, config),
        timing_clusters: timing_clusters(transactions, config),
        amount_clusters: amount_clusters(transactions, exponent),
    }
}

/// Up to 10 direct neighbors of the root; a wide fan-out raises the score.
fn frequent_counterparties(graph: &AddressGraph, root: &str) -> Vec<CounterpartyFinding> {
    let total = graph.neighbor_count(root);
    let risk_score = if total > 10 { 0.6 } else { 0.3 };
    graph
        .neighbors(root)
        .take(10)
        .map(|address| CounterpartyFinding {
            address: address.clone(),
            connection_type: "frequent_interaction".to_string(),
            risk_score,
        })
        .collect()
}

/// Recipients of the root that received at least one sub-threshold amount,
/// in first-seen order, capped at 20.
fn dust_attacks(
    transactions: &[TxRecord],
    root: &str,
    exponent: u32,
    config: &ClusteringConfig,
) -> Vec<DustFinding> {
    let mut seen_order: Vec<String> = Vec::new();
    let mut has_dust: HashMap<String, bool> = HashMap::new();

    for tx in transactions {
        if tx.sender() != root {
            continue;
        }
        let recipient = tx.recipient();
        if recipient.is_empty() {
            continue;
        }
        let amount = units::to_human(&tx.value, exponent);
        let entry = has_dust.entry(recipient.clone()).or_insert_with(|| {
            seen_order.push(recipient.clone());
            false
        });
        if amount < config.dust_send_threshold {
            *entry = true;
        }
    }

    seen_order
        .into_iter()
        .filter(|recipient| has_dust[recipient])
        .take(20)
        .map(|address| DustFinding {
            address,
            pattern: "dust_attack".to_string(),
            risk_score: 0.7,
            is_suspicious: true,
        })
        .collect()
}

/// Greedy grouping of timestamp-sorted transactions: a transaction joins
/// the growing cluster while its gap to the previous one stays within the
/// window. Only clusters meeting the minimum size are reported.
fn timing_clusters(transactions: &[TxRecord], config: &ClusteringConfig) -> Vec<TimingFinding> {
    if transactions.is_empty() {
        return Vec::new();
    }

    let mut timestamps: Vec<i64> = transactions.iter().map(|tx| tx.timestamp()).collect();
    timestamps.sort();

    let mut clusters: Vec<(i64, i64, usize)> = Vec::new(); // (start, end, size)
    let mut start = timestamps[0];
    let mut prev = timestamps[0];
    let mut size = 1usize;

    for &ts in &timestamps[1..] {
        if ts - prev <= config.timing_gap_secs {
            size += 1;
        } else {
            clusters.push((start, prev, size));
            start = ts;
            size = 1;
        }
        prev = ts;
    }
    clusters.push((start, prev, size));

    clusters
        .into_iter()
        .filter(|&(_, _, size)| size >= config.timing_min_cluster)
        .map(|(first, last, size)| TimingFinding {
            cluster_size: size,
            time_range: format!("{} - {}", first, last),
            pattern: "timing_cluster".to_string(),
            risk_score: (0.5 + size as f64 * 0.05).min(0.95),
            is_suspicious: size > 10,
        })
        .collect()
}

/// Group transactions by normalized value rounded to 4 decimal places;
/// report any amount repeated in >=3 transactions toward >=3 distinct
/// recipients, in first-seen order, capped at 10.
fn amount_clusters(transactions: &[TxRecord], exponent: u32) -> Vec<AmountFinding> {
    // Keyed by the rounded amount's bit pattern so it can hash. Amounts
    // here are positive and finite, so equal values have equal bits.
    let mut seen_order: Vec<u64> = Vec::new();
    let mut groups: HashMap<u64, (f64, usize, HashSet<String>)> = HashMap::new();

    for tx in transactions {
        let amount = units::round_dp(units::to_human(&tx.value, exponent), 4);
        if amount <= 0.0 || !amount.is_finite() {
            continue;
        }
        let key = amount.to_bits();
        let entry = groups.entry(key).or_insert_with(|| {
            seen_order.push(key);
            (amount, 0, HashSet::new())
        });
        entry.1 += 1;
        let recipient = tx.recipient();
        if !recipient.is_empty() {
            entry.2.insert(recipient);
        }
    }

    seen_order
        .into_iter()
        .filter_map(|key| {
            let (amount, count, recipients) = &groups[&key];
            if *count >= 3 && recipients.len() >= 3 {
                Some(AmountFinding {
                    amount: *amount,
                    recipient_count: recipients.len(),
                    pattern: "amount_splitting".to_string(),
                    risk_score: 0.6,
                    is_suspicious: true,
                })
            } else {
                None
            }
        })
        .take(10)
        .collect()
}
