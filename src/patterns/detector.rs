use serde::Serialize;
use std::collections::HashSet;

use crate::config::PatternConfig;
use crate::model::TxRecord;
use crate::units;

/// Behavioral signatures detected over one transaction batch.
/// Created fresh per analysis, never merged across calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternSet {
    pub rapid_succession: bool,
    pub high_frequency_wallet: bool,
    pub mixing_service_suspicion: bool,
    pub consolidation_pattern: bool,
    pub layering_pattern: bool,
    pub round_amounts: Vec<f64>,
    pub dust_transactions: Vec<f64>,
}

impl PatternSet {
    /// Number of boolean flags currently set.
    pub fn flag_count(&self) -> usize {
        [
            self.rapid_succession,
            self.high_frequency_wallet,
            self.mixing_service_suspicion,
            self.consolidation_pattern,
            self.layering_pattern,
        ]
        .iter()
        .filter(|&&flag| flag)
        .count()
    }
}

/// Scan a transaction batch for suspicious behavioral signatures relative to
/// a focal root address. Address comparison is case-insensitive; malformed
/// values count as zero and fall out of every check.
pub fn detect_patterns(
    transactions: &[TxRecord],
    root_address: &str,
    exponent: u32,
    config: &PatternConfig,
) -> PatternSet {
    let mut patterns = PatternSet::default();
    if transactions.is_empty() {
        return patterns;
    }

    let root = root_address.trim().to_lowercase();

    // Rapid succession: fraction of short consecutive gaps over the
    // timestamp-sorted batch. Needs at least two deltas to be meaningful.
    let mut timestamps: Vec<i64> = transactions.iter().map(|tx| tx.timestamp()).collect();
    timestamps.sort();
    if timestamps.len() > 2 {
        let deltas: Vec<i64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
        let rapid = deltas
            .iter()
            .filter(|&&d| d > 0 && d < config.rapid_window_secs)
            .count();
        if rapid as f64 > deltas.len() as f64 * config.rapid_fraction {
            patterns.rapid_succession = true;
        }
    }

    for tx in transactions {
        let value = units::to_human(&tx.value, exponent);
        if value > 0.0 && value == value.floor() {
            patterns.round_amounts.push(value);
        }
        if value > 0.0 && value < config.dust_threshold {
            patterns.dust_transactions.push(units::round_dp(value, 6));
        }
    }

    patterns.high_frequency_wallet = transactions.len() > config.high_frequency_min;

    let incoming = transactions
        .iter()
        .filter(|tx| tx.recipient() == root)
        .count();
    let outgoing = transactions.iter().filter(|tx| tx.sender() == root).count();
    patterns.mixing_service_suspicion = incoming > outgoing * 2;

    // Consolidation: many small inbound transfers swept into one large
    // outbound transfer. Skipped when either side is empty.
    let input_amounts: Vec<f64> = transactions
        .iter()
        .filter(|tx| tx.recipient() == root)
        .map(|tx| units::to_human(&tx.value, exponent))
        .collect();
    let output_amounts: Vec<f64> = transactions
        .iter()
        .filter(|tx| tx.sender() == root)
        .map(|tx| units::to_human(&tx.value, exponent))
        .collect();
    if !input_amounts.is_empty() && !output_amounts.is_empty() {
        let avg_input = input_amounts.iter().sum::<f64>() / input_amounts.len() as f64;
        let max_output = output_amounts.iter().cloned().fold(f64::MIN, f64::max);
        if avg_input > 0.0 && max_output > avg_input * 10.0 {
            patterns.consolidation_pattern = true;
        }
    }

    if transactions.len() > config.layering_min {
        let senders: HashSet<String> = transactions
            .iter()
            .map(|tx| tx.sender())
            .filter(|a| !a.is_empty())
            .collect();
        let receivers: HashSet<String> = transactions
            .iter()
            .map(|tx| tx.recipient())
            .filter(|a| !a.is_empty())
            .collect();
        patterns.layering_pattern = senders.len() > receivers.len();
    }

    patterns
}
