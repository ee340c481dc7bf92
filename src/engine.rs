use std::collections::HashSet;

use crate::anomaly;
use crate::cluster::{self, ClusterReport};
use crate::config::{AnalysisConfig, Config};
use crate::entity::{infer_entity, EntityDirectory, InMemoryDirectory};
use crate::graph::{find_circular_patterns, trace_taint, AddressGraph, FlowGraph};
use crate::model::{ForensicSummary, RankedCounterparty, TimeWindow, TxRecord};
use crate::patterns;
use crate::units;

/// The forensic analysis engine: pure, synchronous computation over one
/// transaction batch. Every call builds its own graphs and feature
/// structures, so independent analyses can run concurrently without
/// shared state.
pub struct ForensicEngine {
    config: AnalysisConfig,
    directory: Box<dyn EntityDirectory + Send + Sync>,
}

impl ForensicEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            directory: Box::new(InMemoryDirectory::new()),
        }
    }

    pub fn with_directory(
        config: AnalysisConfig,
        directory: Box<dyn EntityDirectory + Send + Sync>,
    ) -> Self {
        Self { config, directory }
    }

    /// Build an engine from a full config: seeds the entity directory from
    /// the CSV watchlist (if any) and manual labels.
    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        let mut directory = InMemoryDirectory::new();
        if let Some(path) = &config.entity_directory.watchlist_path {
            match directory.load_csv(path) {
                Ok(count) => tracing::info!(count, "Watchlist loaded"),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load watchlist, continuing without")
                }
            }
        }
        directory.seed_labels(&config.entity_directory.labels);

        Ok(Self::with_directory(
            config.analysis.clone(),
            Box::new(directory),
        ))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a transaction batch relative to a root address, optionally
    /// restricted to an inclusive timestamp window. Always returns a
    /// well-formed summary; malformed records degrade to neutral values
    /// and sub-analyses with insufficient data come back empty.
    pub fn analyze(
        &self,
        transactions: &[TxRecord],
        root_address: &str,
        window: Option<&TimeWindow>,
    ) -> ForensicSummary {
        let root = root_address.trim().to_lowercase();
        let exponent = self.config.denomination_exponent;

        let filtered: Vec<TxRecord> = transactions
            .iter()
            .filter(|tx| window.map_or(true, |w| w.contains(tx.timestamp())))
            .cloned()
            .collect();

        let mut total_in = 0.0;
        let mut total_out = 0.0;
        let mut values: Vec<f64> = Vec::with_capacity(filtered.len());
        let mut senders: HashSet<String> = HashSet::new();
        let mut receivers: HashSet<String> = HashSet::new();
        let mut cash_out_points: Vec<String> = Vec::new();

        for tx in &filtered {
            let value = units::to_human(&tx.value, exponent);
            values.push(value);

            let from = tx.sender();
            let to = tx.recipient();
            if !from.is_empty() {
                senders.insert(from.clone());
            }
            if !to.is_empty() {
                receivers.insert(to.clone());
            }

            if to == root {
                total_in += value;
            } else if from == root {
                total_out += value;
                if let Some(label) = self.directory.lookup(&to) {
                    cash_out_points.push(format!("{:.2} -> {}", value, label.entity_name));
                }
            }
        }

        let graph = AddressGraph::build(&filtered);
        let flow = FlowGraph::build(&filtered, exponent);

        let detected = patterns::detect_patterns(&filtered, &root, exponent, &self.config.patterns);
        let risk = patterns::RiskAssessment::evaluate(
            &detected,
            filtered.len(),
            senders.len(),
            receivers.len(),
        );

        let findings = cluster::cluster_counterparties(
            &filtered,
            &graph,
            &root,
            exponent,
            &self.config.clustering,
        );
        let clusters = ClusterReport {
            suspicious_counterparties: findings.suspicious_counterparties,
            mixer_outputs: Vec::new(),
            dust_attacks: findings.dust_attacks,
            circular_patterns: find_circular_patterns(&graph, &root, &self.config.circular),
            timing_clusters: findings.timing_clusters,
            amount_clusters: findings.amount_clusters,
        };

        let anomalies = anomaly::detect_anomalies(&filtered, exponent, &self.config.anomaly);
        let taint = trace_taint(&flow, &root, self.directory.as_ref(), &self.config.taint);
        let entity_info = infer_entity(&root, &filtered, self.directory.as_ref());

        let avg = if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        };
        let median = if values.is_empty() {
            0.0
        } else {
            // Upper median over the sorted values.
            let mut sorted = values.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            sorted[sorted.len() / 2]
        };
        let max = values.iter().cloned().fold(0.0, f64::max);

        let top_victims = ranked(flow.top_senders(&root, 5));
        let top_suspects = ranked(flow.top_recipients(&root, 5));

        let summary = ForensicSummary {
            root_address: root,
            total_transactions: filtered.len(),
            total_volume_in: units::round_dp(total_in, 4),
            total_volume_out: units::round_dp(total_out, 4),
            net_flow: units::round_dp(total_in - total_out, 4),
            unique_senders: senders.len(),
            unique_receivers: receivers.len(),
            avg_transaction_value: units::round_dp(avg, 4),
            median_transaction_value: units::round_dp(median, 4),
            max_transaction_value: units::round_dp(max, 4),
            top_victims,
            top_suspects,
            cash_out_points,
            patterns: detected,
            risk_score: risk.score,
            risk_factors: risk.factors,
            confidence_score: risk.confidence,
            entity_info,
            clusters,
            anomalies,
            taint,
        };

        tracing::info!(
            root = %summary.root_address,
            transactions = summary.total_transactions,
            risk_score = summary.risk_score,
            confidence = summary.confidence_score,
            anomalies = summary.anomalies.len(),
            "Analysis complete"
        );

        summary
    }
}

fn ranked(entries: Vec<(String, f64)>) -> Vec<RankedCounterparty> {
    entries
        .into_iter()
        .map(|(address, total_amount)| RankedCounterparty {
            address,
            total_amount: units::round_dp(total_amount, 4),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntityLabelConfig;
    use crate::model::transaction::tx;

    fn engine() -> ForensicEngine {
        ForensicEngine::new(AnalysisConfig::default())
    }

    #[test]
    fn test_empty_input_yields_neutral_summary() {
        let summary = engine().analyze(&[], "0xroot", None);
        assert_eq!(summary.total_transactions, 0);
        assert_eq!(summary.risk_score, 0);
        assert_eq!(summary.total_volume_in, 0.0);
        assert_eq!(summary.net_flow, 0.0);
        assert!(!summary.patterns.rapid_succession);
        assert!(summary.patterns.round_amounts.is_empty());
        assert!(summary.clusters.circular_patterns.is_empty());
        assert!(summary.anomalies.is_empty());
        assert!(summary.top_victims.is_empty());
    }

    #[test]
    fn test_volume_and_statistics() {
        let txs = vec![
            tx("0xa", "0xroot", "2000000000000000000", 0), // in 2.0
            tx("0xb", "0xroot", "1000000000000000000", 10), // in 1.0
            tx("0xroot", "0xc", "500000000000000000", 20), // out 0.5
        ];
        let summary = engine().analyze(&txs, "0xROOT", None);
        assert_eq!(summary.total_volume_in, 3.0);
        assert_eq!(summary.total_volume_out, 0.5);
        assert_eq!(summary.net_flow, 2.5);
        assert_eq!(summary.unique_senders, 3);
        assert_eq!(summary.unique_receivers, 2);
        assert_eq!(summary.max_transaction_value, 2.0);
        assert_eq!(summary.median_transaction_value, 1.0);
        assert_eq!(summary.top_victims[0].address, "0xa");
        assert_eq!(summary.top_suspects[0].address, "0xc");
    }

    #[test]
    fn test_time_window_filters_batch() {
        let txs = vec![
            tx("0xa", "0xroot", "1000000000000000000", 100),
            tx("0xa", "0xroot", "1000000000000000000", 200),
            tx("0xa", "0xroot", "1000000000000000000", 900),
        ];
        let window = TimeWindow {
            start_ts: 0,
            end_ts: 500,
        };
        let summary = engine().analyze(&txs, "0xroot", Some(&window));
        assert_eq!(summary.total_transactions, 2);
        assert_eq!(summary.total_volume_in, 2.0);
    }

    #[test]
    fn test_alternating_sixty_transactions_scenario() {
        // 60 transactions alternating in/out, 60s apart, 1.0 each:
        // high-frequency fires, rapid succession does not (deltas == 60s).
        let txs: Vec<TxRecord> = (0..60)
            .map(|i| {
                if i % 2 == 0 {
                    tx("0xpeer", "0xroot", "1000000000000000000", i * 60)
                } else {
                    tx("0xroot", "0xpeer", "1000000000000000000", i * 60)
                }
            })
            .collect();
        let summary = engine().analyze(&txs, "0xroot", None);
        assert!(summary.patterns.high_frequency_wallet);
        assert!(!summary.patterns.rapid_succession);
        assert!(summary
            .risk_factors
            .contains(&"High frequency transaction wallet".to_string()));
    }

    #[test]
    fn test_score_bounds_on_hostile_batch() {
        // Dense dust + round amounts + many senders to push every pattern.
        let mut txs: Vec<TxRecord> = (0..60)
            .map(|i| tx(&format!("0xin{}", i), "0xroot", "1000000000000000000", i))
            .collect();
        txs.extend((0..8).map(|i| tx("0xroot", "0xout", "1000000000000000", 100 + i)));
        let summary = engine().analyze(&txs, "0xroot", None);
        assert!(summary.risk_score <= 100);
        assert!(summary.confidence_score <= 100);
    }

    #[test]
    fn test_determinism_across_calls() {
        let mut txs: Vec<TxRecord> = (0..49)
            .map(|i| {
                tx(
                    &format!("0xin{}", i % 7),
                    "0xroot",
                    "1000000000000000000",
                    1_700_000_000 + i * 120,
                )
            })
            .collect();
        txs.push(tx("0xroot", "0xwhale", "250000000000000000000", 1_700_010_000));

        let engine = engine();
        let first = engine.analyze(&txs, "0xroot", None);
        let second = engine.analyze(&txs, "0xroot", None);

        assert_eq!(first.risk_score, second.risk_score);
        assert_eq!(first.patterns, second.patterns);
        assert_eq!(
            serde_json::to_string(&first.clusters).unwrap(),
            serde_json::to_string(&second.clusters).unwrap()
        );
        let scores_a: Vec<f64> = first.anomalies.iter().map(|a| a.anomaly_score).collect();
        let scores_b: Vec<f64> = second.anomalies.iter().map(|a| a.anomaly_score).collect();
        assert_eq!(scores_a, scores_b);
    }

    #[test]
    fn test_cash_out_points_use_directory() {
        let config = Config {
            entity_directory: crate::config::EntityDirectoryConfig {
                watchlist_path: None,
                labels: vec![EntityLabelConfig {
                    address: "0xCEX".to_string(),
                    entity_name: "Binance Hot Wallet".to_string(),
                    entity_type: "exchange".to_string(),
                    risk_tier: "low".to_string(),
                }],
            },
            ..Config::default()
        };
        let engine = ForensicEngine::from_config(&config).unwrap();
        let txs = vec![tx("0xroot", "0xcex", "1500000000000000000", 0)];
        let summary = engine.analyze(&txs, "0xroot", None);
        assert_eq!(summary.cash_out_points, vec!["1.50 -> Binance Hot Wallet"]);
        assert_eq!(summary.taint.exchange_deposits.len(), 1);
    }

    #[test]
    fn test_circular_findings_merged_into_report() {
        let txs = vec![
            tx("0xroot", "0xb", "1000000000000000000", 0),
            tx("0xb", "0xc", "1000000000000000000", 1),
            tx("0xc", "0xroot", "1000000000000000000", 2),
        ];
        let summary = engine().analyze(&txs, "0xroot", None);
        assert!(!summary.clusters.circular_patterns.is_empty());
        assert!(summary.clusters.mixer_outputs.is_empty());
    }

    #[test]
    fn test_malformed_records_do_not_panic() {
        let garbage: Vec<TxRecord> = vec![
            serde_json::from_str("{}").unwrap(),
            serde_json::from_str(r#"{"value": "garbage", "timeStamp": "also-garbage"}"#).unwrap(),
            serde_json::from_str(r#"{"from": "0xa", "to": "0xroot", "value": {"odd": 1}}"#)
                .unwrap(),
        ];
        let summary = engine().analyze(&garbage, "0xroot", None);
        assert_eq!(summary.total_transactions, 3);
        assert_eq!(summary.total_volume_in, 0.0);
        assert_eq!(summary.max_transaction_value, 0.0);
    }
}
