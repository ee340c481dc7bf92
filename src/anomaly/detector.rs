use serde::Serialize;

use crate::config::AnomalyConfig;
use crate::model::TxRecord;

use super::features;
use super::forest::IsolationForest;

/// A transaction flagged by the outlier ensemble, with explanation tags.
#[derive(Debug, Clone, Serialize)]
pub struct AnomalyRecord {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub timestamp: i64,
    pub anomaly_score: f64,
    pub reasons: Vec<String>,
    pub is_suspicious: bool,
}

/// Run isolation-forest outlier detection over a transaction batch.
/// Batches below the configured floor return no anomalies; callers treat
/// that the same as "nothing found".
pub fn detect_anomalies(
    transactions: &[TxRecord],
    exponent: u32,
    config: &AnomalyConfig,
) -> Vec<AnomalyRecord> {
    if !config.enabled || transactions.len() < config.min_transactions {
        return Vec::new();
    }

    let matrix = features::extract_features(transactions, exponent);
    let scaled = features::standardize(&matrix);

    let forest = IsolationForest::fit(&scaled, config.tree_count, config.sample_size, config.seed);
    let scores = forest.score_samples(&scaled);

    // The lowest `contamination` fraction of scores is flagged, matching
    // the percentile-offset convention of the reference estimator.
    let threshold = features::percentile(&scores, 100.0 * config.contamination);

    let amounts: Vec<f64> = matrix.iter().map(|row| row[0]).collect();
    let gas_prices: Vec<f64> = matrix.iter().map(|row| row[1]).collect();
    let amount_p90 = features::percentile(&amounts, 90.0);
    let amount_p10 = features::percentile(&amounts, 10.0);
    let gas_p95 = features::percentile(&gas_prices, 95.0);

    let mut anomalies: Vec<AnomalyRecord> = Vec::new();
    for (index, (&score, tx)) in scores.iter().zip(transactions).enumerate() {
        if score >= threshold {
            continue;
        }
        let amount = amounts[index];
        let gas_price = gas_prices[index];

        let mut reasons = Vec::new();
        if amount > amount_p90 {
            reasons.push("unusual_amount_high".to_string());
        }
        if amount > 0.0 && amount < amount_p10 {
            reasons.push("unusual_amount_low".to_string());
        }
        if gas_price > gas_p95 {
            reasons.push("unusually_high_gas".to_string());
        }

        let anomaly_score = 1.0 - (score + 1.0) / 2.0;
        anomalies.push(AnomalyRecord {
            hash: tx.hash.clone(),
            from: tx.sender(),
            to: tx.recipient(),
            amount,
            timestamp: tx.timestamp(),
            anomaly_score,
            reasons,
            is_suspicious: anomaly_score > 0.7,
        });
    }

    anomalies.sort_by(|a, b| {
        b.anomaly_score
            .partial_cmp(&a.anomaly_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if !anomalies.is_empty() {
        tracing::debug!(
            flagged = anomalies.len(),
            batch = transactions.len(),
            "Anomaly detection flagged transactions"
        );
    }

    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::transaction::tx;

    fn uniform_batch(count: usize) -> Vec<TxRecord> {
        (0..count)
            .map(|i| {
                let mut record = tx(
                    &format!("0xsender{}", i % 5),
                    "0xroot",
                    "1000000000000000000",
                    1_700_000_000 + (i as i64) * 600,
                );
                record.gas_price = serde_json::json!("20000000000");
                record
            })
            .collect()
    }

    #[test]
    fn test_below_floor_returns_empty() {
        let txs = uniform_batch(9);
        let anomalies = detect_anomalies(&txs, 18, &AnomalyConfig::default());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_disabled_returns_empty() {
        let txs = uniform_batch(50);
        let config = AnomalyConfig {
            enabled: false,
            ..AnomalyConfig::default()
        };
        assert!(detect_anomalies(&txs, 18, &config).is_empty());
    }

    #[test]
    fn test_extreme_amount_flagged_high() {
        let mut txs = uniform_batch(49);
        // One transfer 100x the rest.
        txs.push(tx("0xwhale", "0xroot", "100000000000000000000", 1_700_050_000));
        let anomalies = detect_anomalies(&txs, 18, &AnomalyConfig::default());
        assert!(!anomalies.is_empty());
        let whale = anomalies
            .iter()
            .find(|a| a.from == "0xwhale")
            .expect("outlier transfer should be flagged");
        assert!(whale.reasons.contains(&"unusual_amount_high".to_string()));
        assert!(whale.amount == 100.0);
    }

    #[test]
    fn test_scores_bounded_and_sorted() {
        let mut txs = uniform_batch(49);
        txs.push(tx("0xwhale", "0xroot", "100000000000000000000", 1_700_050_000));
        let anomalies = detect_anomalies(&txs, 18, &AnomalyConfig::default());
        for window in anomalies.windows(2) {
            assert!(window[0].anomaly_score >= window[1].anomaly_score);
        }
        for record in &anomalies {
            assert!(record.anomaly_score >= 0.0 && record.anomaly_score <= 1.0);
        }
    }

    #[test]
    fn test_deterministic_across_runs() {
        let mut txs = uniform_batch(49);
        txs.push(tx("0xwhale", "0xroot", "100000000000000000000", 1_700_050_000));
        let config = AnomalyConfig::default();
        let first = detect_anomalies(&txs, 18, &config);
        let second = detect_anomalies(&txs, 18, &config);
        let scores_a: Vec<f64> = first.iter().map(|a| a.anomaly_score).collect();
        let scores_b: Vec<f64> = second.iter().map(|a| a.anomaly_score).collect();
        assert_eq!(scores_a, scores_b);
    }

    #[test]
    fn test_contamination_bounds_flag_count() {
        let txs = uniform_batch(100);
        let anomalies = detect_anomalies(&txs, 18, &AnomalyConfig::default());
        // Strictly-below-percentile flagging keeps the flagged share at or
        // under the contamination fraction.
        assert!(anomalies.len() <= 10);
    }
}
