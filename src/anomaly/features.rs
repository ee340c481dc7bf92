use crate::model::TxRecord;
use crate::units;

pub const FEATURE_DIM: usize = 5;

/// Per-transaction feature vector, fixed order:
/// [normalized_value, gas_price, is_contract_flag, hour_of_day, day_of_week].
/// The contract flag is derived from the error-indicator field; that is a
/// proxy signal kept for compatibility, not true contract detection.
pub fn extract_features(transactions: &[TxRecord], exponent: u32) -> Vec<[f64; FEATURE_DIM]> {
    transactions
        .iter()
        .map(|tx| {
            let timestamp = tx.timestamp();
            [
                units::to_human(&tx.value, exponent),
                tx.gas_price_raw(),
                if tx.succeeded() { 1.0 } else { 0.0 },
                ((timestamp.rem_euclid(86_400)) / 3_600) as f64,
                ((timestamp / 86_400).rem_euclid(7)) as f64,
            ]
        })
        .collect()
}

/// Column-wise standardization to zero mean and unit variance, using
/// population statistics over the batch. Constant columns stay at zero.
pub fn standardize(matrix: &[[f64; FEATURE_DIM]]) -> Vec<[f64; FEATURE_DIM]> {
    if matrix.is_empty() {
        return Vec::new();
    }
    let n = matrix.len() as f64;

    let mut means = [0.0; FEATURE_DIM];
    for row in matrix {
        for (mean, value) in means.iter_mut().zip(row) {
            *mean += value;
        }
    }
    for mean in &mut means {
        *mean /= n;
    }

    let mut stds = [0.0; FEATURE_DIM];
    for row in matrix {
        for ((std, value), mean) in stds.iter_mut().zip(row).zip(&means) {
            *std += (value - mean).powi(2);
        }
    }
    for std in &mut stds {
        *std = (*std / n).sqrt();
        if *std == 0.0 {
            *std = 1.0;
        }
    }

    matrix
        .iter()
        .map(|row| {
            let mut scaled = [0.0; FEATURE_DIM];
            for i in 0..FEATURE_DIM {
                scaled[i] = (row[i] - means[i]) / stds[i];
            }
            scaled
        })
        .collect()
}

/// Linear-interpolated percentile (the numpy default). `p` in 0..=100.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let fraction = rank - lower as f64;
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::transaction::tx;

    #[test]
    fn test_feature_vector_shape_and_order() {
        let mut record = tx("0xa", "0xb", "2000000000000000000", 90_000);
        record.gas_price = serde_json::json!("30");
        let features = extract_features(&[record], 18);
        // 90000s = day 1, 01:00 UTC
        assert_eq!(features[0], [2.0, 30.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_failed_tx_clears_contract_flag() {
        let mut record = tx("0xa", "0xb", "1", 0);
        record.is_error = serde_json::json!("1");
        let features = extract_features(&[record], 18);
        assert_eq!(features[0][2], 0.0);
    }

    #[test]
    fn test_standardize_zero_mean() {
        let matrix = vec![
            [1.0, 10.0, 1.0, 0.0, 0.0],
            [3.0, 20.0, 1.0, 0.0, 0.0],
            [5.0, 30.0, 1.0, 0.0, 0.0],
        ];
        let scaled = standardize(&matrix);
        for column in 0..FEATURE_DIM {
            let sum: f64 = scaled.iter().map(|row| row[column]).sum();
            assert!(sum.abs() < 1e-9);
        }
        // Constant columns must not produce NaN.
        assert!(scaled.iter().all(|row| row.iter().all(|v| v.is_finite())));
    }

    #[test]
    fn test_percentile_interpolation() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 4.0);
        assert_eq!(percentile(&values, 50.0), 2.5);
        assert_eq!(percentile(&values, 25.0), 1.75);
    }

    #[test]
    fn test_percentile_unsorted_input() {
        let values = vec![9.0, 1.0, 5.0];
        assert_eq!(percentile(&values, 50.0), 5.0);
    }
}
