use super::detector::PatternSet;

/// Capped additive risk score with the factors that produced it, plus a
/// data-sufficiency confidence indicator. Derived purely from the detected
/// patterns and aggregate counts.
#[derive(Debug, Clone, Default)]
pub struct RiskAssessment {
    pub score: u8,
    pub factors: Vec<String>,
    pub confidence: u8,
}

impl RiskAssessment {
    pub fn evaluate(
        patterns: &PatternSet,
        total_transactions: usize,
        unique_senders: usize,
        unique_receivers: usize,
    ) -> Self {
        let (score, factors) = score_risk(patterns, total_transactions);
        let confidence =
            confidence_score(total_transactions, unique_senders, unique_receivers, patterns);
        Self {
            score,
            factors,
            confidence,
        }
    }
}

/// Map detected patterns to a 0-100 risk score. Each condition contributes
/// independently; factor order follows the contribution table.
pub fn score_risk(patterns: &PatternSet, total_transactions: usize) -> (u8, Vec<String>) {
    let mut score: u32 = 0;
    let mut factors = Vec::new();

    if patterns.rapid_succession {
        score += 20;
        factors.push("Rapid succession of transactions".to_string());
    }
    if patterns.high_frequency_wallet {
        score += 15;
        factors.push("High frequency transaction wallet".to_string());
    }
    if patterns.mixing_service_suspicion {
        score += 25;
        factors.push("Possible mixing service behavior".to_string());
    }
    if patterns.consolidation_pattern {
        score += 20;
        factors.push("Consolidation pattern detected".to_string());
    }
    if patterns.layering_pattern {
        score += 18;
        factors.push("Layering pattern detected (AML concern)".to_string());
    }
    if patterns.dust_transactions.len() > 5 {
        score += 15;
        factors.push("Multiple dust transactions (potential obfuscation)".to_string());
    }
    if total_transactions > 0
        && patterns.round_amounts.len() as f64 > total_transactions as f64 * 0.3
    {
        score += 10;
        factors.push("High proportion of round amount transactions".to_string());
    }

    (score.min(100) as u8, factors)
}

/// Confidence that the assessment rests on enough data: more transactions,
/// more distinct counterparties and more corroborating patterns all raise
/// it. Informational only, independent of the risk score's magnitude.
pub fn confidence_score(
    total_transactions: usize,
    unique_senders: usize,
    unique_receivers: usize,
    patterns: &PatternSet,
) -> u8 {
    let mut confidence: u32 = 50;

    if total_transactions > 100 {
        confidence += 20;
    } else if total_transactions > 50 {
        confidence += 10;
    }

    let unique_parties = unique_senders + unique_receivers;
    if unique_parties > 30 {
        confidence += 15;
    } else if unique_parties > 15 {
        confidence += 8;
    }

    confidence += (patterns.flag_count() as u32 * 3).min(20);

    confidence.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_patterns_zero_score() {
        let (score, factors) = score_risk(&PatternSet::default(), 0);
        assert_eq!(score, 0);
        assert!(factors.is_empty());
    }

    #[test]
    fn test_factor_order_follows_table() {
        let patterns = PatternSet {
            rapid_succession: true,
            mixing_service_suspicion: true,
            layering_pattern: true,
            ..PatternSet::default()
        };
        let (score, factors) = score_risk(&patterns, 10);
        assert_eq!(score, 20 + 25 + 18);
        assert_eq!(
            factors,
            vec![
                "Rapid succession of transactions",
                "Possible mixing service behavior",
                "Layering pattern detected (AML concern)",
            ]
        );
    }

    #[test]
    fn test_score_caps_at_100() {
        let patterns = PatternSet {
            rapid_succession: true,
            high_frequency_wallet: true,
            mixing_service_suspicion: true,
            consolidation_pattern: true,
            layering_pattern: true,
            round_amounts: vec![1.0; 10],
            dust_transactions: vec![0.001; 6],
        };
        // Uncapped sum would be 123.
        let (score, factors) = score_risk(&patterns, 10);
        assert_eq!(score, 100);
        assert_eq!(factors.len(), 7);
    }

    #[test]
    fn test_adding_patterns_never_lowers_score() {
        let base = PatternSet {
            mixing_service_suspicion: true,
            ..PatternSet::default()
        };
        let (base_score, _) = score_risk(&base, 10);

        let more = PatternSet {
            mixing_service_suspicion: true,
            consolidation_pattern: true,
            ..PatternSet::default()
        };
        let (more_score, _) = score_risk(&more, 10);
        assert!(more_score >= base_score);
        assert!(more_score <= 100);
    }

    #[test]
    fn test_round_amount_factor_needs_transactions() {
        let patterns = PatternSet {
            round_amounts: vec![1.0, 2.0],
            ..PatternSet::default()
        };
        let (score, _) = score_risk(&patterns, 0);
        assert_eq!(score, 0);

        let (score, factors) = score_risk(&patterns, 5);
        assert_eq!(score, 10); // 2 > 5 * 0.3
        assert_eq!(factors[0], "High proportion of round amount transactions");
    }

    #[test]
    fn test_confidence_base_and_caps() {
        assert_eq!(confidence_score(0, 0, 0, &PatternSet::default()), 50);

        let all_flags = PatternSet {
            rapid_succession: true,
            high_frequency_wallet: true,
            mixing_service_suspicion: true,
            consolidation_pattern: true,
            layering_pattern: true,
            ..PatternSet::default()
        };
        // 50 + 20 + 15 + 15 = 100, capped
        assert_eq!(confidence_score(200, 20, 20, &all_flags), 100);
    }

    #[test]
    fn test_confidence_tiers() {
        let patterns = PatternSet::default();
        assert_eq!(confidence_score(60, 5, 5, &patterns), 60); // +10 txs
        assert_eq!(confidence_score(150, 5, 5, &patterns), 70); // +20 txs
        assert_eq!(confidence_score(150, 10, 10, &patterns), 78); // +8 parties
        assert_eq!(confidence_score(150, 20, 20, &patterns), 85); // +15 parties
    }
}
