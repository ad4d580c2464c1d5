//! Exogenous signal normalization.
//!
//! The backend is inconsistent about signal naming: `usd_index` may
//! arrive as `usdIndex`, `dxy`, or only be recognizable from its label.
//! Resolution tries the exact alias set first, then falls back to
//! lowercased substring matching against the label. First match wins;
//! the whole lookup is pure and total.

use crate::types::ExogenousSignal;
use std::fmt;

/// Canonical exogenous signal categories expected by the bias combiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKey {
    UsdIndex,
    FedRates,
    Inflation,
}

impl SignalKey {
    pub const ALL: [SignalKey; 3] = [SignalKey::UsdIndex, SignalKey::FedRates, SignalKey::Inflation];

    /// Canonical name, as the backend is supposed to send it.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            SignalKey::UsdIndex => "usd_index",
            SignalKey::FedRates => "fed_rates",
            SignalKey::Inflation => "inflation",
        }
    }

    /// Accepted exact names, case-sensitive. Covers the snake_case and
    /// camelCase spellings seen from backend revisions.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            SignalKey::UsdIndex => &["usd_index", "usdIndex", "usd", "dxy", "usd_index_dxy"],
            SignalKey::FedRates => &["fed_rates", "fedRates", "fed", "taux_fed", "tauxFed", "rates"],
            SignalKey::Inflation => &["inflation", "cpi", "inflation_cpi", "inflationCpi"],
        }
    }

    /// Keywords matched against the lowercased label when no alias hits.
    fn label_hints(&self) -> &'static [&'static str] {
        match self {
            SignalKey::UsdIndex => &["usd", "dollar", "dxy"],
            SignalKey::FedRates => &["fed", "taux", "rates"],
            SignalKey::Inflation => &["inflation", "cpi"],
        }
    }
}

impl fmt::Display for SignalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

/// Find the signal for a canonical key, by alias first and then by label
/// keyword. Returns `None` when nothing matches.
pub fn resolve<'a>(signals: &'a [ExogenousSignal], key: SignalKey) -> Option<&'a ExogenousSignal> {
    let aliases = key.aliases();
    if let Some(signal) = signals.iter().find(|s| aliases.contains(&s.name.as_str())) {
        return Some(signal);
    }

    let hints = key.label_hints();
    signals.iter().find(|s| {
        let label = s.label.to_lowercase();
        hints.iter().any(|hint| label.contains(hint))
    })
}

/// Canonical keys that cannot be resolved from the given signal list.
/// Callers log these for diagnostics; a missing key scores neutral.
pub fn missing_keys(signals: &[ExogenousSignal]) -> Vec<SignalKey> {
    SignalKey::ALL
        .into_iter()
        .filter(|key| resolve(signals, *key).is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SignalImpact;

    fn signal(name: &str, label: &str) -> ExogenousSignal {
        ExogenousSignal {
            name: name.to_string(),
            label: label.to_string(),
            value: 0.0,
            unit: String::new(),
            impact: SignalImpact::Neutral,
            description: String::new(),
        }
    }

    #[test]
    fn test_resolves_canonical_names() {
        let signals = vec![
            signal("usd_index", "USD Index"),
            signal("fed_rates", "Fed Rates"),
            signal("inflation", "Inflation CPI"),
        ];
        for key in SignalKey::ALL {
            assert!(resolve(&signals, key).is_some(), "{} should resolve", key);
        }
        assert!(missing_keys(&signals).is_empty());
    }

    #[test]
    fn test_camel_case_and_dxy_aliases() {
        let signals = vec![signal("usdIndex", "")];
        assert_eq!(
            resolve(&signals, SignalKey::UsdIndex).unwrap().name,
            "usdIndex"
        );

        let signals = vec![signal("dxy", "")];
        assert_eq!(resolve(&signals, SignalKey::UsdIndex).unwrap().name, "dxy");
    }

    #[test]
    fn test_label_hint_fallback() {
        // Name matches nothing; the label keyword does.
        let signals = vec![signal("macro_7", "Dollar strength index")];
        assert_eq!(
            resolve(&signals, SignalKey::UsdIndex).unwrap().name,
            "macro_7"
        );
    }

    #[test]
    fn test_alias_wins_over_label() {
        let signals = vec![
            signal("wrong_label", "usd pressure"),
            signal("fedRates", "something else"),
        ];
        // fed_rates resolves by alias even though a label hint would have
        // matched a different entry first.
        assert_eq!(
            resolve(&signals, SignalKey::FedRates).unwrap().name,
            "fedRates"
        );
    }

    #[test]
    fn test_unknown_signal_is_missing() {
        let signals = vec![signal("gold_sentiment", "Gold sentiment")];
        let missing = missing_keys(&signals);
        assert_eq!(missing.len(), 3);
        assert!(missing.contains(&SignalKey::UsdIndex));
        assert!(missing.contains(&SignalKey::FedRates));
        assert!(missing.contains(&SignalKey::Inflation));
    }

    #[test]
    fn test_empty_list_all_missing() {
        assert_eq!(missing_keys(&[]).len(), 3);
    }

    #[test]
    fn test_aliases_are_case_sensitive() {
        // "USD_INDEX" is not an accepted alias; only the label fallback
        // can rescue it, and here the label gives no hint.
        let signals = vec![signal("USD_INDEX", "macro")];
        assert!(resolve(&signals, SignalKey::UsdIndex).is_none());
    }
}
