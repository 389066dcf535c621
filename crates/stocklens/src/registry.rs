//! Registry mapping human-readable metric names to provider field identifiers
//!
//! Metric names are normalized (lowercased, trimmed) so lookups are
//! case-insensitive. Registration is first-wins: a name that is already
//! mapped keeps its original field.

use std::collections::HashMap;

/// Display names for the built-in fundamental metrics
pub mod names {
    /// Total revenues from sales and services
    pub const TOTAL_REVENUES: &str = "total revenues";
    /// Cash generated by operating activities
    pub const OPERATING_CASH_FLOW: &str = "operating cash flow";
    /// Bottom-line net income
    pub const NET_INCOME: &str = "net income";
    /// Diluted earnings per share
    pub const EARNINGS_PER_SHARE: &str = "earnings per share";
    /// Operating margin (%)
    pub const OPERATING_MARGIN: &str = "operating margin";
    /// Capital expenditures
    pub const CAPITAL_EXPENDITURES: &str = "capital expenditures";
    /// Return on invested capital (%)
    pub const RETURN_ON_INVESTED_CAPITAL: &str = "return on invested capital";
    /// Weighted average diluted share count
    pub const DILUTED_AVG_SHARES: &str = "diluted weighted avg shares";
}

/// Provider field identifiers for the built-in metrics
pub mod fields {
    pub const TOTAL_REVENUES: &str = "is_sales_and_services_revenues";
    pub const OPERATING_CASH_FLOW: &str = "cf_cash_from_oper";
    pub const NET_INCOME: &str = "is_net_income";
    pub const EARNINGS_PER_SHARE: &str = "eps";
    pub const OPERATING_MARGIN: &str = "oper_margin";
    pub const CAPITAL_EXPENDITURES: &str = "cf_cap_expenditures";
    pub const RETURN_ON_INVESTED_CAPITAL: &str = "return_on_inv_capital";
    pub const DILUTED_AVG_SHARES: &str = "is_sh_for_diluted_eps";
}

/// Normalize a metric name for registry keys and table row labels
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Metric name to provider field registry
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    metrics: HashMap<String, String>,
}

impl MetricRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            metrics: HashMap::new(),
        }
    }

    /// Create a registry seeded with the built-in metrics
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for (name, field) in BUILTIN_METRICS {
            registry.register(name, field);
        }
        registry
    }

    /// Register a metric name for a provider field
    ///
    /// Returns `true` if the name was added, `false` if it was already
    /// registered (the existing mapping is kept unchanged).
    pub fn register(&mut self, name: &str, field: &str) -> bool {
        let key = normalize_name(name);
        if self.metrics.contains_key(&key) {
            tracing::warn!("Metric '{}' already registered, keeping existing field", key);
            return false;
        }
        self.metrics.insert(key, field.trim().to_string());
        true
    }

    /// Look up the provider field for a metric name (case-insensitive)
    pub fn field(&self, name: &str) -> Option<&str> {
        self.metrics.get(&normalize_name(name)).map(String::as_str)
    }

    /// Whether a metric name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(&normalize_name(name))
    }

    /// Registered metric names in alphabetical order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.metrics.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered metrics
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether the registry has no metrics
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in metric name/field pairs
const BUILTIN_METRICS: [(&str, &str); 8] = [
    (names::TOTAL_REVENUES, fields::TOTAL_REVENUES),
    (names::OPERATING_CASH_FLOW, fields::OPERATING_CASH_FLOW),
    (names::NET_INCOME, fields::NET_INCOME),
    (names::EARNINGS_PER_SHARE, fields::EARNINGS_PER_SHARE),
    (names::OPERATING_MARGIN, fields::OPERATING_MARGIN),
    (names::CAPITAL_EXPENDITURES, fields::CAPITAL_EXPENDITURES),
    (names::RETURN_ON_INVESTED_CAPITAL, fields::RETURN_ON_INVESTED_CAPITAL),
    (names::DILUTED_AVG_SHARES, fields::DILUTED_AVG_SHARES),
];
