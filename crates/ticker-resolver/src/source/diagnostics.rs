//! Refresh diagnostics: which providers were tried and what they returned.

use chrono::{DateTime, Utc};

use crate::models::{Market, ProviderId};

/// Record of a single provider attempt during a refresh.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub universe: Market,
    /// Valid rows the provider produced.
    pub rows: usize,
    pub error: Option<String>,
    pub success: bool,
}

/// Detailed result of one refresh.
#[derive(Clone, Debug)]
pub struct RefreshReport {
    pub started_at: DateTime<Utc>,
    pub attempts: Vec<ProviderAttempt>,
}

impl RefreshReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            attempts: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, attempt: ProviderAttempt) {
        self.attempts.push(attempt);
    }

    /// Rows contributed by the successful provider of `universe`.
    pub fn rows_for(&self, universe: Market) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.universe == universe && a.success)
            .map(|a| a.rows)
            .sum()
    }

    /// The provider that supplied `universe`, if any did.
    pub fn provider_for(&self, universe: Market) -> Option<&ProviderId> {
        self.attempts
            .iter()
            .find(|a| a.universe == universe && a.success)
            .map(|a| &a.provider_id)
    }

    pub fn failed_attempts(&self) -> impl Iterator<Item = &ProviderAttempt> {
        self.attempts.iter().filter(|a| !a.success)
    }
}
