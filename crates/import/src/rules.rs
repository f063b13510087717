use conciliar_core::{FilterConfig, Transaction};
use regex::{Regex, RegexBuilder};

use crate::util::fold_accents;

/// Result of running the exclusion filter over a run's transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub kept: Vec<Transaction>,
    pub dropped: usize,
}

/// Drops bank-side events that are not payments (opening balance, fees,
/// commissions, ...) when they show up as credits. Debits and rows without
/// a keyword are always kept.
pub struct ExclusionFilter {
    keywords: Vec<String>,
    compiled: Option<Regex>,
}

impl ExclusionFilter {
    /// Fails only when the keyword list is too large to compile.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, regex::Error> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| fold_accents(k.as_ref().trim()))
            .filter(|k| !k.is_empty())
            .collect();
        let compiled = compile(&keywords, None)?;
        Ok(Self { keywords, compiled })
    }

    pub fn from_config(config: &FilterConfig) -> Result<Self, regex::Error> {
        Self::new(&config.keywords)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Lower-cased, accent-folded description mentions a keyword.
    pub fn mentions_keyword(&self, description: &str) -> bool {
        self.compiled
            .as_ref()
            .is_some_and(|re| re.is_match(&fold_accents(description)))
    }

    pub fn is_excluded(&self, tx: &Transaction) -> bool {
        tx.amount.is_positive() && self.mentions_keyword(&tx.description)
    }

    pub fn apply(&self, transactions: Vec<Transaction>) -> FilterOutcome {
        let total = transactions.len();
        let kept: Vec<Transaction> = transactions
            .into_iter()
            .filter(|tx| {
                let excluded = self.is_excluded(tx);
                if excluded {
                    tracing::debug!(
                        reference = %tx.reference,
                        description = %tx.description,
                        "Dropping non-payment credit"
                    );
                }
                !excluded
            })
            .collect();

        FilterOutcome {
            dropped: total - kept.len(),
            kept,
        }
    }
}

fn compile(keywords: &[String], size_limit: Option<usize>) -> Result<Option<Regex>, regex::Error> {
    if keywords.is_empty() {
        return Ok(None);
    }
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let mut builder = RegexBuilder::new(&alternation);
    if let Some(limit) = size_limit {
        builder.size_limit(limit);
    }
    builder.build().map(Some)
}
