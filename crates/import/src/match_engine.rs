use conciliar_core::{Settlement, Transaction};

/// Outcome of looking one transaction up against the settlements table.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<'a> {
    /// First candidate in table order.
    pub settlement: Option<&'a Settlement>,
    /// Every settlement whose fragments suffix-match; more than one means the
    /// match is ambiguous.
    pub candidates: Vec<&'a Settlement>,
}

impl MatchResult<'_> {
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }
}

/// Transactions after matching, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub transactions: Vec<Transaction>,
    pub summary: MatchSummary,
}

impl Reconciliation {
    pub fn unsettled(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| !t.is_settled())
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub total: usize,
    pub settled: usize,
    pub unsettled: usize,
    pub ambiguous: usize,
}

/// Reference suffix matcher. A settlement matches a transaction when one of
/// its dash-delimited `referencia` fragments ends the transaction's
/// comparison key. Settlements without a receipt code or a usable `fecha`
/// never match.
pub struct SuffixMatchEngine {
    settlements: Vec<Settlement>,
    skipped: usize,
}

impl SuffixMatchEngine {
    pub fn new(settlements: Vec<Settlement>) -> Self {
        let total = settlements.len();
        let settlements: Vec<Settlement> = settlements
            .into_iter()
            .filter(|s| {
                let usable = s.link().is_some();
                if !usable {
                    tracing::warn!(
                        num_comprobante = %s.num_comprobante,
                        referencia = %s.referencia,
                        "Settlement lacks a receipt code or parseable fecha; excluded from matching"
                    );
                }
                usable
            })
            .collect();
        let skipped = total - settlements.len();
        Self {
            settlements,
            skipped,
        }
    }

    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    /// Settlements dropped at construction for lacking a code or a date.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn find_match(&self, tx: &Transaction) -> MatchResult<'_> {
        let key = tx.comparison_key();
        let candidates: Vec<&Settlement> = self
            .settlements
            .iter()
            .filter(|s| s.matches_key(key))
            .collect();

        MatchResult {
            settlement: candidates.first().copied(),
            candidates,
        }
    }

    /// Matches every transaction, returning new rows with settlement links
    /// set. Unmatched rows come back untouched.
    pub fn reconcile(&self, transactions: Vec<Transaction>) -> Reconciliation {
        let mut summary = MatchSummary {
            total: transactions.len(),
            ..MatchSummary::default()
        };

        let transactions = transactions
            .into_iter()
            .map(|tx| {
                let result = self.find_match(&tx);
                if result.is_ambiguous() {
                    summary.ambiguous += 1;
                    let codes: Vec<&str> = result
                        .candidates
                        .iter()
                        .map(|s| s.num_comprobante.as_str())
                        .collect();
                    tracing::warn!(
                        reference = %tx.reference,
                        candidates = ?codes,
                        "Ambiguous match; keeping the first settlement"
                    );
                }

                match result.settlement.and_then(Settlement::link) {
                    Some(link) => {
                        summary.settled += 1;
                        tracing::debug!(reference = %tx.reference, code = %link.code, "Matched");
                        tx.with_settlement(link)
                    }
                    None => {
                        summary.unsettled += 1;
                        tx
                    }
                }
            })
            .collect();

        Reconciliation {
            transactions,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use conciliar_core::Money;

    fn tx(reference: &str) -> Transaction {
        Transaction {
            reference: reference.to_string(),
            amount: Money::from_cents(10000),
            date: NaiveDate::from_ymd_opt(2025, 3, 1),
            bank: "BDV".to_string(),
            account_number: "9290".to_string(),
            description: "PAGO".to_string(),
            settlement: None,
        }
    }

    fn settlement(referencia: &str, code: &str, day: u32) -> Settlement {
        Settlement {
            razon_social: String::new(),
            rif_cedula: String::new(),
            num_comprobante: code.to_string(),
            pago_por: String::new(),
            fecha_pago: String::new(),
            fecha: NaiveDate::from_ymd_opt(2025, 3, day).and_then(|d| d.and_hms_opt(0, 0, 0)),
            cuenta: String::new(),
            banco: String::new(),
            referencia: referencia.to_string(),
            monto: None,
        }
    }

    #[test]
    fn end_to_end_fragment_match() {
        let engine = SuffixMatchEngine::new(vec![settlement("A-654321", "100", 4)]);
        let rec = engine.reconcile(vec![tx("TRX.654321")]);
        assert_eq!(rec.transactions[0].settlement_code(), "100");
        assert_eq!(
            rec.transactions[0].settlement_date(),
            NaiveDate::from_ymd_opt(2025, 3, 4)
        );
        assert_eq!(rec.summary.settled, 1);
    }

    #[test]
    fn suffix_match_and_non_match() {
        let hit = SuffixMatchEngine::new(vec![settlement("123456", "1", 1)]);
        assert!(hit.find_match(&tx("REF-123456")).settlement.is_some());

        let miss = SuffixMatchEngine::new(vec![settlement("999999", "1", 1)]);
        assert!(miss.find_match(&tx("REF-123456")).settlement.is_none());
    }

    #[test]
    fn float_rendered_reference_matches() {
        let engine = SuffixMatchEngine::new(vec![settlement("00123456", "7", 2)]);
        let rec = engine.reconcile(vec![tx("99800123456.0")]);
        assert_eq!(rec.transactions[0].settlement_code(), "7");
    }

    #[test]
    fn unmatched_is_counted_and_left_empty() {
        let engine = SuffixMatchEngine::new(vec![settlement("A-654321", "100", 4)]);
        let rec = engine.reconcile(vec![tx("TRX.654321"), tx("000111")]);
        assert_eq!(rec.summary.unsettled, 1);
        assert_eq!(rec.summary.total, 2);
        let unsettled: Vec<_> = rec.unsettled().collect();
        assert_eq!(unsettled.len(), 1);
        assert_eq!(unsettled[0].reference, "000111");
        assert_eq!(unsettled[0].settlement_code(), "");
        assert_eq!(unsettled[0].settlement_date(), None);
    }

    #[test]
    fn first_settlement_wins_when_ambiguous() {
        let engine = SuffixMatchEngine::new(vec![
            settlement("X-4321", "200", 5),
            settlement("54321", "201", 6),
        ]);
        let result = engine.find_match(&tx("7654321"));
        assert!(result.is_ambiguous());
        assert_eq!(result.settlement.unwrap().num_comprobante, "200");

        let rec = engine.reconcile(vec![tx("7654321")]);
        assert_eq!(rec.transactions[0].settlement_code(), "200");
        assert_eq!(rec.summary.ambiguous, 1);
    }

    #[test]
    fn settlement_without_date_never_matches() {
        let mut broken = settlement("654321", "300", 1);
        broken.fecha = None;
        let engine = SuffixMatchEngine::new(vec![broken]);
        assert_eq!(engine.skipped(), 1);
        let rec = engine.reconcile(vec![tx("654321")]);
        assert!(!rec.transactions[0].is_settled());
    }

    #[test]
    fn settlement_without_receipt_code_never_matches() {
        let engine = SuffixMatchEngine::new(vec![settlement("654321", "", 4)]);
        assert_eq!(engine.skipped(), 1);

        let rec = engine.reconcile(vec![tx("654321")]);
        let t = &rec.transactions[0];
        assert!(!t.is_settled());
        assert_eq!(t.settlement_code().is_empty(), t.settlement_date().is_none());
        assert_eq!(rec.summary.settled, 0);
        assert_eq!(rec.summary.unsettled, 1);
    }

    #[test]
    fn blank_code_settlement_does_not_shadow_a_valid_one() {
        let engine = SuffixMatchEngine::new(vec![
            settlement("654321", "", 4),
            settlement("X-654321", "101", 5),
        ]);
        let rec = engine.reconcile(vec![tx("654321")]);
        assert_eq!(rec.transactions[0].settlement_code(), "101");
        assert_eq!(rec.summary.ambiguous, 0);
    }

    #[test]
    fn empty_reference_never_matches() {
        let engine = SuffixMatchEngine::new(vec![settlement("654321", "1", 1)]);
        let rec = engine.reconcile(vec![tx("  ")]);
        assert_eq!(rec.summary.unsettled, 1);
    }

    #[test]
    fn code_and_date_are_set_together() {
        let engine = SuffixMatchEngine::new(vec![
            settlement("111-222", "1", 1),
            settlement("333", "2", 2),
        ]);
        let rec = engine.reconcile(vec![tx("9222"), tx("4333"), tx("5555"), tx("")]);
        for t in &rec.transactions {
            assert_eq!(t.settlement_code().is_empty(), t.settlement_date().is_none());
        }
        assert_eq!(rec.summary.settled + rec.summary.unsettled, rec.summary.total);
    }

    #[test]
    fn input_order_is_preserved() {
        let engine = SuffixMatchEngine::new(vec![settlement("2", "B", 1)]);
        let rec = engine.reconcile(vec![tx("1"), tx("2"), tx("3")]);
        let refs: Vec<_> = rec.transactions.iter().map(|t| t.reference.as_str()).collect();
        assert_eq!(refs, ["1", "2", "3"]);
    }
}
