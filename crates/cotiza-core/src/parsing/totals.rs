use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::extraction::PageContent;
use crate::model::TotalLabel;
use crate::parsing::values::parse_amount;

fn re_totals() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(
            r"(Subtotal Cotización|Bonificación|Subtotal Neto|IVA|Total Cotización)\s*:\s*([\d.,]+)",
        )
        .expect("invalid regex")
    })
}

/// Printed totals found in the document text.
///
/// Only labels that matched are present; a missing label is never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TotalsMap(BTreeMap<TotalLabel, Decimal>);

impl TotalsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: TotalLabel) -> Option<Decimal> {
        self.0.get(&label).copied()
    }

    pub fn insert(&mut self, label: TotalLabel, amount: Decimal) {
        self.0.insert(label, amount);
    }

    pub fn contains(&self, label: TotalLabel) -> bool {
        self.0.contains_key(&label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TotalLabel, Decimal)> + '_ {
        self.0.iter().map(|(l, a)| (*l, *a))
    }
}

impl FromIterator<(TotalLabel, Decimal)> for TotalsMap {
    fn from_iter<I: IntoIterator<Item = (TotalLabel, Decimal)>>(iter: I) -> Self {
        TotalsMap(iter.into_iter().collect())
    }
}

/// Scan the text of every page for labeled totals.
pub fn scan_totals(pages: &[PageContent]) -> TotalsMap {
    let mut text = String::new();
    for page in pages {
        text.push_str(&page.text());
        text.push('\n');
    }
    scan_text(&text)
}

/// Scan free text for `<Label> : <amount>` pairs.
///
/// A label seen more than once keeps its last amount.
pub fn scan_text(text: &str) -> TotalsMap {
    let mut totals = TotalsMap::new();

    for caps in re_totals().captures_iter(text) {
        let (Some(label), Some(raw)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let Some(label) = TotalLabel::from_label(label.as_str()) else {
            continue;
        };
        match parse_amount(raw.as_str()) {
            Some(amount) => {
                totals.insert(label, amount);
            }
            None => {
                tracing::warn!(%label, raw = raw.as_str(), "skipping unparseable total amount");
            }
        }
    }

    tracing::debug!(found = totals.len(), "scanned printed totals");
    totals
}

/// Whether a line carries one of the printed totals.
pub(crate) fn is_totals_line(line: &str) -> bool {
    re_totals().is_match(line)
}
