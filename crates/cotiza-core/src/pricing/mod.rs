pub mod engine;
pub mod outcome;
pub mod reconcile;

pub use engine::{bonus_rate, price, round_price, PRICE_DP};
pub use outcome::{HandOff, PricedRow, PricingOutcome, Quotation, SummaryTotals};
pub use reconcile::{reconcile, Reconciliation, RowIssue, RowWarning, TotalCheck};
