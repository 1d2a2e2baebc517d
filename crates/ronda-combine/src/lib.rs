//! Blending of valuation methods into an investment committee memo.
//!
//! The memo runs DCF, trading comps and precedent transactions, weights their
//! implied prices 40/35/25 and turns the blend into a recommendation. Methods
//! that fail or produce a non-finite price drop out and the remaining weights
//! are renormalized; the memo records which ones were excluded and why.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ronda_combine::{MemoModel, Recommendation};
//! use ronda_traits::{ValuationModel, sample::reference_company};
//!
//! let memo = MemoModel::default().analyze(&reference_company()).unwrap();
//! if memo.recommendation == Recommendation::Buy {
//!     println!("{}: {:.2}", memo.symbol, memo.weighted_price);
//! }
//! ```

mod memo;

// Re-export main types
pub use memo::{
    Conviction, IcMemo, MemoConfig, MemoMethod, MemoModel, MethodValuation, Recommendation,
};
