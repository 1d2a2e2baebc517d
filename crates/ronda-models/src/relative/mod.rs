//! Relative valuation models.
//!
//! These models value a company against market evidence:
//! - Comparable companies: trading multiples of a peer set
//! - Precedent transactions: multiples and control premiums paid in acquisitions
//!
//! Peer sets and transactions come from a generator trait so callers can
//! supply real data or a seeded synthetic source.

mod comps;
mod implied;
mod precedents;

pub use comps::{CompsConfig, CompsModel, CompsResult, PeerCompany, PeerGenerator, SyntheticPeers};
pub use implied::{ImpliedValue, MultipleBounds, ValuationMethod};
pub use precedents::{
    BuyerType, PrecedentsConfig, PrecedentsModel, PrecedentsResult, SyntheticTransactions,
    Transaction, TransactionGenerator,
};
