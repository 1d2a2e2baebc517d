//! Transaction models.
//!
//! These models value a company from a deal perspective:
//! - LBO: sponsor returns under a leveraged capital structure
//! - Merger: EPS accretion/dilution for an acquirer
//! - IPO: offer pricing and offering size

mod ipo;
mod lbo;
mod merger;

pub use ipo::{IpoConfig, IpoModel, IpoResult};
pub use lbo::{LboConfig, LboModel, LboResult, LboYear, SourcesOfFunds, irr_from_moic};
pub use merger::{Consideration, MergerConfig, MergerModel, MergerResult};
