//! Credit analysis.
//!
//! Leverage and coverage history, debt capacity, covenant tests, a
//! leverage-based pricing grid and a rating ladder.

mod capacity;

pub use capacity::{
    CovenantTest, CreditConfig, CreditMetrics, CreditModel, CreditProjection, CreditRating,
    CreditResult, PricingTier,
};
