//! Intrinsic valuation models.
//!
//! These models value a company from its own projected cash generation:
//! - DCF: unlevered free cash flow discounted at WACC with a Gordon terminal value
//! - FCF analysis: historical free cash flow quality and a margin-path projection
//! - Sum-of-the-parts: segment-by-segment EBITDA multiples

mod dcf;
mod fcf;
mod sotp;

pub use dcf::{DcfConfig, DcfModel, DcfProjection, DcfResult, DcfSensitivity};
pub use fcf::{FcfAnalysis, FcfConfig, FcfMetrics, FcfModel, FcfPeriod, FcfProjectionYear};
pub use sotp::{
    Segment, SegmentMethod, SegmentValuation, SotpConfig, SotpModel, SotpResult, SotpScenario,
};
