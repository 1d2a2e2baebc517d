//! Model registry for discovering and categorizing available valuation models.
//!
//! This module provides metadata and discovery functionality for every model
//! in the ronda toolkit, including the composition layers built on top of the
//! single-scenario models.

use derive_more::Display;
use ronda_traits::{Result, RondaError};
use serde::{Deserialize, Serialize};

/// Model category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub enum ModelCategory {
    /// Cash-flow based valuation
    Intrinsic,
    /// Market multiples
    Relative,
    /// Deal-driven analysis
    Transaction,
    /// Debt capacity and credit quality
    Credit,
    /// Operating projections
    Operating,
    /// Models that combine or re-run other models
    Composite,
}

impl ModelCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Intrinsic => "Value from the company's own projected cash generation",
            Self::Relative => "Value from multiples of comparable companies and deals",
            Self::Transaction => "Returns and pricing from a buyer's or issuer's perspective",
            Self::Credit => "Leverage, coverage and debt capacity",
            Self::Operating => "Customer and financial statement projections",
            Self::Composite => "Sensitivity sweeps and blended recommendations",
        }
    }
}

/// Metadata about a model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    /// Unique identifier for the model
    pub name: &'static str,

    /// Alternative names accepted by [`get_model_info`]
    pub aliases: &'static [&'static str],

    /// Category classification
    pub category: ModelCategory,

    /// Human-readable description
    pub description: &'static str,

    /// Minimum periods of history required
    pub min_periods: usize,

    /// Whether the model needs a current share price
    pub requires_market_price: bool,
}

impl ModelInfo {
    fn matches(&self, key: &str) -> bool {
        self.name == key || self.aliases.contains(&key)
    }
}

/// Get information about all available models.
#[must_use]
pub fn available_models() -> Vec<ModelInfo> {
    vec![
        // Intrinsic
        ModelInfo {
            name: "dcf",
            aliases: &["discounted_cash_flow"],
            category: ModelCategory::Intrinsic,
            description: "Unlevered FCF discounted at WACC with a Gordon terminal value",
            min_periods: 1,
            requires_market_price: false,
        },
        ModelInfo {
            name: "fcf",
            aliases: &["free_cash_flow", "fcf_analysis"],
            category: ModelCategory::Intrinsic,
            description: "Historical FCF margin, conversion, growth and projection",
            min_periods: 1,
            requires_market_price: false,
        },
        ModelInfo {
            name: "sotp",
            aliases: &["sum_of_the_parts", "segments"],
            category: ModelCategory::Intrinsic,
            description: "Segment EBITDA multiples less corporate overhead",
            min_periods: 1,
            requires_market_price: false,
        },
        // Relative
        ModelInfo {
            name: "comps",
            aliases: &["comparables", "trading_comps"],
            category: ModelCategory::Relative,
            description: "EV/Revenue, EV/EBITDA and P/E of a peer set",
            min_periods: 1,
            requires_market_price: true,
        },
        ModelInfo {
            name: "precedents",
            aliases: &["precedent_transactions", "transactions"],
            category: ModelCategory::Relative,
            description: "Multiples and control premiums paid in past acquisitions",
            min_periods: 1,
            requires_market_price: true,
        },
        // Transaction
        ModelInfo {
            name: "lbo",
            aliases: &["leveraged_buyout"],
            category: ModelCategory::Transaction,
            description: "Sponsor MOIC and IRR with a senior/mezzanine cash sweep",
            min_periods: 1,
            requires_market_price: true,
        },
        ModelInfo {
            name: "merger",
            aliases: &["m&a", "accretion_dilution"],
            category: ModelCategory::Transaction,
            description: "Pro-forma EPS accretion/dilution for an acquirer",
            min_periods: 1,
            requires_market_price: true,
        },
        ModelInfo {
            name: "ipo",
            aliases: &["ipo_pricing", "offering"],
            category: ModelCategory::Transaction,
            description: "Fair value, IPO discount and offering structure",
            min_periods: 1,
            requires_market_price: false,
        },
        // Credit
        ModelInfo {
            name: "credit",
            aliases: &["debt_capacity", "credit_analysis"],
            category: ModelCategory::Credit,
            description: "Leverage, coverage, covenants, pricing grid and rating",
            min_periods: 1,
            requires_market_price: false,
        },
        // Operating
        ModelInfo {
            name: "operating",
            aliases: &["unit_economics", "operating_model"],
            category: ModelCategory::Operating,
            description: "Monthly customer projection with LTV/CAC and breakeven",
            min_periods: 1,
            requires_market_price: false,
        },
        ModelInfo {
            name: "three_statement",
            aliases: &["3_statement", "financial_statements"],
            category: ModelCategory::Operating,
            description: "Linked income statement, balance sheet and cash flow",
            min_periods: 1,
            requires_market_price: false,
        },
        // Composite
        ModelInfo {
            name: "sensitivity",
            aliases: &["scenario", "scenarios"],
            category: ModelCategory::Composite,
            description: "DCF sweeps, WACC x growth matrix, scenarios and tornado",
            min_periods: 1,
            requires_market_price: true,
        },
        ModelInfo {
            name: "memo",
            aliases: &["ic_memo", "investment_memo"],
            category: ModelCategory::Composite,
            description: "Weighted DCF, comps and precedents with a recommendation",
            min_periods: 1,
            requires_market_price: true,
        },
    ]
}

/// Get all models in a specific category.
#[must_use]
pub fn models_by_category(category: ModelCategory) -> Vec<ModelInfo> {
    available_models()
        .into_iter()
        .filter(|info| info.category == category)
        .collect()
}

/// Get information about a model by name or alias.
///
/// Lookup ignores case and treats `-` and spaces as `_`.
///
/// # Errors
///
/// [`RondaError::ModelNotFound`] when no model answers to `name`.
pub fn get_model_info(name: &str) -> Result<ModelInfo> {
    let key = name.trim().to_lowercase().replace(['-', ' '], "_");
    available_models()
        .into_iter()
        .find(|info| info.matches(&key))
        .ok_or_else(|| RondaError::ModelNotFound(name.to_string()))
}

/// Get all categories that have models, in declaration order.
#[must_use]
pub fn available_categories() -> Vec<ModelCategory> {
    let mut categories: Vec<_> = available_models()
        .into_iter()
        .map(|info| info.category)
        .collect();
    categories.sort();
    categories.dedup();
    categories
}
