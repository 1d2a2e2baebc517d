//! Operating models.
//!
//! - Unit economics: customer-driven monthly projection with LTV/CAC
//! - Three-statement: linked income statement, balance sheet and cash flow

mod three_statement;
mod unit_economics;

pub use three_statement::{
    BalanceProjection, Carry, CashFlowProjection, IncomeProjection, ProjectedYear,
    ThreeStatementConfig, ThreeStatementModel, ThreeStatementResult,
};
pub use unit_economics::{
    MonthlyProjection, OperatingConfig, OperatingModel, OperatingResult, OperatingScenario,
    PeriodRollup, UnitEconomics, rollup,
};
