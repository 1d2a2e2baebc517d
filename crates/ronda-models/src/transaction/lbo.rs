//! Leveraged buyout returns model.

use ronda_traits::{CompanyData, Result, RondaError, ValuationModel, stats::ratio};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the LBO model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LboConfig {
    /// Premium over the current share price paid at entry (default: 25%)
    pub purchase_premium: f64,

    /// Share of the entry value funded with debt (default: 60%)
    pub debt_pct: f64,

    /// Senior share of total debt; mezzanine takes the rest (default: 70%)
    pub senior_pct: f64,

    /// Senior debt interest rate (default: 7%)
    pub senior_rate: f64,

    /// Mezzanine debt interest rate (default: 11%)
    pub mezzanine_rate: f64,

    /// Holding period in years (default: 5)
    pub holding_years: usize,

    /// Annual revenue growth (default: 5%)
    pub revenue_growth: f64,

    /// EBITDA margin (default: latest actual)
    pub ebitda_margin: Option<f64>,

    /// Exit EV/EBITDA multiple (default: the entry multiple)
    pub exit_multiple: Option<f64>,

    /// Tax rate on positive pre-tax income (default: 25%)
    pub tax_rate: f64,

    /// D&A as a share of revenue (default: 3%)
    pub da_pct: f64,

    /// CapEx as a share of revenue (default: 4%)
    pub capex_pct: f64,

    /// Net working capital investment as a share of the revenue change (default: 2%)
    pub nwc_pct: f64,
}

impl Default for LboConfig {
    fn default() -> Self {
        Self {
            purchase_premium: 0.25,
            debt_pct: 0.60,
            senior_pct: 0.70,
            senior_rate: 0.07,
            mezzanine_rate: 0.11,
            holding_years: 5,
            revenue_growth: 0.05,
            ebitda_margin: None,
            exit_multiple: None,
            tax_rate: 0.25,
            da_pct: 0.03,
            capex_pct: 0.04,
            nwc_pct: 0.02,
        }
    }
}

/// Funding of the purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesOfFunds {
    /// Senior term debt.
    pub senior_debt: f64,
    /// Mezzanine debt.
    pub mezzanine_debt: f64,
    /// Sponsor equity cheque.
    pub sponsor_equity: f64,
    /// Total sources, equal to the entry enterprise value.
    pub total: f64,
}

/// One year of the holding period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LboYear {
    /// Year, starting at 1.
    pub year: usize,
    /// Revenue.
    pub revenue: f64,
    /// EBITDA.
    pub ebitda: f64,
    /// Depreciation and amortization.
    pub depreciation: f64,
    /// Interest on opening debt balances.
    pub interest: f64,
    /// Taxes on positive pre-tax income.
    pub taxes: f64,
    /// Net income.
    pub net_income: f64,
    /// Capital expenditure.
    pub capex: f64,
    /// Investment in net working capital.
    pub change_in_nwc: f64,
    /// EBITDA less tax on EBIT, CapEx and working capital.
    pub unlevered_fcf: f64,
    /// Net income plus D&A less CapEx and working capital.
    pub levered_fcf: f64,
    /// Senior debt repaid from the sweep.
    pub senior_repayment: f64,
    /// Mezzanine debt repaid from the sweep.
    pub mezzanine_repayment: f64,
    /// Senior balance at year end.
    pub senior_debt: f64,
    /// Mezzanine balance at year end.
    pub mezzanine_debt: f64,
    /// Total debt at year end.
    pub total_debt: f64,
    /// Total debt over EBITDA at year end.
    pub leverage: Option<f64>,
}

/// Output of the LBO model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LboResult {
    /// Price per share paid.
    pub entry_price: f64,
    /// Entry enterprise value.
    pub entry_enterprise_value: f64,
    /// Entry EV over latest EBITDA.
    pub entry_multiple: f64,
    /// Exit EV/EBITDA multiple used.
    pub exit_multiple: f64,
    /// Funding structure.
    pub sources: SourcesOfFunds,
    /// Holding period projection.
    pub years: Vec<LboYear>,
    /// EBITDA in the exit year.
    pub exit_ebitda: f64,
    /// Exit enterprise value.
    pub exit_enterprise_value: f64,
    /// Debt outstanding at exit.
    pub exit_debt: f64,
    /// Exit enterprise value less remaining debt.
    pub exit_equity_value: f64,
    /// Multiple on invested capital.
    pub moic: f64,
    /// Annualised return; -100% when the equity is wiped out.
    pub irr: f64,
    /// Debt repaid over the holding period.
    pub total_debt_paydown: f64,
}

/// Cash sweep of one year's levered free cash flow.
///
/// The sweep runs on cash left after interest and taxes, not on unlevered
/// FCF. Senior debt is repaid first and neither balance goes below zero; a
/// negative year repays nothing. Returns `(senior, mezzanine)` repayments.
fn sweep(levered_fcf: f64, senior: f64, mezzanine: f64) -> (f64, f64) {
    let available = levered_fcf.max(0.0);
    let senior_repayment = available.min(senior);
    let mezzanine_repayment = (available - senior_repayment).min(mezzanine);
    (senior_repayment, mezzanine_repayment)
}

/// Leveraged buyout model.
///
/// Buys the company at a premium with a senior/mezzanine debt stack, sweeps
/// all positive levered free cash flow into debt repayment (senior first),
/// and exits at an EBITDA multiple at the end of the holding period.
#[derive(Debug, Clone, Default)]
pub struct LboModel {
    config: LboConfig,
}

impl LboModel {
    /// Create a new LBO model with the given configuration.
    #[must_use]
    pub const fn new(config: LboConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &LboConfig {
        &self.config
    }

    fn validate(&self) -> Result<()> {
        let cfg = &self.config;
        if cfg.holding_years == 0 {
            return Err(RondaError::InvalidData(
                "LBO holding period must be at least one year".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&cfg.debt_pct) {
            return Err(RondaError::InvalidData(format!(
                "LBO debt share must be within [0, 1), got {}",
                cfg.debt_pct
            )));
        }
        if !(0.0..=1.0).contains(&cfg.senior_pct) {
            return Err(RondaError::InvalidData(format!(
                "LBO senior share must be within [0, 1], got {}",
                cfg.senior_pct
            )));
        }
        Ok(())
    }
}

/// Internal rate of return implied by a multiple over `years`.
#[must_use]
pub fn irr_from_moic(moic: f64, years: usize) -> f64 {
    if moic <= 0.0 {
        -1.0
    } else {
        moic.powf(1.0 / years as f64) - 1.0
    }
}

impl ValuationModel for LboModel {
    type Output = LboResult;

    fn name(&self) -> &str {
        "lbo"
    }

    fn analyze(&self, data: &CompanyData) -> Result<LboResult> {
        self.validate()?;
        let cfg = &self.config;
        let latest = data.latest_income()?;
        let shares = data.shares_outstanding()?;

        let current = data.current_price();
        if current <= 0.0 {
            return Err(RondaError::DegenerateInput(format!(
                "{}: LBO entry needs a positive share price",
                data.symbol()
            )));
        }

        let entry_price = current * (1.0 + cfg.purchase_premium);
        let entry_enterprise_value = entry_price * shares;
        let entry_multiple = ratio(entry_enterprise_value, latest.ebitda, "entry EV/EBITDA")?;
        let exit_multiple = cfg.exit_multiple.unwrap_or(entry_multiple);
        let margin = match cfg.ebitda_margin {
            Some(m) => m,
            None => latest.ebitda_margin()?,
        };

        let total_debt = entry_enterprise_value * cfg.debt_pct;
        let sources = SourcesOfFunds {
            senior_debt: total_debt * cfg.senior_pct,
            mezzanine_debt: total_debt * (1.0 - cfg.senior_pct),
            sponsor_equity: entry_enterprise_value - total_debt,
            total: entry_enterprise_value,
        };

        let mut senior = sources.senior_debt;
        let mut mezzanine = sources.mezzanine_debt;
        let mut prior_revenue = latest.revenue;
        let mut years = Vec::with_capacity(cfg.holding_years);

        for year in 1..=cfg.holding_years {
            let revenue = prior_revenue * (1.0 + cfg.revenue_growth);
            let ebitda = revenue * margin;
            let depreciation = revenue * cfg.da_pct;
            let ebit = ebitda - depreciation;
            let interest = senior * cfg.senior_rate + mezzanine * cfg.mezzanine_rate;
            let pre_tax = ebit - interest;
            let taxes = pre_tax.max(0.0) * cfg.tax_rate;
            let net_income = pre_tax - taxes;
            let capex = revenue * cfg.capex_pct;
            let change_in_nwc = (revenue - prior_revenue) * cfg.nwc_pct;

            let unlevered_fcf = ebitda - ebit.max(0.0) * cfg.tax_rate - capex - change_in_nwc;
            let levered_fcf = net_income + depreciation - capex - change_in_nwc;

            let (senior_repayment, mezzanine_repayment) = sweep(levered_fcf, senior, mezzanine);
            senior -= senior_repayment;
            mezzanine -= mezzanine_repayment;

            let total = senior + mezzanine;
            years.push(LboYear {
                year,
                revenue,
                ebitda,
                depreciation,
                interest,
                taxes,
                net_income,
                capex,
                change_in_nwc,
                unlevered_fcf,
                levered_fcf,
                senior_repayment,
                mezzanine_repayment,
                senior_debt: senior,
                mezzanine_debt: mezzanine,
                total_debt: total,
                leverage: ratio(total, ebitda, "leverage").ok(),
            });
            prior_revenue = revenue;
        }

        let exit_ebitda = years.last().map_or(latest.ebitda, |y| y.ebitda);
        let exit_enterprise_value = exit_ebitda * exit_multiple;
        let exit_debt = senior + mezzanine;
        let exit_equity_value = exit_enterprise_value - exit_debt;
        let moic = ratio(exit_equity_value, sources.sponsor_equity, "MOIC")?;
        let irr = irr_from_moic(moic, cfg.holding_years);

        debug!(
            symbol = data.symbol(),
            entry_multiple,
            exit_multiple,
            moic,
            irr,
            "LBO analysis complete"
        );

        Ok(LboResult {
            entry_price,
            entry_enterprise_value,
            entry_multiple,
            exit_multiple,
            total_debt_paydown: total_debt - exit_debt,
            sources,
            years,
            exit_ebitda,
            exit_enterprise_value,
            exit_debt,
            exit_equity_value,
            moic,
            irr,
        })
    }
}
