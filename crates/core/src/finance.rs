//! Financial engine
//!
//! Pure loan, savings and interest computations. Values keep full `f64`
//! precision; rounding is left to the presentation layer (see [`crate::format`]).

use serde::{Deserialize, Serialize};

use crate::error::CalculatorError;

/// Monthly periodic rate from an annual percentage
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    (annual_rate_percent / 100.0) / 12.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanBreakdown {
    pub monthly_payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsInput {
    pub monthly_deposit: f64,
    pub annual_rate_percent: f64,
    pub term_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsBreakdown {
    pub future_value: f64,
    pub total_deposited: f64,
    pub gains: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestInput {
    pub capital: f64,
    pub annual_rate_percent: f64,
    /// May be fractional
    pub years: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestBreakdown {
    pub simple_interest: f64,
    pub final_simple: f64,
    pub compound_interest: f64,
    pub final_compound: f64,
}

/// Fixed monthly payment for an amortized loan.
///
/// A zero rate uses straight division instead of the annuity formula.
pub fn compute_loan(input: LoanInput) -> Result<LoanBreakdown, CalculatorError> {
    require_positive("principal", input.principal)?;
    require_non_negative("annual_rate_percent", input.annual_rate_percent)?;
    require_term("term_months", input.term_months)?;

    let n = f64::from(input.term_months);
    let r = monthly_rate(input.annual_rate_percent);

    if r == 0.0 {
        return Ok(LoanBreakdown {
            monthly_payment: input.principal / n,
            total_paid: input.principal,
            total_interest: 0.0,
        });
    }

    let factor = (1.0 + r).powf(n);
    let monthly_payment = input.principal * r * factor / (factor - 1.0);
    let total_paid = monthly_payment * n;

    Ok(LoanBreakdown {
        monthly_payment,
        total_paid,
        total_interest: total_paid - input.principal,
    })
}

/// Future value of equal monthly deposits (ordinary annuity)
pub fn compute_savings(input: SavingsInput) -> Result<SavingsBreakdown, CalculatorError> {
    require_positive("monthly_deposit", input.monthly_deposit)?;
    require_non_negative("annual_rate_percent", input.annual_rate_percent)?;
    require_term("term_months", input.term_months)?;

    let n = f64::from(input.term_months);
    let r = monthly_rate(input.annual_rate_percent);
    let total_deposited = input.monthly_deposit * n;

    let future_value = if r == 0.0 {
        total_deposited
    } else {
        input.monthly_deposit * (((1.0 + r).powf(n) - 1.0) / r)
    };

    Ok(SavingsBreakdown {
        future_value,
        total_deposited,
        gains: future_value - total_deposited,
    })
}

/// Simple and annually compounded interest over `years`
pub fn compute_interest(input: InterestInput) -> Result<InterestBreakdown, CalculatorError> {
    require_positive("capital", input.capital)?;
    require_non_negative("annual_rate_percent", input.annual_rate_percent)?;
    require_non_negative("years", input.years)?;

    let rate = input.annual_rate_percent / 100.0;
    let simple_interest = input.capital * rate * input.years;
    let compound_interest = input.capital * ((1.0 + rate).powf(input.years) - 1.0);

    Ok(InterestBreakdown {
        simple_interest,
        final_simple: input.capital + simple_interest,
        compound_interest,
        final_compound: input.capital + compound_interest,
    })
}

fn require_positive(param: &'static str, value: f64) -> Result<(), CalculatorError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalculatorError::invalid(
            param,
            format!("must be a finite number greater than 0, got {}", value),
        ));
    }
    Ok(())
}

fn require_non_negative(param: &'static str, value: f64) -> Result<(), CalculatorError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalculatorError::invalid(
            param,
            format!("must be a finite number of at least 0, got {}", value),
        ));
    }
    Ok(())
}

fn require_term(param: &'static str, months: u32) -> Result<(), CalculatorError> {
    if months == 0 {
        return Err(CalculatorError::invalid(param, "must be at least 1 month"));
    }
    Ok(())
}
