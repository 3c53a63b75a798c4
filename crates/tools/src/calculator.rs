//! Financial calculator tool
//!
//! Grammar (whitespace-separated, first token case-insensitive):
//!
//! ```text
//! prestamo <principal> <annual_rate_percent> <term_months>
//! ahorro   <monthly_deposit> <annual_rate_percent> <term_months>
//! interes  <capital> <annual_rate_percent> <years>
//! ```
//!
//! Tokens after the fourth are ignored.

use async_trait::async_trait;

use bank_assistant_core::{
    compute_interest, compute_loan, compute_savings, format_decimal, format_money, CalculatorError,
    InterestInput, LoanInput, SavingsInput, Tool,
};

pub const NAME: &str = "calculadora_financiera";

pub const DESCRIPTION: &str = "Realiza cálculos financieros. Ejemplos:
- 'prestamo 50000 18 24' (monto, tasa%, meses)
- 'ahorro 1000 3.5 12' (deposito mensual, tasa%, meses)
- 'interes 10000 5 2' (capital, tasa%, años)";

pub const USAGE: &str = "Formato incorrecto. Ejemplos válidos:
• prestamo 50000 18 24 (monto, tasa%, meses)
• ahorro 1000 3.5 12 (depósito mensual, tasa%, meses)
• interes 10000 5 2 (capital, tasa%, años)";

pub const INVALID_NUMBERS: &str = "Error: Verifica que los números sean válidos";

/// A parsed calculator command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Calculation {
    Loan(LoanInput),
    Savings(SavingsInput),
    Interest(InterestInput),
}

impl Calculation {
    pub fn kind(&self) -> &'static str {
        match self {
            Calculation::Loan(_) => "loan",
            Calculation::Savings(_) => "savings",
            Calculation::Interest(_) => "interest",
        }
    }
}

/// Why a command could not be parsed
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationParseError {
    /// Wrong shape: too few tokens, unknown operation, non-numeric argument
    Usage,
    /// Numeric but outside the accepted range (e.g. a negative term)
    OutOfRange(String),
}

/// Parse a calculator command
pub fn parse_calculation(text: &str) -> Result<Calculation, CalculationParseError> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(CalculationParseError::Usage);
    }

    let first = number(tokens[1])?;
    let rate = number(tokens[2])?;

    match tokens[0] {
        "prestamo" | "préstamo" => Ok(Calculation::Loan(LoanInput {
            principal: first,
            annual_rate_percent: rate,
            term_months: months(tokens[3])?,
        })),
        "ahorro" => Ok(Calculation::Savings(SavingsInput {
            monthly_deposit: first,
            annual_rate_percent: rate,
            term_months: months(tokens[3])?,
        })),
        "interes" | "interés" => Ok(Calculation::Interest(InterestInput {
            capital: first,
            annual_rate_percent: rate,
            years: number(tokens[3])?,
        })),
        _ => Err(CalculationParseError::Usage),
    }
}

fn number(token: &str) -> Result<f64, CalculationParseError> {
    token.parse::<f64>().map_err(|_| CalculationParseError::Usage)
}

fn months(token: &str) -> Result<u32, CalculationParseError> {
    let value = token
        .parse::<i64>()
        .map_err(|_| CalculationParseError::Usage)?;
    u32::try_from(value)
        .map_err(|_| CalculationParseError::OutOfRange(format!("term {} out of range", value)))
}

/// Stateless calculator; identical input always renders identical output
#[derive(Debug, Clone, Copy, Default)]
pub struct FinancialCalculatorTool;

impl FinancialCalculatorTool {
    pub fn new() -> Self {
        Self
    }

    /// Parse, compute and render
    pub fn calculate(&self, text: &str) -> String {
        let calculation = match parse_calculation(text) {
            Ok(calculation) => calculation,
            Err(CalculationParseError::Usage) => return USAGE.to_string(),
            Err(CalculationParseError::OutOfRange(reason)) => {
                tracing::debug!(%reason, "Calculator input out of range");
                return INVALID_NUMBERS.to_string();
            },
        };

        match render(calculation) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(error = %e, kind = calculation.kind(), "Calculator input rejected");
                INVALID_NUMBERS.to_string()
            },
        }
    }
}

fn render(calculation: Calculation) -> Result<String, CalculatorError> {
    match calculation {
        Calculation::Loan(input) => {
            let result = compute_loan(input)?;
            Ok(format!(
                "💰 Cálculo de Préstamo:\n\n\
                 Monto solicitado: {}\n\
                 Tasa anual: {}%\n\
                 Plazo: {} meses\n\
                 Pago mensual: {}\n\
                 Total a pagar: {}\n\
                 Intereses totales: {}",
                format_money(input.principal),
                format_decimal(input.annual_rate_percent),
                input.term_months,
                format_money(result.monthly_payment),
                format_money(result.total_paid),
                format_money(result.total_interest),
            ))
        },
        Calculation::Savings(input) => {
            let result = compute_savings(input)?;
            Ok(format!(
                "🐷 Cálculo de Ahorro:\n\n\
                 Depósito mensual: {}\n\
                 Tasa anual: {}%\n\
                 Plazo: {} meses\n\
                 Total depositado: {}\n\
                 Valor final: {}\n\
                 Ganancias: {}",
                format_money(input.monthly_deposit),
                format_decimal(input.annual_rate_percent),
                input.term_months,
                format_money(result.total_deposited),
                format_money(result.future_value),
                format_money(result.gains),
            ))
        },
        Calculation::Interest(input) => {
            let result = compute_interest(input)?;
            Ok(format!(
                "📈 Cálculo de Intereses:\n\n\
                 Capital inicial: {}\n\
                 Tasa anual: {}%\n\
                 Tiempo: {} años\n\n\
                 Interés simple: {}\n\
                 Monto final (simple): {}\n\n\
                 Interés compuesto: {}\n\
                 Monto final (compuesto): {}",
                format_money(input.capital),
                format_decimal(input.annual_rate_percent),
                format_decimal(input.years),
                format_money(result.simple_interest),
                format_money(result.final_simple),
                format_money(result.compound_interest),
                format_money(result.final_compound),
            ))
        },
    }
}

#[async_trait]
impl Tool for FinancialCalculatorTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn invoke(&self, input: &str) -> String {
        self.calculate(input)
    }
}
