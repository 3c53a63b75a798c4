//! Weather and currency tools over fixed in-memory tables
//!
//! Both are deterministic: no clocks, no network, no mutable state.

use std::collections::HashMap;

use async_trait::async_trait;

use bank_assistant_config::{CurrencyRateEntry, LookupConfig, WeatherEntry};
use bank_assistant_core::format::{format_amount, format_rate, title_case};
use bank_assistant_core::{Tool, ToolError};

pub const WEATHER_NAME: &str = "consultar_clima";
pub const WEATHER_DESCRIPTION: &str = "Consulta el clima actual de una ciudad";

pub const CURRENCY_NAME: &str = "conversion_moneda";
pub const CURRENCY_DESCRIPTION: &str = "Convierte entre monedas. Formato: 'cantidad moneda_origen a moneda_destino'
Ejemplo: '100 USD a MXN' o '500 MXN a USD'";

pub const CURRENCY_USAGE: &str =
    "Formato: 'cantidad moneda_origen a moneda_destino' (ej: '100 USD a MXN')";
pub const CURRENCY_INVALID_AMOUNT: &str = "Error: La cantidad debe ser un número válido";

/// Conditions for one city
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub temperature_c: f64,
    pub condition: String,
    pub humidity_percent: u8,
}

impl From<&WeatherEntry> for WeatherReport {
    fn from(entry: &WeatherEntry) -> Self {
        Self {
            temperature_c: entry.temperature_c,
            condition: entry.condition.clone(),
            humidity_percent: entry.humidity_percent,
        }
    }
}

/// Lowercase city → report, with a fixed record for misses
#[derive(Debug, Clone)]
pub struct WeatherTable {
    entries: HashMap<String, WeatherReport>,
    fallback: WeatherReport,
}

impl WeatherTable {
    pub fn from_config(config: &LookupConfig) -> Self {
        let entries = config
            .weather
            .iter()
            .map(|e| (e.city.trim().to_lowercase(), WeatherReport::from(e)))
            .collect();
        Self {
            entries,
            fallback: WeatherReport::from(&config.weather_fallback),
        }
    }

    /// Case-insensitive lookup; never fails
    pub fn lookup(&self, city: &str) -> &WeatherReport {
        self.entries
            .get(&city.trim().to_lowercase())
            .unwrap_or(&self.fallback)
    }
}

impl Default for WeatherTable {
    fn default() -> Self {
        Self::from_config(&LookupConfig::default())
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeatherTool {
    table: WeatherTable,
}

impl WeatherTool {
    pub fn new(table: WeatherTable) -> Self {
        Self { table }
    }

    pub fn report(&self, city: &str) -> String {
        let city = city.trim();
        let report = self.table.lookup(city);
        format!(
            "🌤️ Clima en {}:\n\nTemperatura: {}°C\nCondiciones: {}\nHumedad: {}%",
            title_case(city),
            report.temperature_c,
            report.condition,
            report.humidity_percent
        )
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        WEATHER_NAME
    }

    fn description(&self) -> &str {
        WEATHER_DESCRIPTION
    }

    async fn invoke(&self, input: &str) -> String {
        self.report(input)
    }
}

/// Directed exchange rates keyed by uppercase `(FROM, TO)`
#[derive(Debug, Clone)]
pub struct CurrencyRateTable {
    rates: HashMap<(String, String), f64>,
}

impl CurrencyRateTable {
    pub fn new(entries: &[CurrencyRateEntry]) -> Self {
        let rates = entries
            .iter()
            .map(|e| ((e.from.to_uppercase(), e.to.to_uppercase()), e.rate))
            .collect();
        Self { rates }
    }

    /// Direct rate, else the inverse of the reverse-direction rate
    pub fn rate(&self, from: &str, to: &str) -> Result<f64, ToolError> {
        let key = (from.to_string(), to.to_string());
        if let Some(rate) = self.rates.get(&key) {
            return Ok(*rate);
        }
        let reverse = (to.to_string(), from.to_string());
        match self.rates.get(&reverse) {
            Some(rate) => Ok(1.0 / rate),
            None => Err(ToolError::NoRateAvailable {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

impl Default for CurrencyRateTable {
    fn default() -> Self {
        Self::new(&LookupConfig::default().currency_rates)
    }
}

/// A parsed `"<amount> <FROM> a <TO>"` request
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

/// Parse a conversion request; the fourth token onward after `to` is ignored
pub fn parse_conversion(text: &str) -> Result<ConversionRequest, ToolError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 4 || !tokens[2].eq_ignore_ascii_case("a") {
        return Err(ToolError::invalid_input(CURRENCY_USAGE));
    }
    let amount = tokens[0]
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())
        .ok_or_else(|| ToolError::invalid_input(CURRENCY_INVALID_AMOUNT))?;

    Ok(ConversionRequest {
        amount,
        from: tokens[1].to_uppercase(),
        to: tokens[3].to_uppercase(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct CurrencyConverterTool {
    table: CurrencyRateTable,
}

impl CurrencyConverterTool {
    pub fn new(table: CurrencyRateTable) -> Self {
        Self { table }
    }

    pub fn convert(&self, text: &str) -> String {
        let request = match parse_conversion(text) {
            Ok(request) => request,
            Err(ToolError::InvalidInput(message)) => return message,
            Err(e) => return e.to_string(),
        };

        let rate = match self.table.rate(&request.from, &request.to) {
            Ok(rate) => rate,
            Err(_) => {
                return format!(
                    "No hay tasa de conversión disponible para {} → {}",
                    request.from, request.to
                )
            },
        };

        let converted = request.amount * rate;
        format!(
            "💱 Conversión de Moneda:\n\n{} {} = {} {}\nTasa de cambio: 1 {} = {} {}",
            format_amount(request.amount),
            request.from,
            format_amount(converted),
            request.to,
            request.from,
            format_rate(rate),
            request.to
        )
    }
}

#[async_trait]
impl Tool for CurrencyConverterTool {
    fn name(&self) -> &str {
        CURRENCY_NAME
    }

    fn description(&self) -> &str {
        CURRENCY_DESCRIPTION
    }

    async fn invoke(&self, input: &str) -> String {
        self.convert(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_lookup_is_case_insensitive() {
        let tool = WeatherTool::default();
        let text = tool.report("GuadaLajara");
        assert!(text.starts_with("🌤️ Clima en Guadalajara:"));
        assert!(text.contains("Temperatura: 25°C"));
        assert!(text.contains("Condiciones: Parcialmente nublado"));
        assert!(text.contains("Humedad: 55%"));
    }

    #[test]
    fn test_weather_unknown_city_uses_default_record() {
        let tool = WeatherTool::default();
        let text = tool.report("oaxaca");
        assert!(text.contains("Clima en Oaxaca"));
        assert!(text.contains("Temperatura: 24°C"));
        assert!(text.contains("Información no disponible"));
        assert!(text.contains("Humedad: 65%"));
    }

    #[test]
    fn test_direct_conversion() {
        let tool = CurrencyConverterTool::default();
        let text = tool.convert("100 USD a MXN");
        assert!(text.contains("100.00 USD = 1,850.00 MXN"), "{}", text);
        assert!(text.contains("Tasa de cambio: 1 USD = 18.5000 MXN"));
    }

    #[test]
    fn test_inverse_rate_fallback() {
        let table = CurrencyRateTable::new(&[CurrencyRateEntry {
            from: "USD".into(),
            to: "MXN".into(),
            rate: 18.50,
        }]);
        let rate = table.rate("MXN", "USD").unwrap();
        assert_eq!(rate, 1.0 / 18.50);

        let tool = CurrencyConverterTool::new(table);
        let text = tool.convert("500 mxn a usd");
        let expected = format_amount(500.0 * (1.0 / 18.50));
        assert!(text.contains(&format!("500.00 MXN = {} USD", expected)), "{}", text);
        assert!(text.contains("1 MXN = 0.0541 USD"));
    }

    #[test]
    fn test_no_rate_available() {
        let tool = CurrencyConverterTool::default();
        assert_eq!(
            tool.convert("10 JPY a MXN"),
            "No hay tasa de conversión disponible para JPY → MXN"
        );
    }

    #[test]
    fn test_malformed_conversion() {
        let tool = CurrencyConverterTool::default();
        assert_eq!(tool.convert("100 USD MXN"), CURRENCY_USAGE);
        assert_eq!(tool.convert("100 USD to MXN"), CURRENCY_USAGE);
        assert_eq!(tool.convert("cien USD a MXN"), CURRENCY_INVALID_AMOUNT);
        assert_eq!(tool.convert("convierte 100 USD a MXN"), CURRENCY_USAGE);
    }

    #[test]
    fn test_extra_tokens_are_ignored() {
        let request = parse_conversion("100 EUR A usd hoy").unwrap();
        assert_eq!(request.from, "EUR");
        assert_eq!(request.to, "USD");
    }

    #[tokio::test]
    async fn test_lookup_tools_are_idempotent() {
        let weather = WeatherTool::default();
        assert_eq!(weather.invoke("cancun").await, weather.invoke("cancun").await);

        let currency = CurrencyConverterTool::default();
        assert_eq!(
            currency.invoke("250 EUR a MXN").await,
            currency.invoke("250 EUR a MXN").await
        );
    }
}
