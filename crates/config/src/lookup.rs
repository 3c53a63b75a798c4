//! Static lookup tables for the weather and currency tools
//!
//! Defaults mirror the simulated data the assistant has always shipped with;
//! deployments can override either table from YAML or env.

use serde::{Deserialize, Serialize};

/// One row of the weather table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEntry {
    /// Lowercase city key
    pub city: String,
    pub temperature_c: f64,
    pub condition: String,
    pub humidity_percent: u8,
}

impl WeatherEntry {
    fn new(city: &str, temperature_c: f64, condition: &str, humidity_percent: u8) -> Self {
        Self {
            city: city.to_string(),
            temperature_c,
            condition: condition.to_string(),
            humidity_percent,
        }
    }
}

/// One directed exchange rate (`1 from = rate to`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRateEntry {
    pub from: String,
    pub to: String,
    pub rate: f64,
}

impl CurrencyRateEntry {
    fn new(from: &str, to: &str, rate: f64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            rate,
        }
    }
}

/// Weather and currency table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default = "default_weather")]
    pub weather: Vec<WeatherEntry>,

    /// Returned for cities not in the table (its `city` field is ignored)
    #[serde(default = "default_weather_fallback")]
    pub weather_fallback: WeatherEntry,

    /// City the keyword fallback uses when a weather question names none
    #[serde(default = "default_city")]
    pub default_city: String,

    #[serde(default = "default_currency_rates")]
    pub currency_rates: Vec<CurrencyRateEntry>,
}

pub fn default_weather() -> Vec<WeatherEntry> {
    vec![
        WeatherEntry::new("mexico", 22.0, "Soleado", 60),
        WeatherEntry::new("guadalajara", 25.0, "Parcialmente nublado", 55),
        WeatherEntry::new("monterrey", 28.0, "Despejado", 45),
        WeatherEntry::new("cancun", 30.0, "Soleado", 75),
        WeatherEntry::new("veracruz", 26.0, "Nublado", 80),
    ]
}

pub fn default_weather_fallback() -> WeatherEntry {
    WeatherEntry::new("", 24.0, "Información no disponible", 65)
}

fn default_city() -> String {
    "mexico".to_string()
}

pub fn default_currency_rates() -> Vec<CurrencyRateEntry> {
    vec![
        CurrencyRateEntry::new("USD", "MXN", 18.50),
        CurrencyRateEntry::new("MXN", "USD", 0.054),
        CurrencyRateEntry::new("EUR", "MXN", 20.20),
        CurrencyRateEntry::new("MXN", "EUR", 0.049),
        CurrencyRateEntry::new("USD", "EUR", 0.92),
        CurrencyRateEntry::new("EUR", "USD", 1.09),
    ]
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            weather: default_weather(),
            weather_fallback: default_weather_fallback(),
            default_city: default_city(),
            currency_rates: default_currency_rates(),
        }
    }
}

impl LookupConfig {
    /// Cities in table order, lowercase
    pub fn known_cities(&self) -> Vec<String> {
        self.weather.iter().map(|w| w.city.to_lowercase()).collect()
    }
}
