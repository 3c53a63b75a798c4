//! Keyword fallback classifier
//!
//! Routes a turn without the reasoning provider. Rules are evaluated in
//! order over the lowercased input and the first match wins.

use once_cell::sync::Lazy;
use regex::Regex;

use bank_assistant_config::LookupConfig;
use bank_assistant_tools::{parse_calculation, ToolId, HELP_TEXT};

/// Reply for a student question that names neither an id nor "todos"
pub const MISSING_STUDENT_ID: &str = "Por favor especifica el ID del estudiante o escribe 'todos'";

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid digits regex"));

const BANKING_KEYWORDS: &[&str] = &["banco", "cuenta", "credito", "prestamo", "tarjeta"];
const STUDENT_KEYWORDS: &[&str] = &["estudiante", "alumno"];
const CALCULATION_KEYWORDS: &[&str] = &["calcula", "prestamo", "ahorro", "interes"];
const CURRENCY_KEYWORDS: &[&str] = &["convierte", "conversion", "usd", "mxn", "eur"];
const HELP_KEYWORDS: &[&str] = &["ayuda", "help", "que puedes", "capacidades"];

/// Where the fallback sends a turn
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackRoute {
    /// Invoke a tool with the given input
    Tool { tool: ToolId, input: String },
    /// Answer directly, no tool involved
    Reply(String),
}

/// Route plus the name of the rule that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackDecision {
    pub rule: &'static str,
    pub route: FallbackRoute,
}

/// What the rules see of a turn
pub struct RuleInput<'a> {
    pub original: &'a str,
    pub lowered: &'a str,
    cities: &'a [String],
    default_city: &'a str,
}

/// One `(predicate, handler)` pair
pub struct FallbackRule {
    pub name: &'static str,
    predicate: fn(&RuleInput<'_>) -> bool,
    handler: fn(&RuleInput<'_>) -> FallbackRoute,
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn tool(tool: ToolId, input: impl Into<String>) -> FallbackRoute {
    FallbackRoute::Tool {
        tool,
        input: input.into(),
    }
}

fn default_rules() -> Vec<FallbackRule> {
    vec![
        FallbackRule {
            name: "structured_calculation",
            predicate: |t| {
                t.original.split_whitespace().count() == 4 && parse_calculation(t.original).is_ok()
            },
            handler: |t| tool(ToolId::Calculator, t.original),
        },
        FallbackRule {
            name: "banking",
            predicate: |t| contains_any(t.lowered, BANKING_KEYWORDS),
            handler: |t| tool(ToolId::Knowledge, t.original),
        },
        FallbackRule {
            name: "student",
            predicate: |t| contains_any(t.lowered, STUDENT_KEYWORDS),
            handler: |t| {
                if t.lowered.contains("todos") {
                    return tool(ToolId::StudentLookup, "todos");
                }
                match DIGITS_RE.find(t.original) {
                    Some(id) => tool(ToolId::StudentLookup, id.as_str()),
                    None => FallbackRoute::Reply(MISSING_STUDENT_ID.to_string()),
                }
            },
        },
        FallbackRule {
            name: "calculation",
            predicate: |t| contains_any(t.lowered, CALCULATION_KEYWORDS),
            handler: |t| tool(ToolId::Calculator, t.original),
        },
        FallbackRule {
            name: "weather",
            predicate: |t| t.lowered.contains("clima"),
            handler: |t| {
                let city = t
                    .cities
                    .iter()
                    .find(|c| t.lowered.contains(c.as_str()))
                    .map(String::as_str)
                    .unwrap_or(t.default_city);
                tool(ToolId::Weather, city)
            },
        },
        FallbackRule {
            name: "currency",
            predicate: |t| contains_any(t.lowered, CURRENCY_KEYWORDS),
            handler: |t| tool(ToolId::Currency, t.original),
        },
        FallbackRule {
            name: "help",
            predicate: |t| contains_any(t.lowered, HELP_KEYWORDS),
            handler: |_| FallbackRoute::Reply(HELP_TEXT.to_string()),
        },
    ]
}

/// Deterministic keyword router; never fails
pub struct FallbackClassifier {
    rules: Vec<FallbackRule>,
    cities: Vec<String>,
    default_city: String,
}

impl FallbackClassifier {
    pub fn new(lookup: &LookupConfig) -> Self {
        Self {
            rules: default_rules(),
            cities: lookup.known_cities(),
            default_city: lookup.default_city.to_lowercase(),
        }
    }

    /// Rule names in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    pub fn classify(&self, text: &str) -> FallbackDecision {
        let lowered = text.to_lowercase();
        let input = RuleInput {
            original: text,
            lowered: &lowered,
            cities: &self.cities,
            default_city: &self.default_city,
        };

        for rule in &self.rules {
            if (rule.predicate)(&input) {
                return FallbackDecision {
                    rule: rule.name,
                    route: (rule.handler)(&input),
                };
            }
        }

        FallbackDecision {
            rule: "default",
            route: tool(ToolId::Knowledge, text),
        }
    }
}

impl Default for FallbackClassifier {
    fn default() -> Self {
        Self::new(&LookupConfig::default())
    }
}

impl std::fmt::Debug for FallbackClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackClassifier")
            .field("rules", &self.rule_names())
            .field("cities", &self.cities)
            .field("default_city", &self.default_city)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> FallbackDecision {
        FallbackClassifier::default().classify(text)
    }

    fn routed(text: &str) -> FallbackRoute {
        classify(text).route
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(
            FallbackClassifier::default().rule_names(),
            vec![
                "structured_calculation",
                "banking",
                "student",
                "calculation",
                "weather",
                "currency",
                "help",
            ]
        );
    }

    #[test]
    fn test_structured_loan_goes_to_calculator() {
        let decision = classify("prestamo 50000 18 24");
        assert_eq!(decision.rule, "structured_calculation");
        assert_eq!(decision.route, tool(ToolId::Calculator, "prestamo 50000 18 24"));
    }

    #[test]
    fn test_loan_in_prose_goes_to_knowledge() {
        let decision = classify("Quiero un prestamo de 50000 pesos");
        assert_eq!(decision.rule, "banking");
        assert_eq!(
            decision.route,
            tool(ToolId::Knowledge, "Quiero un prestamo de 50000 pesos")
        );
    }

    #[test]
    fn test_students() {
        assert_eq!(
            routed("Muestra todos los estudiantes"),
            tool(ToolId::StudentLookup, "todos")
        );
        assert_eq!(
            routed("Consulta el estudiante 123"),
            tool(ToolId::StudentLookup, "123")
        );
        assert_eq!(
            routed("alumno 45 y 67"),
            tool(ToolId::StudentLookup, "45")
        );
        assert_eq!(
            routed("Busca al alumno Pedro"),
            FallbackRoute::Reply(MISSING_STUDENT_ID.to_string())
        );
    }

    #[test]
    fn test_calculation_keywords() {
        assert_eq!(
            routed("calcula ahorro 1000 3.5 12"),
            tool(ToolId::Calculator, "calcula ahorro 1000 3.5 12")
        );
        let decision = classify("interes 10000 5 2");
        assert_eq!(decision.rule, "structured_calculation");
    }

    #[test]
    fn test_weather_city_extraction() {
        assert_eq!(
            routed("¿Cuál es el clima en Guadalajara?"),
            tool(ToolId::Weather, "guadalajara")
        );
        assert_eq!(routed("clima de hoy"), tool(ToolId::Weather, "mexico"));
    }

    #[test]
    fn test_banking_wins_over_weather() {
        let decision = classify("¿el banco abre con este clima?");
        assert_eq!(decision.rule, "banking");
        assert!(matches!(decision.route, FallbackRoute::Tool { tool: ToolId::Knowledge, .. }));
    }

    #[test]
    fn test_currency() {
        assert_eq!(
            routed("Convierte 100 USD a MXN"),
            tool(ToolId::Currency, "Convierte 100 USD a MXN")
        );
    }

    #[test]
    fn test_help_reply() {
        assert_eq!(
            routed("¿Qué puedes hacer? ayuda"),
            FallbackRoute::Reply(HELP_TEXT.to_string())
        );
    }

    #[test]
    fn test_default_goes_to_knowledge() {
        let decision = classify("Hola, buenos días");
        assert_eq!(decision.rule, "default");
        assert_eq!(decision.route, tool(ToolId::Knowledge, "Hola, buenos días"));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = FallbackClassifier::default();
        for text in ["prestamo 1 2 3", "clima", "estudiante 9", "nada"] {
            assert_eq!(classifier.classify(text), classifier.classify(text));
        }
    }
}
