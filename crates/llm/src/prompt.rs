//! Prompt Building and Reply Parsing
//!
//! Renders the reasoning prompt (tool catalogue, conversation history, new
//! question, scratchpad of earlier iterations) and parses the provider's
//! reply into a tool selection.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use bank_assistant_core::{Turn, TurnRole};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message sent to a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Name and description of a selectable tool
#[derive(Debug, Clone, Copy)]
pub struct ToolDescription<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

/// One finished reasoning iteration, replayed to the provider on the next one
#[derive(Debug, Clone, PartialEq)]
pub struct ScratchStep {
    /// Raw provider reply for this iteration
    pub reply: String,
    /// Corrective feedback for the provider
    pub observation: String,
}

const PREAMBLE: &str = "Eres un asistente bancario inteligente. Para responder debes elegir \
exactamente UNA herramienta de la lista y darle una entrada de texto.";

const FORMAT_INSTRUCTIONS: &str = "Responde SIEMPRE con este formato exacto:

Thought: razona brevemente qué herramienta necesitas
Action: el nombre de la herramienta, uno de [{tool_names}]
Action Input: la entrada para la herramienta

No respondas directamente al usuario; la salida de la herramienta será la respuesta.";

/// Builder for the reasoning prompt
pub struct ReasoningPromptBuilder<'a> {
    tools: Vec<ToolDescription<'a>>,
    history: &'a [Turn],
    input: &'a str,
    scratchpad: &'a [ScratchStep],
}

impl<'a> ReasoningPromptBuilder<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            tools: Vec::new(),
            history: &[],
            input,
            scratchpad: &[],
        }
    }

    /// Tools in registry order
    pub fn with_tools(mut self, tools: impl IntoIterator<Item = ToolDescription<'a>>) -> Self {
        self.tools = tools.into_iter().collect();
        self
    }

    /// Conversation so far, excluding the new input
    pub fn with_history(mut self, history: &'a [Turn]) -> Self {
        self.history = history;
        self
    }

    pub fn with_scratchpad(mut self, scratchpad: &'a [ScratchStep]) -> Self {
        self.scratchpad = scratchpad;
        self
    }

    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(2048);
        prompt.push_str(PREAMBLE);
        prompt.push_str("\n\nHerramientas disponibles:\n");

        for tool in &self.tools {
            prompt.push_str(&format!("\n- {}: ", tool.name));
            let mut lines = tool.description.lines().map(str::trim).filter(|l| !l.is_empty());
            if let Some(first) = lines.next() {
                prompt.push_str(first);
            }
            for line in lines {
                prompt.push_str("\n    ");
                prompt.push_str(line);
            }
        }

        let names: Vec<&str> = self.tools.iter().map(|t| t.name).collect();
        prompt.push_str("\n\n");
        prompt.push_str(&FORMAT_INSTRUCTIONS.replace("{tool_names}", &names.join(", ")));

        if !self.history.is_empty() {
            prompt.push_str("\n\nHistorial de la conversación:\n");
            for turn in self.history {
                let speaker = match turn.role {
                    TurnRole::User => "Usuario",
                    TurnRole::Assistant => "Asistente",
                };
                prompt.push_str(&format!("{}: {}\n", speaker, turn.content));
            }
        }

        prompt.push_str(&format!("\nNueva pregunta: {}\n", self.input));

        for step in self.scratchpad {
            prompt.push_str(step.reply.trim());
            prompt.push_str(&format!("\nObservation: {}\n", step.observation));
        }

        prompt.push_str("Thought:");
        prompt
    }
}

/// What the provider asked for
#[derive(Debug, Clone, PartialEq)]
pub enum ReasoningReply {
    /// A tool selection with its input
    Action { tool: String, input: String },
    /// A direct answer, which the router does not accept as a selection
    FinalAnswer(String),
    /// Nothing recognizable
    Unparseable,
}

static ACTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^\s*Action\s*:\s*(.+?)\s*$").expect("valid action regex"));
static ACTION_INPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?si)Action\s*Input\s*:\s*(.*?)\s*(?:\n\s*Observation\s*:|\z)")
        .expect("valid action input regex")
});
static FINAL_ANSWER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?si)Final\s*Answer\s*:\s*(.*)\z").expect("valid final answer regex"));

/// Parse a provider reply in the `Action:` / `Action Input:` format.
///
/// Whichever of `Action:` or `Final Answer:` appears first wins.
pub fn parse_reasoning_reply(reply: &str) -> ReasoningReply {
    let action = ACTION_RE.captures(reply).and_then(|c| c.get(1));
    let final_answer = FINAL_ANSWER_RE.captures(reply).and_then(|c| c.get(1));

    let action_first = match (&action, &final_answer) {
        (Some(a), Some(f)) => a.start() < f.start(),
        (Some(_), None) => true,
        _ => false,
    };

    if action_first {
        if let Some(action) = action {
            let tool = clean_token(action.as_str());
            let input = ACTION_INPUT_RE
                .captures(&reply[action.end()..])
                .and_then(|c| c.get(1))
                .map(|m| strip_quotes(m.as_str()).to_string());
            return match input {
                Some(input) if !tool.is_empty() => ReasoningReply::Action { tool, input },
                _ => ReasoningReply::Unparseable,
            };
        }
    }

    match final_answer {
        Some(answer) => ReasoningReply::FinalAnswer(answer.as_str().trim().to_string()),
        None => ReasoningReply::Unparseable,
    }
}

fn clean_token(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '`' | '"' | '\'' | '[' | ']' | '*'))
        .trim()
        .to_string()
}

fn strip_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    for quote in ['"', '\'', '`'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        let reply = "Thought: necesito el clima\nAction: consultar_clima\nAction Input: guadalajara";
        assert_eq!(
            parse_reasoning_reply(reply),
            ReasoningReply::Action {
                tool: "consultar_clima".into(),
                input: "guadalajara".into()
            }
        );
    }

    #[test]
    fn test_parse_action_strips_decoration_and_hallucinated_observation() {
        let reply = "Action: `conversion_moneda`\nAction Input: \"100 USD a MXN\"\nObservation: 1850";
        assert_eq!(
            parse_reasoning_reply(reply),
            ReasoningReply::Action {
                tool: "conversion_moneda".into(),
                input: "100 USD a MXN".into()
            }
        );
    }

    #[test]
    fn test_parse_final_answer() {
        let reply = "Thought: ya sé la respuesta\nFinal Answer: Hola, ¿en qué te ayudo?";
        assert_eq!(
            parse_reasoning_reply(reply),
            ReasoningReply::FinalAnswer("Hola, ¿en qué te ayudo?".into())
        );
    }

    #[test]
    fn test_action_without_input_is_unparseable() {
        assert_eq!(
            parse_reasoning_reply("Action: consultar_estudiante"),
            ReasoningReply::Unparseable
        );
        assert_eq!(parse_reasoning_reply("no sé"), ReasoningReply::Unparseable);
    }

    #[test]
    fn test_prompt_contains_tools_history_and_scratchpad() {
        let history = vec![Turn::assistant("¡Hola!"), Turn::user("clima en cancun")];
        let scratch = vec![ScratchStep {
            reply: "Action: adivinar\nAction Input: x".into(),
            observation: "adivinar no es una herramienta válida".into(),
        }];
        let prompt = ReasoningPromptBuilder::new("convierte 100 USD a MXN")
            .with_tools([
                ToolDescription {
                    name: "consultar_clima",
                    description: "Consulta el clima actual de una ciudad",
                },
                ToolDescription {
                    name: "calculadora_financiera",
                    description: "Realiza cálculos financieros.\n  - 'prestamo 50000 18 24'",
                },
            ])
            .with_history(&history)
            .with_scratchpad(&scratch)
            .build();

        assert!(prompt.contains("- consultar_clima: Consulta el clima actual de una ciudad"));
        assert!(prompt.contains("\n    - 'prestamo 50000 18 24'"));
        assert!(prompt.contains("[consultar_clima, calculadora_financiera]"));
        assert!(prompt.contains("Usuario: clima en cancun"));
        assert!(prompt.contains("Asistente: ¡Hola!"));
        assert!(prompt.contains("Nueva pregunta: convierte 100 USD a MXN"));
        assert!(prompt.contains("Observation: adivinar no es una herramienta válida"));
        assert!(prompt.ends_with("Thought:"));

        let tools_at = prompt.find("- consultar_clima").unwrap();
        let calc_at = prompt.find("- calculadora_financiera").unwrap();
        assert!(tools_at < calc_at);
    }
}
