//! Tool Registry
//!
//! The assistant's tools form a closed set of variants behind one contract.
//! The registry keeps them in registration order (the order the reasoning
//! prompt lists them) and resolves them by name or by [`ToolId`].

use std::time::{Duration, Instant};

use async_trait::async_trait;

use bank_assistant_core::{Tool, ToolError};

use crate::calculator::{self, FinancialCalculatorTool};
use crate::info::{self, HelpTool, SystemInfoTool};
use crate::knowledge::{self, BankingKnowledgeTool};
use crate::lookup::{self, CurrencyConverterTool, WeatherTool};
use crate::student::{self, StudentLookupTool};

/// Stable identifier for each tool variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    Knowledge,
    StudentLookup,
    Calculator,
    Weather,
    Currency,
    SystemInfo,
    Help,
}

impl ToolId {
    /// Registered name of the tool
    pub fn name(&self) -> &'static str {
        match self {
            ToolId::Knowledge => knowledge::NAME,
            ToolId::StudentLookup => student::NAME,
            ToolId::Calculator => calculator::NAME,
            ToolId::Weather => lookup::WEATHER_NAME,
            ToolId::Currency => lookup::CURRENCY_NAME,
            ToolId::SystemInfo => info::SYSTEM_INFO_NAME,
            ToolId::Help => info::HELP_NAME,
        }
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One registered tool
#[derive(Debug, Clone)]
pub enum AgentTool {
    Knowledge(BankingKnowledgeTool),
    StudentLookup(StudentLookupTool),
    Calculator(FinancialCalculatorTool),
    Weather(WeatherTool),
    Currency(CurrencyConverterTool),
    SystemInfo(SystemInfoTool),
    Help(HelpTool),
}

impl AgentTool {
    pub fn id(&self) -> ToolId {
        match self {
            AgentTool::Knowledge(_) => ToolId::Knowledge,
            AgentTool::StudentLookup(_) => ToolId::StudentLookup,
            AgentTool::Calculator(_) => ToolId::Calculator,
            AgentTool::Weather(_) => ToolId::Weather,
            AgentTool::Currency(_) => ToolId::Currency,
            AgentTool::SystemInfo(_) => ToolId::SystemInfo,
            AgentTool::Help(_) => ToolId::Help,
        }
    }

    fn as_tool(&self) -> &dyn Tool {
        match self {
            AgentTool::Knowledge(t) => t,
            AgentTool::StudentLookup(t) => t,
            AgentTool::Calculator(t) => t,
            AgentTool::Weather(t) => t,
            AgentTool::Currency(t) => t,
            AgentTool::SystemInfo(t) => t,
            AgentTool::Help(t) => t,
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        self.as_tool().name()
    }

    fn description(&self) -> &str {
        self.as_tool().description()
    }

    async fn invoke(&self, input: &str) -> String {
        self.as_tool().invoke(input).await
    }
}

/// Name + description pair, as listed to the reasoning provider and the API
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
}

/// Ordered tool registry with unique names
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<AgentTool>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Append a tool; a second tool with the same name is rejected
    pub fn register(&mut self, tool: AgentTool) -> Result<(), ToolError> {
        if self.has(tool.name()) {
            return Err(ToolError::DuplicateName(tool.name().to_string()));
        }
        tracing::debug!(tool = tool.name(), "Registered tool");
        self.tools.push(tool);
        Ok(())
    }

    /// Get tool by name
    pub fn get(&self, name: &str) -> Option<&AgentTool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn get_by_id(&self, id: ToolId) -> Option<&AgentTool> {
        self.tools.iter().find(|t| t.id() == id)
    }

    /// Check if tool exists
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentTool> {
        self.tools.iter()
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn summaries(&self) -> Vec<ToolSummary> {
        self.tools
            .iter()
            .map(|t| ToolSummary {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Get number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name, bounded by `timeout`
    pub async fn execute(
        &self,
        name: &str,
        input: &str,
        timeout: Duration,
    ) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::not_found(format!("Tool not found: {}", name)))?;
        self.run(tool, input, timeout).await
    }

    /// Invoke a tool by id, bounded by `timeout`
    pub async fn execute_id(
        &self,
        id: ToolId,
        input: &str,
        timeout: Duration,
    ) -> Result<String, ToolError> {
        let tool = self
            .get_by_id(id)
            .ok_or_else(|| ToolError::not_found(format!("Tool not found: {}", id)))?;
        self.run(tool, input, timeout).await
    }

    async fn run(
        &self,
        tool: &AgentTool,
        input: &str,
        timeout: Duration,
    ) -> Result<String, ToolError> {
        let start = Instant::now();
        tracing::trace!(tool = tool.name(), timeout_ms = timeout.as_millis() as u64, "Executing tool");

        match tokio::time::timeout(timeout, tool.invoke(input)).await {
            Ok(output) => {
                tracing::debug!(
                    tool = tool.name(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Tool finished"
                );
                Ok(output)
            },
            Err(_elapsed) => Err(ToolError::timeout(tool.name(), timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(AgentTool::Calculator(FinancialCalculatorTool::new()))
            .unwrap();
        registry
            .register(AgentTool::Weather(WeatherTool::default()))
            .unwrap();
        registry
            .register(AgentTool::Help(HelpTool))
            .unwrap();
        registry
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let registry = registry();
        assert_eq!(
            registry.names(),
            vec!["calculadora_financiera", "consultar_clima", "ayuda_general"]
        );
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = registry();
        let err = registry
            .register(AgentTool::Weather(WeatherTool::default()))
            .unwrap_err();
        assert_eq!(err, ToolError::DuplicateName("consultar_clima".to_string()));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_lookup_by_name_and_id() {
        let registry = registry();
        assert_eq!(registry.get("consultar_clima").unwrap().id(), ToolId::Weather);
        assert_eq!(
            registry.get_by_id(ToolId::Calculator).unwrap().name(),
            ToolId::Calculator.name()
        );
        assert!(registry.get("conversion_moneda").is_none());
        assert!(registry.get_by_id(ToolId::Currency).is_none());
    }

    #[tokio::test]
    async fn test_execute() {
        let registry = registry();
        let output = registry
            .execute("consultar_clima", "monterrey", Duration::from_secs(1))
            .await
            .unwrap();
        assert!(output.contains("Despejado"));

        let output = registry
            .execute_id(ToolId::Help, "", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(output, info::HELP_TEXT);

        let err = registry
            .execute("no_existe", "", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }
}
