//! Registry construction from settings

use std::sync::Arc;

use bank_assistant_config::Settings;
use bank_assistant_core::{KnowledgeBase, ToolError};

use crate::calculator::FinancialCalculatorTool;
use crate::info::{HelpTool, SystemInfoTool};
use crate::knowledge::BankingKnowledgeTool;
use crate::lookup::{CurrencyConverterTool, CurrencyRateTable, WeatherTable, WeatherTool};
use crate::registry::{AgentTool, ToolRegistry};
use crate::student::{StudentLookupTool, StudentServiceClient};

/// Build the full registry in the order the reasoning prompt lists tools
pub fn build_registry(
    settings: &Settings,
    knowledge: Arc<dyn KnowledgeBase>,
) -> Result<ToolRegistry, ToolError> {
    let client = StudentServiceClient::new(&settings.student_service)
        .map_err(|e| ToolError::Unreachable(e.to_string()))?;

    let tools = [
        AgentTool::Knowledge(BankingKnowledgeTool::new(knowledge, settings.knowledge.top_k)),
        AgentTool::StudentLookup(StudentLookupTool::new(
            client,
            settings.student_service.max_listed,
        )),
        AgentTool::Calculator(FinancialCalculatorTool::new()),
        AgentTool::Weather(WeatherTool::new(WeatherTable::from_config(&settings.lookup))),
        AgentTool::Currency(CurrencyConverterTool::new(CurrencyRateTable::new(
            &settings.lookup.currency_rates,
        ))),
        AgentTool::SystemInfo(SystemInfoTool),
        AgentTool::Help(HelpTool),
    ];

    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register(tool)?;
    }

    tracing::info!(tools = ?registry.names(), "Tool registry ready");
    Ok(registry)
}
