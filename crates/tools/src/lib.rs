//! Tools for the banking assistant
//!
//! Every tool implements [`bank_assistant_core::Tool`]: text in, text out,
//! failures rendered as messages. The set is closed ([`AgentTool`]) and
//! held in an ordered [`ToolRegistry`].

pub mod calculator;
pub mod factory;
pub mod info;
pub mod knowledge;
pub mod lookup;
pub mod registry;
pub mod student;

pub use calculator::{parse_calculation, Calculation, CalculationParseError, FinancialCalculatorTool};
pub use factory::build_registry;
pub use info::{HelpTool, SystemInfoTool, HELP_TEXT, SYSTEM_INFO, WELCOME};
pub use knowledge::{
    knowledge_base_from_config, BankingKnowledgeTool, HttpKnowledgeBase, UnavailableKnowledgeBase,
};
pub use lookup::{
    parse_conversion, ConversionRequest, CurrencyConverterTool, CurrencyRateTable, WeatherTable,
    WeatherTool,
};
pub use registry::{AgentTool, ToolId, ToolRegistry, ToolSummary};
pub use student::{ServiceError, StudentLookupTool, StudentRecord, StudentServiceClient};

pub use bank_assistant_core::{Tool, ToolError};
