//! Core traits and types for the banking assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Capability traits (tools, reasoning provider, knowledge system)
//! - Error taxonomy
//! - Conversation turns and the append-only session log
//! - The pure financial engine (loan, savings, interest)
//! - Presentation formatting

pub mod conversation;
pub mod error;
pub mod finance;
pub mod format;
pub mod traits;

pub use conversation::{ConversationLog, Turn, TurnRole};
pub use error::{CalculatorError, Error, Result, ToolError};
pub use finance::{
    compute_interest, compute_loan, compute_savings, InterestBreakdown, InterestInput,
    LoanBreakdown, LoanInput, SavingsBreakdown, SavingsInput,
};
pub use format::{format_amount, format_decimal, format_money, format_rate};
pub use traits::{KnowledgeAnswer, KnowledgeBase, ReasoningProvider, Tool};
