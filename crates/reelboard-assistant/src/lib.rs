//! LLM-backed helpers: posting-calendar generation and video-script drafting
//! through the `OpenRouter` chat-completions API.

pub mod calendar;
pub mod client;
pub mod error;
pub mod script;

pub use calendar::{is_expired, CalendarPlan, EventColor, EventData, WeekColumn};
pub use client::OpenRouterClient;
pub use error::AssistantError;
