//! Posting-calendar generation through a forced `generate_calendar` tool
//! call, plus the expiry rule that drives regeneration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::OpenRouterClient;
use crate::error::AssistantError;

pub const CALENDAR_TOOL_NAME: &str = "generate_calendar";

/// Tailwind height classes the dashboard knows how to render.
pub const EVENT_HEIGHTS: [&str; 5] = ["h-24", "h-32", "h-36", "h-40", "h-48"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    Red,
    Blue,
    Sky,
    Lime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub id: i64,
    pub title: String,
    pub time: String,
    pub color: EventColor,
    pub height: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekColumn {
    pub day: String,
    pub events: Vec<EventData>,
}

/// Arguments of the `generate_calendar` tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarPlan {
    pub weeks: Vec<WeekColumn>,
    /// `YYYY-MM-DD`
    pub expires: String,
}

/// `true` when `expires` is missing, not a `YYYY-MM-DD` date, or before `today`.
#[must_use]
pub fn is_expired(expires: Option<&str>, today: NaiveDate) -> bool {
    expires
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
        .is_none_or(|date| date < today)
}

#[must_use]
pub fn calendar_system_prompt(preferences: &Value, today: NaiveDate) -> String {
    let heights = EVENT_HEIGHTS
        .iter()
        .map(|h| format!("\"{h}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Você é um gerador de calendário de postagens altamente estruturado.\n\
         Siga as preferências abaixo para criar um calendário detalhado para o usuário.\n\
         Preferências do usuário: {preferences}\n\
         Hoje é {today}.\n\
         Crie pelo menos duas semanas completas usando SOMENTE o formato do schema \
         (WeekColumn -> EventData[]).\n\
         Tipos:\n\
         - EventData: {{ id: number; title: string; time: string; color: \"red\" | \"blue\" | \"sky\" | \"lime\"; height: string }}\n\
         - WeekColumn: {{ day: string; events: EventData[] }}\n\
         Regras obrigatórias:\n\
         - 7 dias por semana.\n\
         - 1 a 3 eventos por dia.\n\
         - Alturas válidas: {heights}.\n\
         - Inclua \"expires\" no formato YYYY-MM-DD com a data do último dia do calendário.\n\
         Nunca gere texto fora da chamada da ferramenta.",
        today = today.format("%Y-%m-%d"),
    )
}

/// JSON schema for the `generate_calendar` tool.
#[must_use]
pub fn calendar_tool() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": CALENDAR_TOOL_NAME,
            "description": "Gera o calendário no formato WeekColumn[] + expires",
            "parameters": {
                "type": "object",
                "properties": {
                    "weeks": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "day": {"type": "string"},
                                "events": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "properties": {
                                            "id": {"type": "number"},
                                            "title": {"type": "string"},
                                            "time": {"type": "string"},
                                            "color": {
                                                "type": "string",
                                                "enum": ["red", "blue", "sky", "lime"]
                                            },
                                            "height": {"type": "string"}
                                        },
                                        "required": ["id", "title", "time", "color", "height"]
                                    }
                                }
                            },
                            "required": ["day", "events"]
                        }
                    },
                    "expires": {"type": "string"}
                },
                "required": ["weeks", "expires"]
            }
        }
    })
}

/// Reads the plan out of `choices[0].message.tool_calls[0]`.
///
/// # Errors
///
/// - [`AssistantError::MissingToolCall`] if there is no tool call or it
///   names a different function.
/// - [`AssistantError::Deserialize`] if the arguments do not match
///   [`CalendarPlan`].
pub fn parse_calendar_response(response: &Value) -> Result<CalendarPlan, AssistantError> {
    let missing = || AssistantError::MissingToolCall {
        expected: CALENDAR_TOOL_NAME.to_string(),
    };
    let function = response
        .pointer("/choices/0/message/tool_calls/0/function")
        .ok_or_else(missing)?;
    if function.get("name").and_then(Value::as_str) != Some(CALENDAR_TOOL_NAME) {
        return Err(missing());
    }

    // Arguments arrive as a JSON-encoded string; some providers send an object.
    let context = || format!("{CALENDAR_TOOL_NAME} arguments");
    match function.get("arguments") {
        Some(Value::String(raw)) => {
            serde_json::from_str(raw).map_err(|source| AssistantError::Deserialize {
                context: context(),
                source,
            })
        }
        Some(other) => serde_json::from_value(other.clone()).map_err(|source| {
            AssistantError::Deserialize {
                context: context(),
                source,
            }
        }),
        None => Err(missing()),
    }
}

impl OpenRouterClient {
    /// Asks the model for a calendar built from `preferences` (the stored
    /// user document), starting at `today`.
    ///
    /// # Errors
    ///
    /// Returns any error from [`OpenRouterClient::chat_completion`] or
    /// [`parse_calendar_response`].
    pub async fn generate_calendar(
        &self,
        preferences: &Value,
        today: NaiveDate,
    ) -> Result<CalendarPlan, AssistantError> {
        let payload = json!({
            "messages": [
                {"role": "system", "content": calendar_system_prompt(preferences, today)}
            ],
            "tools": [calendar_tool()],
            "tool_choice": {"type": "function", "function": {"name": CALENDAR_TOOL_NAME}},
        });
        let response = self.chat_completion(payload).await?;
        let plan = parse_calendar_response(&response).inspect_err(|e| {
            tracing::error!(error = %e, "calendar completion was unusable");
        })?;
        tracing::info!(
            weeks = plan.weeks.len(),
            expires = %plan.expires,
            "calendar generated"
        );
        Ok(plan)
    }
}
