//! Rule-based command router. Free text plus pre-extracted entities select one
//! inventory handler; the handler's result is rendered as an [`AgentResponse`].

mod handlers;
pub mod router;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

pub use router::CommandRouter;

/// Entity kinds the router reads; anything else is carried but ignored.
pub mod entity {
    pub const ITEM: &str = "item";
    pub const QUANTITY: &str = "quantity";
    pub const UNIT: &str = "unit";
    pub const LOCATION: &str = "location";
    pub const FROM_LOCATION: &str = "from_location";
    pub const TO_LOCATION: &str = "to_location";
}

/// Context key naming the location used when a command gives none.
pub const DEFAULT_LOCATION_KEY: &str = "default_location";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Entity {
    #[serde(rename = "type")]
    #[schema(example = "item")]
    pub entity_type: String,
    #[schema(example = "apples")]
    pub value: String,
}

impl Entity {
    pub fn new(entity_type: &str, value: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AgentRequest {
    #[schema(example = "check stock level for apples")]
    pub command: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub context: HashMap<String, Value>,
}

impl AgentRequest {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity_type: &str, value: &str) -> Self {
        self.entities.push(Entity::new(entity_type, value));
        self
    }

    /// Non-blank values of one entity kind, in request order.
    pub fn values(&self, kind: &str) -> Vec<&str> {
        self.entities
            .iter()
            .filter(|e| e.entity_type.eq_ignore_ascii_case(kind))
            .map(|e| e.value.trim())
            .filter(|v| !v.is_empty())
            .collect()
    }

    pub fn first(&self, kind: &str) -> Option<&str> {
        self.values(kind).into_iter().next()
    }

    /// Leading integer of the first `quantity` entity ("12", "12 kg").
    pub fn quantity(&self) -> AppResult<Option<i64>> {
        let Some(raw) = self.first(entity::QUANTITY) else {
            return Ok(None);
        };
        let token = raw.split_whitespace().next().unwrap_or_default();
        token
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::validation(format!("quantity '{}' is not a whole number", raw)))
    }

    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    LowStock,
    Reorder,
    Transfer,
    AddItem,
    StockCheck,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AgentAction {
    #[serde(rename = "type")]
    #[schema(example = "show_stock")]
    pub action_type: String,
    pub label: String,
    #[schema(value_type = Object)]
    pub data: Value,
}

impl AgentAction {
    pub fn new(action_type: &str, label: impl Into<String>, data: Value) -> Self {
        Self {
            action_type: action_type.to_string(),
            label: label.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AgentResponse {
    pub text: String,
    pub actions: Vec<AgentAction>,
    pub status: AgentStatus,
    pub intent: Intent,
}

impl AgentResponse {
    pub fn success(intent: Intent, text: impl Into<String>, actions: Vec<AgentAction>) -> Self {
        Self {
            text: text.into(),
            actions,
            status: AgentStatus::Success,
            intent,
        }
    }

    pub fn error(intent: Intent, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            actions: Vec::new(),
            status: AgentStatus::Error,
            intent,
        }
    }
}
