//! Semantic edit commands as they arrive from an editing surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::NodeId;
use crate::error::StructeditError;

pub const COMMAND_KINDS: [&str; 8] = [
    "simpleSwap",
    "addObjectKey",
    "addElementAsSiblingInArray",
    "removeObjectKey",
    "removeElementFromArray",
    "increaseItemIdx",
    "decreaseItemIdx",
    "nullEvent",
];

/// Literal source fragments for a new object member, e.g. `"\"x\""` and `"1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn entry(&self) -> String {
        format!("{}: {}", self.key, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase",
    deny_unknown_fields
)]
pub enum EditCommand {
    SimpleSwap {
        payload: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_id: Option<NodeId>,
    },
    AddObjectKey {
        payload: KeyValue,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_id: Option<NodeId>,
    },
    AddElementAsSiblingInArray {
        payload: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_id: Option<NodeId>,
    },
    RemoveObjectKey {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_id: Option<NodeId>,
    },
    RemoveElementFromArray {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_id: Option<NodeId>,
    },
    IncreaseItemIdx {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_id: Option<NodeId>,
    },
    DecreaseItemIdx {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_id: Option<NodeId>,
    },
    /// Reserved for affordances that have no edit behind them yet.
    NullEvent {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_id: Option<NodeId>,
    },
}

impl EditCommand {
    /// Decode a command from its JSON wire form.
    ///
    /// An unknown `type` tag yields [`StructeditError::UnsupportedCommand`]
    /// rather than a generic decode error so callers can degrade to a no-op.
    pub fn from_json(raw: &str) -> Result<Self, StructeditError> {
        let value = serde_json::from_str::<Value>(raw)
            .map_err(|source| StructeditError::InvalidJsonRequest { source })?;

        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| StructeditError::InvalidRequest {
                message: "edit command requires a string 'type' field".to_string(),
            })?;
        if !COMMAND_KINDS.contains(&tag) {
            return Err(StructeditError::UnsupportedCommand {
                tag: tag.to_string(),
            });
        }

        serde_json::from_value(value).map_err(|source| StructeditError::InvalidJsonRequest { source })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::SimpleSwap { .. } => "simpleSwap",
            Self::AddObjectKey { .. } => "addObjectKey",
            Self::AddElementAsSiblingInArray { .. } => "addElementAsSiblingInArray",
            Self::RemoveObjectKey { .. } => "removeObjectKey",
            Self::RemoveElementFromArray { .. } => "removeElementFromArray",
            Self::IncreaseItemIdx { .. } => "increaseItemIdx",
            Self::DecreaseItemIdx { .. } => "decreaseItemIdx",
            Self::NullEvent { .. } => "nullEvent",
        }
    }

    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Self::SimpleSwap { node_id, .. }
            | Self::AddObjectKey { node_id, .. }
            | Self::AddElementAsSiblingInArray { node_id, .. }
            | Self::RemoveObjectKey { node_id }
            | Self::RemoveElementFromArray { node_id }
            | Self::IncreaseItemIdx { node_id }
            | Self::DecreaseItemIdx { node_id }
            | Self::NullEvent { node_id } => node_id.as_ref(),
        }
    }

    /// Replace the explicit target, e.g. after resolving a key path.
    pub fn with_node_id(mut self, id: NodeId) -> Self {
        match &mut self {
            Self::SimpleSwap { node_id, .. }
            | Self::AddObjectKey { node_id, .. }
            | Self::AddElementAsSiblingInArray { node_id, .. }
            | Self::RemoveObjectKey { node_id }
            | Self::RemoveElementFromArray { node_id }
            | Self::IncreaseItemIdx { node_id }
            | Self::DecreaseItemIdx { node_id }
            | Self::NullEvent { node_id } => *node_id = Some(id),
        }
        self
    }
}
