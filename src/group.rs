use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Group (chat) metadata as reported by the messaging backend.
///
/// Instances belong to whichever consumer requested them; they are
/// reconciled with [`crate::merge::GroupMergeStrategy`] rather than
/// stored in the shared identity cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMetadata {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(
        default,
        rename = "membersCount",
        deserialize_with = "count_or_nothing"
    )]
    pub members_count: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "list_or_empty")]
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub jid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Participant {
    pub fn new(jid: &str) -> Self {
        Self {
            jid: jid.to_owned(),
            admin: None,
            extra: BTreeMap::new(),
        }
    }
}

impl GroupMetadata {
    /// Non-blank participant JIDs, in list order.
    pub fn participant_jids(&self) -> Vec<String> {
        self.participants
            .iter()
            .map(|p| p.jid.as_str())
            .filter(|jid| !jid.trim().is_empty())
            .map(str::to_owned)
            .collect()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn count_or_nothing<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| v.as_u64()))
}

fn list_or_empty<'de, D>(deserializer: D) -> Result<Vec<Participant>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Participant>>::deserialize(deserializer)?.unwrap_or_default())
}
