use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One entry of the recent-activity feed (`GET /activity/recent`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: String,
    /// Unix seconds
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub details: Option<Map<String, JsonValue>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityResponse {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub items: Vec<ActivityItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_sparse_items() {
        let body = r#"{"count":2,"items":[
            {"type":"certificate_onchain","timestamp":1700000000,"actor":"0xabc","details":{"amount":"2.5"}},
            {"type":"inspection","tx_hash":null}
        ]}"#;
        let response: ActivityResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].kind, "certificate_onchain");
        assert_eq!(response.items[1].actor, None);
        assert_eq!(response.items[1].tx_hash, None);
    }

    #[test]
    fn test_missing_items_defaults_to_empty() {
        let response: ActivityResponse = serde_json::from_str(r#"{"count":0}"#).unwrap();
        assert!(response.items.is_empty());
    }
}
