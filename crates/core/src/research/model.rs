//! Research result model definitions

use serde::{Deserialize, Serialize};

/// Reviewer decision on a recommended item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(rename = "Needs Review")]
    NeedsReview,
}

impl Default for ApprovalStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// One recommended item, normalized for review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRow {
    pub item_service: String,
    /// Cost per unit in dollars
    pub cost: f64,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub cpt_code: String,
    #[serde(default)]
    pub comment: String,
    /// Source URLs, one per line
    #[serde(default)]
    pub sources: String,
    #[serde(default)]
    pub doctor_approval: ApprovalStatus,
    #[serde(default)]
    pub doctor_notes: String,
}

impl ReviewRow {
    pub fn new(item_service: impl Into<String>, cost: f64) -> Self {
        Self {
            item_service: item_service.into(),
            cost,
            frequency: String::new(),
            cpt_code: String::new(),
            comment: String::new(),
            sources: String::new(),
            doctor_approval: ApprovalStatus::Pending,
            doctor_notes: String::new(),
        }
    }

    pub fn with_approval(mut self, approval: ApprovalStatus) -> Self {
        self.doctor_approval = approval;
        self
    }
}

/// A category of recommendations (medications, equipment, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchCategory {
    /// Key as it appeared in the agent's JSON
    pub key: String,
    /// Display label
    pub label: String,
    pub rows: Vec<ReviewRow>,
}

/// Structured research result, categories in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchData {
    pub categories: Vec<ResearchCategory>,
}

impl ResearchData {
    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.rows.is_empty())
    }

    pub fn category(&self, key: &str) -> Option<&ResearchCategory> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.rows.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_serde_names() {
        assert_eq!(
            serde_json::to_value(ApprovalStatus::NeedsReview).unwrap(),
            "Needs Review"
        );
        let status: ApprovalStatus = serde_json::from_str("\"Approved\"").unwrap();
        assert_eq!(status, ApprovalStatus::Approved);
    }

    #[test]
    fn test_row_defaults_on_deserialize() {
        let row: ReviewRow =
            serde_json::from_str(r#"{"itemService":"Walker","cost":99.5}"#).unwrap();
        assert_eq!(row.item_service, "Walker");
        assert_eq!(row.doctor_approval, ApprovalStatus::Pending);
        assert!(row.doctor_notes.is_empty());
    }

    #[test]
    fn test_empty_data() {
        let data = ResearchData {
            categories: vec![ResearchCategory {
                key: "medications".to_string(),
                label: "Medications".to_string(),
                rows: vec![],
            }],
        };
        assert!(data.is_empty());
        assert_eq!(data.item_count(), 0);
        assert!(data.category("medications").is_some());
    }
}
