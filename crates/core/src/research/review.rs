//! Doctor review board
//!
//! Holds the reviewer's editable copy of each category's rows. Seeding only
//! fills categories that are missing or empty, so re-rendering a result
//! never clobbers edits.

use serde::{Deserialize, Serialize};

use super::model::{ApprovalStatus, ResearchData, ReviewRow};
use crate::error::Error;
use crate::Result;

/// Approval counts for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
}

impl ReviewSummary {
    pub fn from_rows(rows: &[ReviewRow]) -> Self {
        let count = |status: ApprovalStatus| rows.iter().filter(|r| r.doctor_approval == status).count();
        Self {
            approved: count(ApprovalStatus::Approved),
            rejected: count(ApprovalStatus::Rejected),
            pending: count(ApprovalStatus::Pending),
        }
    }
}

/// Reviewer state for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReview {
    pub key: String,
    pub label: String,
    pub rows: Vec<ReviewRow>,
}

impl CategoryReview {
    pub fn summary(&self) -> ReviewSummary {
        ReviewSummary::from_rows(&self.rows)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewBoard {
    categories: Vec<CategoryReview>,
}

impl ReviewBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(&self) -> &[CategoryReview] {
        &self.categories
    }

    pub fn get(&self, key: &str) -> Option<&CategoryReview> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn clear(&mut self) {
        self.categories.clear();
    }

    /// Copy parsed rows in, leaving already-reviewed categories alone
    pub fn seed(&mut self, data: &ResearchData) {
        for category in &data.categories {
            if category.rows.is_empty() {
                continue;
            }
            match self.categories.iter_mut().find(|c| c.key == category.key) {
                Some(existing) if !existing.rows.is_empty() => {}
                Some(existing) => existing.rows = category.rows.clone(),
                None => self.categories.push(CategoryReview {
                    key: category.key.clone(),
                    label: category.label.clone(),
                    rows: category.rows.clone(),
                }),
            }
        }
    }

    /// Replace a category's rows with the reviewer's edited table.
    ///
    /// Rows may be added or removed; costs must be non-negative.
    pub fn replace_rows(&mut self, key: &str, rows: Vec<ReviewRow>) -> Result<&CategoryReview> {
        if let Some(bad) = rows.iter().find(|r| !(r.cost.is_finite() && r.cost >= 0.0)) {
            return Err(Error::InvalidInput(format!(
                "Cost for '{}' must be a non-negative amount",
                bad.item_service
            )));
        }

        let category = self
            .categories
            .iter_mut()
            .find(|c| c.key == key)
            .ok_or_else(|| Error::NotFound(format!("Review category {}", key)))?;
        category.rows = rows;
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::parse_research_result;

    fn sample() -> ResearchData {
        parse_research_result(
            r#"{
                "durable_medical_equipment": [
                    {"item_name": "Walker", "price": 99},
                    {"item_name": "Hospital bed", "price": 1800}
                ],
                "medications": [{"item_name": "Baclofen", "price": "12.50"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_seed_populates_categories() {
        let mut board = ReviewBoard::new();
        board.seed(&sample());

        assert_eq!(board.categories().len(), 2);
        let dme = board.get("durable_medical_equipment").unwrap();
        assert_eq!(dme.rows.len(), 2);
        assert_eq!(
            dme.summary(),
            ReviewSummary {
                approved: 0,
                rejected: 0,
                pending: 2
            }
        );
    }

    #[test]
    fn test_seed_keeps_reviewer_edits() {
        let mut board = ReviewBoard::new();
        board.seed(&sample());

        let edited = vec![ReviewRow::new("Walker", 110.0).with_approval(ApprovalStatus::Approved)];
        board
            .replace_rows("durable_medical_equipment", edited.clone())
            .unwrap();

        board.seed(&sample());
        assert_eq!(board.get("durable_medical_equipment").unwrap().rows, edited);
    }

    #[test]
    fn test_replace_rows_counts() {
        let mut board = ReviewBoard::new();
        board.seed(&sample());

        let rows = vec![
            ReviewRow::new("Walker", 99.0).with_approval(ApprovalStatus::Approved),
            ReviewRow::new("Hospital bed", 1800.0).with_approval(ApprovalStatus::Rejected),
            ReviewRow::new("Cushion", 350.0).with_approval(ApprovalStatus::NeedsReview),
            ReviewRow::new("Trapeze", 210.0),
        ];
        let summary = board
            .replace_rows("durable_medical_equipment", rows)
            .unwrap()
            .summary();

        assert_eq!(summary.approved, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.pending, 1);
    }

    #[test]
    fn test_replace_rows_rejects_negative_cost() {
        let mut board = ReviewBoard::new();
        board.seed(&sample());

        let result = board.replace_rows("medications", vec![ReviewRow::new("Baclofen", -1.0)]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_replace_rows_unknown_category() {
        let mut board = ReviewBoard::new();
        let result = board.replace_rows("prosthetics", vec![]);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
