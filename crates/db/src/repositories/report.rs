//! Report and support message repository.

use std::sync::Arc;

use crate::entities::{Report, report, support_message};
use galeria_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Repository for moderation reports and support requests.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Store a report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove reports filed about an item.
    pub async fn delete_by_item(&self, item_id: &str) -> AppResult<u64> {
        let result = Report::delete_many()
            .filter(report::Column::ItemId.eq(item_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Store a support request.
    pub async fn create_support_message(
        &self,
        model: support_message::ActiveModel,
    ) -> AppResult<support_message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::mock;

    #[tokio::test]
    async fn test_delete_by_item_reports_removed_rows() {
        let db = mock::connect(mock::postgres().append_exec_results([mock::exec(2)]));

        let repo = ReportRepository::new(db);
        assert_eq!(repo.delete_by_item("photo1").await.unwrap(), 2);
    }
}
