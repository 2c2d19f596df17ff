//! Content reports and support requests.

use chrono::Utc;
use galeria_common::{AppError, AppResult, IdGenerator};
use galeria_db::{
    entities::{
        report::{self, ReportItemType, ReportStatus},
        support_message::{self, SupportStatus},
        user,
    },
    repositories::{ReportRepository, UserRepository},
};
use sea_orm::Set;

/// Input for reporting a piece of content.
#[derive(Debug, Clone)]
pub struct CreateReportInput {
    pub item_id: String,
    pub item_type: ReportItemType,
    pub reason: String,
    pub description: Option<String>,
}

/// Input for a support request.
#[derive(Debug, Clone)]
pub struct SupportRequestInput {
    pub subject: String,
    pub message: String,
}

/// Report service for business logic.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(report_repo: ReportRepository, user_repo: UserRepository) -> Self {
        Self {
            report_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// File a report about a photo, album, comment or user.
    pub async fn report(
        &self,
        reporter: &user::Model,
        input: CreateReportInput,
    ) -> AppResult<report::Model> {
        let reason = input.reason.trim();
        if input.item_id.is_empty() || reason.is_empty() {
            return Err(AppError::BadRequest("Item and reason are required".to_string()));
        }

        let created = self
            .report_repo
            .create(report::ActiveModel {
                id: Set(self.id_gen.generate()),
                reporter_id: Set(reporter.id.clone()),
                item_id: Set(input.item_id),
                item_type: Set(input.item_type),
                reason: Set(reason.to_string()),
                description: Set(input.description.filter(|d| !d.trim().is_empty())),
                status: Set(ReportStatus::Pending),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        tracing::info!(report_id = %created.id, item_id = %created.item_id, "Report filed");
        Ok(created)
    }

    /// Report a user profile.
    pub async fn report_profile(
        &self,
        reporter: &user::Model,
        reported_user_id: &str,
        reason: &str,
    ) -> AppResult<report::Model> {
        let reported = self.user_repo.get_by_id(reported_user_id).await?;
        self.report(
            reporter,
            CreateReportInput {
                item_id: reported.id,
                item_type: ReportItemType::User,
                reason: reason.to_string(),
                description: None,
            },
        )
        .await
    }

    /// Store a support request.
    pub async fn request_support(
        &self,
        user: &user::Model,
        input: SupportRequestInput,
    ) -> AppResult<support_message::Model> {
        let subject = input.subject.trim();
        let message = input.message.trim();

        if !(3..=100).contains(&subject.chars().count()) {
            return Err(AppError::BadRequest(
                "Subject must be between 3 and 100 characters".to_string(),
            ));
        }
        if !(5..=1000).contains(&message.chars().count()) {
            return Err(AppError::BadRequest(
                "Message must be between 5 and 1000 characters".to_string(),
            ));
        }

        self.report_repo
            .create_support_message(support_message::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user.id.clone()),
                subject: Set(subject.to_string()),
                message: Set(message.to_string()),
                status: Set(SupportStatus::Pending),
                created_at: Set(Utc::now().into()),
            })
            .await
    }
}
