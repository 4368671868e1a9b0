//! Notices, maintenance tasks, and expense logging.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use uuid::Uuid;

use super::bulletin::{Expense, MaintenanceTask, Notice, TaskStatus};
use super::error::Error;
use super::ports::BulletinRepository;
use super::principal::AdminId;

/// Bulletin service for the admin-published record types.
#[derive(Clone)]
pub struct BulletinService {
    bulletins: Arc<dyn BulletinRepository>,
    clock: Arc<dyn Clock>,
}

impl BulletinService {
    /// Create a new service.
    pub fn new(bulletins: Arc<dyn BulletinRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { bulletins, clock }
    }

    /// Admin publishes a notice.
    pub async fn create_notice(
        &self,
        admin: AdminId,
        title: &str,
        body: &str,
    ) -> Result<Notice, Error> {
        let title = title.trim();
        let body = body.trim();
        if title.is_empty() || body.is_empty() {
            return Err(Error::invalid_request("title and body are required"));
        }
        let notice = Notice {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            body: body.to_owned(),
            created_by: admin,
            created_at: self.clock.utc(),
        };
        self.bulletins.insert_notice(&notice).await?;
        Ok(notice)
    }

    /// All notices, newest first. Residents and admins see the same list.
    pub async fn notices(&self) -> Result<Vec<Notice>, Error> {
        Ok(self.bulletins.list_notices().await?)
    }

    /// Admin schedules a maintenance task.
    pub async fn create_task(
        &self,
        admin: AdminId,
        title: &str,
        description: &str,
        scheduled_date: DateTime<Utc>,
        status: Option<TaskStatus>,
    ) -> Result<MaintenanceTask, Error> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::invalid_request("title is required"));
        }
        let task = MaintenanceTask {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            description: description.trim().to_owned(),
            scheduled_date,
            status: status.unwrap_or(TaskStatus::Pending),
            created_by: admin,
            created_at: self.clock.utc(),
        };
        self.bulletins.insert_task(&task).await?;
        Ok(task)
    }

    /// All tasks, latest scheduled date first.
    pub async fn tasks(&self) -> Result<Vec<MaintenanceTask>, Error> {
        Ok(self.bulletins.list_tasks().await?)
    }

    /// Admin updates a task's status.
    pub async fn set_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<MaintenanceTask, Error> {
        let mut task = self
            .bulletins
            .find_task(id)
            .await?
            .ok_or_else(|| Error::not_found("task not found"))?;
        task.status = status;
        self.bulletins.update_task(&task).await?;
        Ok(task)
    }

    /// Admin logs an expense.
    pub async fn create_expense(
        &self,
        admin: AdminId,
        title: &str,
        amount: i64,
        category: &str,
        description: &str,
        spent_on: DateTime<Utc>,
    ) -> Result<Expense, Error> {
        let title = title.trim();
        let category = category.trim();
        if title.is_empty() || category.is_empty() {
            return Err(Error::invalid_request("title and category are required"));
        }
        if amount <= 0 {
            return Err(Error::invalid_request("amount must be positive"));
        }
        let expense = Expense {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            amount,
            category: category.to_owned(),
            description: description.trim().to_owned(),
            spent_on,
            created_by: admin,
            created_at: self.clock.utc(),
        };
        self.bulletins.insert_expense(&expense).await?;
        Ok(expense)
    }

    /// All expenses, latest spend date first.
    pub async fn expenses(&self) -> Result<Vec<Expense>, Error> {
        Ok(self.bulletins.list_expenses().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::memory::MemoryStore;
    use chrono::TimeZone;
    use mockable::MockClock;
    use rstest::rstest;

    fn fixture_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 10, 8, 0, 0)
            .single()
            .expect("valid fixture instant")
    }

    fn service() -> BulletinService {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(fixture_now);
        BulletinService::new(Arc::new(MemoryStore::new()), Arc::new(clock))
    }

    #[rstest]
    #[actix_web::test]
    async fn notice_requires_title_and_body() {
        let service = service();
        let admin = AdminId::random();
        let err = service
            .create_notice(admin, "Water outage", "  ")
            .await
            .expect_err("blank body");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);

        service
            .create_notice(admin, "Water outage", "Tank cleaning on Saturday")
            .await
            .expect("valid notice");
        assert_eq!(service.notices().await.expect("list").len(), 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn task_status_updates_round_trip() {
        let service = service();
        let task = service
            .create_task(
                AdminId::random(),
                "Service the lift",
                "Annual contract visit",
                fixture_now(),
                None,
            )
            .await
            .expect("create task");
        assert_eq!(task.status, TaskStatus::Pending);

        let updated = service
            .set_task_status(task.id, TaskStatus::Completed)
            .await
            .expect("update");
        assert_eq!(updated.status, TaskStatus::Completed);

        let err = service
            .set_task_status(Uuid::new_v4(), TaskStatus::Completed)
            .await
            .expect_err("unknown task");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[actix_web::test]
    async fn expense_requires_positive_amount() {
        let service = service();
        let err = service
            .create_expense(
                AdminId::random(),
                "Diesel for generator",
                0,
                "Utilities",
                "",
                fixture_now(),
            )
            .await
            .expect_err("zero amount");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
