//! Row structs mapping between the PostgreSQL schema and domain entities.
//!
//! Status columns persist the canonical string forms; reads parse them back
//! and fall back with a warning if a row carries an unrecognised value, so a
//! bad migration never panics the read path.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::warn;
use uuid::Uuid;

use crate::domain::account::{Admin, EmailAddress, LoginId, Resident};
use crate::domain::booking::{Booking, BookingStatus, BookingWindow};
use crate::domain::bulletin::{Expense, MaintenanceTask, Notice, TaskStatus};
use crate::domain::due::{Due, DueStatus};
use crate::domain::guest_pass::{GuestPass, GuestPassStatus};
use crate::domain::marketplace::{ItemStatus, MarketplaceItem};
use crate::domain::principal::{AdminId, ResidentId};
use crate::domain::ticket::{Ticket, TicketCategory, TicketPriority, TicketStatus};

use super::schema::{
    admins, bookings, dues, expenses, guest_passes, maintenance_tasks, marketplace_items, notices,
    poll_options, polls, residents, tickets,
};

/// Parse a persisted enum string, warning and substituting on mismatch.
fn parse_or<T: FromStr + Copy>(raw: &str, fallback: T, table: &str) -> T {
    T::from_str(raw).unwrap_or_else(|_| {
        warn!(value = raw, table, "unrecognised status value in row");
        fallback
    })
}

/// Parse a stored login id, substituting a placeholder for corrupt rows.
fn parse_login_id(raw: String, table: &str) -> LoginId {
    LoginId::new(raw).unwrap_or_else(|err| {
        warn!(%err, table, "invalid login id in row");
        LoginId::new("unknown").unwrap_or_else(|_| unreachable!("literal is valid"))
    })
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = residents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ResidentRow {
    pub id: Uuid,
    pub name: String,
    pub login_id: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Resident> for ResidentRow {
    fn from(resident: &Resident) -> Self {
        Self {
            id: *resident.id.as_uuid(),
            name: resident.name.clone(),
            login_id: resident.login_id.as_str().to_owned(),
            email: resident.email.as_str().to_owned(),
            phone: resident.phone.clone(),
            password_hash: resident.password_hash.clone(),
            created_at: resident.created_at,
            updated_at: resident.created_at,
        }
    }
}

impl From<ResidentRow> for Resident {
    fn from(row: ResidentRow) -> Self {
        Self {
            id: ResidentId::from_uuid(row.id),
            name: row.name,
            login_id: parse_login_id(row.login_id, "residents"),
            email: EmailAddress::new(row.email.clone()).unwrap_or_else(|err| {
                warn!(%err, "invalid email in residents row");
                EmailAddress::new("unknown@invalid")
                    .unwrap_or_else(|_| unreachable!("literal is valid"))
            }),
            phone: row.phone,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = admins)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AdminRow {
    pub id: Uuid,
    pub login_id: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Admin> for AdminRow {
    fn from(admin: &Admin) -> Self {
        Self {
            id: *admin.id.as_uuid(),
            login_id: admin.login_id.as_str().to_owned(),
            password_hash: admin.password_hash.clone(),
            created_at: admin.created_at,
        }
    }
}

impl From<AdminRow> for Admin {
    fn from(row: AdminRow) -> Self {
        Self {
            id: AdminId::from_uuid(row.id),
            login_id: parse_login_id(row.login_id, "admins"),
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = dues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
// Updates must be able to clear paid_on when a payment is reverted.
#[diesel(treat_none_as_null = true)]
pub struct DueRow {
    pub id: Uuid,
    pub resident_id: Uuid,
    pub due_type: String,
    pub amount: i64,
    pub due_date: DateTime<Utc>,
    pub status: String,
    pub paid_on: Option<DateTime<Utc>>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Due> for DueRow {
    fn from(due: &Due) -> Self {
        Self {
            id: due.id,
            resident_id: *due.resident_id.as_uuid(),
            due_type: due.due_type.clone(),
            amount: due.amount,
            due_date: due.due_date,
            status: due.status.as_str().to_owned(),
            paid_on: due.paid_on,
            notes: due.notes.clone(),
            created_at: due.created_at,
            updated_at: due.updated_at,
        }
    }
}

impl From<DueRow> for Due {
    fn from(row: DueRow) -> Self {
        Self {
            id: row.id,
            resident_id: ResidentId::from_uuid(row.resident_id),
            due_type: row.due_type,
            amount: row.amount,
            due_date: row.due_date,
            status: parse_or(&row.status, DueStatus::Pending, "dues"),
            paid_on: row.paid_on,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookingRow {
    pub id: Uuid,
    pub amenity_name: String,
    pub resident_id: Uuid,
    pub event_description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Booking> for BookingRow {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            amenity_name: booking.amenity_name.clone(),
            resident_id: *booking.resident_id.as_uuid(),
            event_description: booking.event_description.clone(),
            start_time: booking.window.start(),
            end_time: booking.window.end(),
            status: booking.status.as_str().to_owned(),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = crate::domain::booking::BookingWindowError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            amenity_name: row.amenity_name,
            resident_id: ResidentId::from_uuid(row.resident_id),
            event_description: row.event_description,
            window: BookingWindow::new(row.start_time, row.end_time)?,
            status: parse_or(&row.status, BookingStatus::Pending, "bookings"),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = guest_passes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct GuestPassRow {
    pub id: Uuid,
    pub resident_id: Uuid,
    pub guest_name: String,
    pub visit_date: DateTime<Utc>,
    pub reason: String,
    pub code: Option<String>,
    pub status: String,
    pub handled_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&GuestPass> for GuestPassRow {
    fn from(pass: &GuestPass) -> Self {
        Self {
            id: pass.id,
            resident_id: *pass.resident_id.as_uuid(),
            guest_name: pass.guest_name.clone(),
            visit_date: pass.visit_date,
            reason: pass.reason.clone(),
            code: pass.code.clone(),
            status: pass.status.as_str().to_owned(),
            handled_by: pass.handled_by.map(|id| *id.as_uuid()),
            created_at: pass.created_at,
            updated_at: pass.updated_at,
        }
    }
}

impl From<GuestPassRow> for GuestPass {
    fn from(row: GuestPassRow) -> Self {
        Self {
            id: row.id,
            resident_id: ResidentId::from_uuid(row.resident_id),
            guest_name: row.guest_name,
            visit_date: row.visit_date,
            reason: row.reason,
            code: row.code,
            status: parse_or(&row.status, GuestPassStatus::Pending, "guest_passes"),
            handled_by: row.handled_by.map(AdminId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
// Closing a ticket clears otp and otp_expires_at; None must write NULL.
#[diesel(treat_none_as_null = true)]
pub struct TicketRow {
    pub id: Uuid,
    pub resident_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub assigned_to: Option<String>,
    pub sla_due_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub otp: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub otp_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Ticket> for TicketRow {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            resident_id: *ticket.resident_id.as_uuid(),
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            category: ticket.category.as_str().to_owned(),
            priority: ticket.priority.as_str().to_owned(),
            status: ticket.status.as_str().to_owned(),
            assigned_to: ticket.assigned_to.clone(),
            sla_due_at: ticket.sla_due_at,
            resolved_at: ticket.resolved_at,
            closed_at: ticket.closed_at,
            otp: ticket.otp.clone(),
            otp_expires_at: ticket.otp_expires_at,
            otp_verified: ticket.otp_verified,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        Self {
            id: row.id,
            resident_id: ResidentId::from_uuid(row.resident_id),
            title: row.title,
            description: row.description,
            category: parse_or(&row.category, TicketCategory::Maintenance, "tickets"),
            priority: parse_or(&row.priority, TicketPriority::P3, "tickets"),
            status: parse_or(&row.status, TicketStatus::Open, "tickets"),
            assigned_to: row.assigned_to,
            sla_due_at: row.sla_due_at,
            resolved_at: row.resolved_at,
            closed_at: row.closed_at,
            otp: row.otp,
            otp_expires_at: row.otp_expires_at,
            otp_verified: row.otp_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = polls)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PollRow {
    pub id: Uuid,
    pub question: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = poll_options)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PollOptionRow {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub position: i32,
    pub text: String,
    pub votes: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = marketplace_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MarketplaceItemRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub category: String,
    pub condition: String,
    pub image_url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&MarketplaceItem> for MarketplaceItemRow {
    fn from(item: &MarketplaceItem) -> Self {
        Self {
            id: item.id,
            seller_id: *item.seller_id.as_uuid(),
            title: item.title.clone(),
            description: item.description.clone(),
            price: item.price,
            category: item.category.clone(),
            condition: item.condition.clone(),
            image_url: item.image_url.clone(),
            status: item.status.as_str().to_owned(),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl From<MarketplaceItemRow> for MarketplaceItem {
    fn from(row: MarketplaceItemRow) -> Self {
        Self {
            id: row.id,
            seller_id: ResidentId::from_uuid(row.seller_id),
            title: row.title,
            description: row.description,
            price: row.price,
            category: row.category,
            condition: row.condition,
            image_url: row.image_url,
            status: parse_or(&row.status, ItemStatus::Available, "marketplace_items"),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NoticeRow {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Notice> for NoticeRow {
    fn from(notice: &Notice) -> Self {
        Self {
            id: notice.id,
            title: notice.title.clone(),
            body: notice.body.clone(),
            created_by: *notice.created_by.as_uuid(),
            created_at: notice.created_at,
        }
    }
}

impl From<NoticeRow> for Notice {
    fn from(row: NoticeRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            body: row.body,
            created_by: AdminId::from_uuid(row.created_by),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = maintenance_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MaintenanceTaskRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    pub status: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&MaintenanceTask> for MaintenanceTaskRow {
    fn from(task: &MaintenanceTask) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            scheduled_date: task.scheduled_date,
            status: task.status.as_str().to_owned(),
            created_by: *task.created_by.as_uuid(),
            created_at: task.created_at,
        }
    }
}

impl From<MaintenanceTaskRow> for MaintenanceTask {
    fn from(row: MaintenanceTaskRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            scheduled_date: row.scheduled_date,
            status: parse_or(&row.status, TaskStatus::Pending, "maintenance_tasks"),
            created_by: AdminId::from_uuid(row.created_by),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ExpenseRow {
    pub id: Uuid,
    pub title: String,
    pub amount: i64,
    pub category: String,
    pub description: String,
    pub spent_on: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Expense> for ExpenseRow {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            title: expense.title.clone(),
            amount: expense.amount,
            category: expense.category.clone(),
            description: expense.description.clone(),
            spent_on: expense.spent_on,
            created_by: *expense.created_by.as_uuid(),
            created_at: expense.created_at,
        }
    }
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            amount: row.amount,
            category: row.category,
            description: row.description,
            spent_on: row.spent_on,
            created_by: AdminId::from_uuid(row.created_by),
            created_at: row.created_at,
        }
    }
}
