//! OpenAPI document served by Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{DashboardStats, TicketOverview};
use crate::inbound::http::{
    auth, bookings, bulletin, dues, error::ApiError, guest_passes, health, marketplace, polls,
    tickets, uploads,
};

/// Aggregated OpenAPI description of the REST surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup,
        auth::login,
        auth::logout,
        auth::profile,
        auth::list_residents,
        dues::current_due,
        dues::create_due,
        dues::all_dues,
        dues::set_due_status,
        dues::dashboard_stats,
        bookings::list_amenities,
        bookings::create_booking,
        bookings::my_bookings,
        bookings::all_bookings,
        bookings::set_booking_status,
        bookings::delete_booking,
        guest_passes::request_pass,
        guest_passes::my_passes,
        guest_passes::all_passes,
        guest_passes::cancel_pass,
        guest_passes::approve_pass,
        guest_passes::reject_pass,
        tickets::create_ticket,
        tickets::my_tickets,
        tickets::get_ticket,
        tickets::verify_close_otp,
        tickets::all_tickets,
        tickets::ticket_overview,
        tickets::sla_alerts,
        tickets::assign_ticket,
        tickets::request_close,
        polls::create_poll,
        polls::list_polls,
        polls::get_poll,
        polls::vote,
        polls::delete_poll,
        marketplace::create_listing,
        marketplace::list_available,
        marketplace::my_listings,
        marketplace::get_listing,
        marketplace::update_listing,
        marketplace::delete_listing,
        bulletin::create_notice,
        bulletin::list_notices,
        bulletin::create_task,
        bulletin::list_tasks,
        bulletin::set_task_status,
        bulletin::create_expense,
        bulletin::list_expenses,
        uploads::upload_image,
        health::live,
        health::ready,
    ),
    components(schemas(
        ApiError,
        DashboardStats,
        TicketOverview,
        crate::domain::Amenity,
        crate::domain::BookingStatus,
        crate::domain::DueStatus,
        crate::domain::GuestPassStatus,
        crate::domain::ItemStatus,
        crate::domain::TaskStatus,
        crate::domain::TicketCategory,
        crate::domain::TicketPriority,
        crate::domain::TicketStatus,
        auth::SignupDto,
        auth::LoginDto,
        auth::SessionDto,
        auth::PublicUserDto,
        auth::ResidentDto,
        dues::CreateDueDto,
        dues::DueStatusDto,
        dues::DueDto,
        dues::CurrentDueDto,
        bookings::CreateBookingDto,
        bookings::BookingStatusDto,
        bookings::BookingDto,
        bookings::OwnerDto,
        guest_passes::RequestPassDto,
        guest_passes::GuestPassDto,
        tickets::CreateTicketDto,
        tickets::AssignTicketDto,
        tickets::VerifyOtpDto,
        tickets::TicketDto,
        polls::CreatePollDto,
        polls::VoteDto,
        polls::PollOptionDto,
        polls::PollDto,
        marketplace::CreateListingDto,
        marketplace::UpdateListingDto,
        marketplace::ListingDto,
        bulletin::CreateNoticeDto,
        bulletin::CreateTaskDto,
        bulletin::TaskStatusDto,
        bulletin::CreateExpenseDto,
        bulletin::NoticeDto,
        bulletin::TaskDto,
        bulletin::ExpenseDto,
    )),
    tags(
        (name = "auth", description = "Signup, login, profiles"),
        (name = "dues", description = "Dues ledger"),
        (name = "bookings", description = "Amenity bookings"),
        (name = "guest-passes", description = "Visitor authorisations"),
        (name = "tickets", description = "Support tickets and OTP closure"),
        (name = "polls", description = "Community polls"),
        (name = "marketplace", description = "Resident marketplace"),
        (name = "bulletin", description = "Notices, maintenance, expenses"),
        (name = "uploads", description = "Image uploads"),
        (name = "health", description = "Probes"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn document_builds_and_lists_core_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/auth/login"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/bookings"));
        assert!(
            paths
                .iter()
                .any(|p| p.as_str() == "/api/v1/tickets/{id}/verify-close-otp")
        );
    }
}
