//! Route registration shared by the server and the handler tests.
//!
//! Literal paths (`/tickets/my`) register before their parameterised
//! siblings (`/tickets/{id}`) so they are matched first.

use actix_web::web;

use super::{auth, bookings, bulletin, dues, guest_passes, marketplace, polls, tickets, uploads};

/// Register every `/api/v1` handler on the given config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Identity & session
        .service(auth::signup)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::profile)
        .service(auth::list_residents)
        // Dues ledger
        .service(dues::current_due)
        .service(dues::create_due)
        .service(dues::all_dues)
        .service(dues::set_due_status)
        .service(dues::dashboard_stats)
        // Amenity bookings
        .service(bookings::list_amenities)
        .service(bookings::my_bookings)
        .service(bookings::all_bookings)
        .service(bookings::create_booking)
        .service(bookings::set_booking_status)
        .service(bookings::delete_booking)
        // Guest passes
        .service(guest_passes::request_pass)
        .service(guest_passes::my_passes)
        .service(guest_passes::all_passes)
        .service(guest_passes::cancel_pass)
        .service(guest_passes::approve_pass)
        .service(guest_passes::reject_pass)
        // Tickets
        .service(tickets::create_ticket)
        .service(tickets::my_tickets)
        .service(tickets::verify_close_otp)
        .service(tickets::get_ticket)
        .service(tickets::all_tickets)
        .service(tickets::ticket_overview)
        .service(tickets::sla_alerts)
        .service(tickets::assign_ticket)
        .service(tickets::request_close)
        // Polls
        .service(polls::create_poll)
        .service(polls::list_polls)
        .service(polls::vote)
        .service(polls::get_poll)
        .service(polls::delete_poll)
        // Marketplace
        .service(marketplace::create_listing)
        .service(marketplace::my_listings)
        .service(marketplace::list_available)
        .service(marketplace::get_listing)
        .service(marketplace::update_listing)
        .service(marketplace::delete_listing)
        // Bulletin records
        .service(bulletin::create_notice)
        .service(bulletin::list_notices)
        .service(bulletin::create_task)
        .service(bulletin::list_tasks)
        .service(bulletin::set_task_status)
        .service(bulletin::create_expense)
        .service(bulletin::list_expenses)
        // Uploads
        .service(uploads::upload_image);
}
