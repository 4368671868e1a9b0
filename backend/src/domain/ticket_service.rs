//! Support-ticket workflow including the OTP-confirmed closure handshake.
//!
//! Closure is a two-party handshake: an admin starts it by issuing a
//! short-lived numeric code delivered out-of-band to the ticket owner, and
//! the owner finishes it by submitting the code back. The state change to
//! `Pending Closure` is persisted only after the notifier accepts the
//! message, so a failed delivery never strands a ticket with a code nobody
//! received.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use uuid::Uuid;

use super::error::Error;
use super::ports::{AccountRepository, OtpNotifier, TicketRepository};
use super::principal::{Principal, ResidentId};
use super::ticket::{
    OTP_TTL_MINUTES, Ticket, TicketCategory, TicketOverview, TicketPriority, TicketStatus,
    TicketWithOwner, generate_otp,
};

/// Validated input for a new ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
}

/// Ticket workflow service.
#[derive(Clone)]
pub struct TicketService {
    tickets: Arc<dyn TicketRepository>,
    accounts: Arc<dyn AccountRepository>,
    notifier: Arc<dyn OtpNotifier>,
    clock: Arc<dyn Clock>,
}

impl TicketService {
    /// Create a new service.
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        accounts: Arc<dyn AccountRepository>,
        notifier: Arc<dyn OtpNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tickets,
            accounts,
            notifier,
            clock,
        }
    }

    /// Resident opens a ticket.
    pub async fn create(&self, owner: ResidentId, request: NewTicket) -> Result<Ticket, Error> {
        let title = request.title.trim().to_owned();
        let description = request.description.trim().to_owned();
        if title.is_empty() || description.is_empty() {
            return Err(Error::invalid_request("title and description are required"));
        }
        let ticket = Ticket::open(
            owner,
            title,
            description,
            request.category,
            request.priority,
            self.clock.utc(),
        );
        self.tickets.insert(&ticket).await?;
        Ok(ticket)
    }

    /// A resident's own tickets, newest first.
    pub async fn my_tickets(&self, owner: ResidentId) -> Result<Vec<Ticket>, Error> {
        Ok(self.tickets.list_for_resident(owner).await?)
    }

    /// Fetch one ticket; residents may only read their own.
    pub async fn get(&self, id: Uuid, caller: Principal) -> Result<Ticket, Error> {
        let ticket = self.load(id).await?;
        match caller {
            Principal::Admin(_) => Ok(ticket),
            Principal::Resident(resident_id) if ticket.resident_id == resident_id => Ok(ticket),
            Principal::Resident(_) => Err(Error::forbidden("not your ticket")),
        }
    }

    /// All tickets for the admin queue, newest first.
    pub async fn all_tickets(&self) -> Result<Vec<TicketWithOwner>, Error> {
        Ok(self.tickets.list_all().await?)
    }

    /// Admin hands the ticket to a staff member.
    pub async fn assign(&self, id: Uuid, assignee: &str) -> Result<Ticket, Error> {
        let assignee = assignee.trim();
        if assignee.is_empty() {
            return Err(Error::invalid_request("assignee is required"));
        }
        let mut ticket = self.load(id).await?;
        ticket.assigned_to = Some(assignee.to_owned());
        ticket.status = TicketStatus::Assigned;
        ticket.updated_at = self.clock.utc();
        self.tickets.update(&ticket).await?;
        Ok(ticket)
    }

    /// Dashboard counters.
    pub async fn overview(&self) -> Result<TicketOverview, Error> {
        Ok(self.tickets.overview().await?)
    }

    /// Unclosed tickets past their SLA target.
    pub async fn sla_alerts(&self) -> Result<Vec<TicketWithOwner>, Error> {
        Ok(self.tickets.sla_breaches(self.clock.utc()).await?)
    }

    /// Admin starts the closure handshake.
    ///
    /// Precondition: status is Open, Assigned, or In Progress. Generates the
    /// code, delivers it to the owner's contact, and only then persists
    /// `Pending Closure` with a ten-minute expiry.
    pub async fn request_close(&self, id: Uuid) -> Result<Ticket, Error> {
        let mut ticket = self.load(id).await?;
        if !ticket.status.closure_may_begin() {
            return Err(Error::invalid_request(format!(
                "cannot request closure while the ticket is {}",
                ticket.status
            )));
        }

        let owner = self
            .accounts
            .find_resident(ticket.resident_id)
            .await?
            .ok_or_else(|| Error::internal("ticket owner record is missing"))?;

        let otp = generate_otp(&mut rand::thread_rng());
        self.notifier.deliver(owner.contact(), &otp).await?;

        let now = self.clock.utc();
        ticket.status = TicketStatus::PendingClosure;
        ticket.otp = Some(otp);
        ticket.otp_expires_at = Some(now + Duration::minutes(OTP_TTL_MINUTES));
        ticket.otp_verified = false;
        ticket.updated_at = now;
        self.tickets.update(&ticket).await?;
        Ok(ticket)
    }

    /// Resident finishes the closure handshake by submitting the code.
    // TODO: attempts are unbounded per issuance; add a retry counter before
    // exposing this beyond the society intranet.
    pub async fn verify_close_otp(
        &self,
        id: Uuid,
        supplied: &str,
        caller: ResidentId,
    ) -> Result<Ticket, Error> {
        let mut ticket = self.load(id).await?;
        if ticket.resident_id != caller {
            return Err(Error::forbidden("not your ticket"));
        }
        if ticket.status == TicketStatus::Closed {
            return Err(Error::invalid_request("ticket is already closed"));
        }
        if ticket.status != TicketStatus::PendingClosure {
            return Err(Error::invalid_request("ticket is not pending closure"));
        }

        let now = self.clock.utc();
        let expired = match (&ticket.otp, ticket.otp_expires_at) {
            (None, _) | (_, None) => true,
            (Some(_), Some(expires_at)) => now > expires_at,
        };
        if expired {
            return Err(Error::invalid_request("the code has expired"));
        }
        if ticket.otp.as_deref() != Some(supplied) {
            return Err(Error::invalid_request("invalid code"));
        }

        ticket.status = TicketStatus::Closed;
        ticket.closed_at = Some(now);
        ticket.otp = None;
        ticket.otp_expires_at = None;
        ticket.otp_verified = true;
        ticket.updated_at = now;
        self.tickets.update(&ticket).await?;
        Ok(ticket)
    }

    async fn load(&self, id: Uuid) -> Result<Ticket, Error> {
        self.tickets
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("ticket not found"))
    }
}
