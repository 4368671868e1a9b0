//! In-memory adapters for every persistence port.
//!
//! A single [`MemoryStore`] implements all repository ports over mutex-guarded
//! maps. The server falls back to it when no database is configured, and the
//! handler/service tests run against it so coverage does not require a live
//! PostgreSQL cluster. Locks are never held across await points.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::account::{Admin, EmailAddress, LoginId, Resident};
use super::booking::{Booking, BookingWindow, BookingWithOwner};
use super::bulletin::{Expense, MaintenanceTask, Notice};
use super::due::{Due, DueStatus, DueStatusCounts, DueWithOwner};
use super::guest_pass::{GuestPass, GuestPassWithNames};
use super::marketplace::{ItemStatus, ItemWithSeller, MarketplaceItem};
use super::poll::Poll;
use super::ports::{
    AccountRepository, BookingRepository, BulletinRepository, DueRepository, GuestPassRepository,
    MarketplaceRepository, NotifyError, OtpNotifier, PollRepository, StoreError, TicketRepository,
};
use super::principal::{AdminId, ResidentId};
use super::ticket::{Ticket, TicketOverview, TicketStatus, TicketWithOwner};

#[derive(Default)]
struct State {
    residents: HashMap<Uuid, Resident>,
    admins: HashMap<Uuid, Admin>,
    dues: HashMap<Uuid, Due>,
    bookings: HashMap<Uuid, Booking>,
    guest_passes: HashMap<Uuid, GuestPass>,
    tickets: HashMap<Uuid, Ticket>,
    polls: HashMap<Uuid, Poll>,
    items: HashMap<Uuid, MarketplaceItem>,
    notices: HashMap<Uuid, Notice>,
    tasks: HashMap<Uuid, MaintenanceTask>,
    expenses: HashMap<Uuid, Expense>,
}

/// Map-backed implementation of every repository port.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn owner_names(state: &State, resident_id: ResidentId) -> (String, LoginId) {
        state
            .residents
            .get(resident_id.as_uuid())
            .map(|r| (r.name.clone(), r.login_id.clone()))
            .unwrap_or_else(|| {
                (
                    "Unknown resident".to_owned(),
                    LoginId::new("unknown").unwrap_or_else(|_| unreachable!("literal is valid")),
                )
            })
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn insert_resident(&self, resident: &Resident) -> Result<(), StoreError> {
        let mut state = self.lock();
        let clash = state.residents.values().any(|existing| {
            existing.login_id == resident.login_id || existing.email == resident.email
        });
        if clash {
            return Err(StoreError::duplicate("login_id or email"));
        }
        state
            .residents
            .insert(*resident.id.as_uuid(), resident.clone());
        Ok(())
    }

    async fn find_resident(&self, id: ResidentId) -> Result<Option<Resident>, StoreError> {
        Ok(self.lock().residents.get(id.as_uuid()).cloned())
    }

    async fn find_resident_by_login(
        &self,
        login_id: &LoginId,
    ) -> Result<Option<Resident>, StoreError> {
        Ok(self
            .lock()
            .residents
            .values()
            .find(|r| &r.login_id == login_id)
            .cloned())
    }

    async fn resident_exists(
        &self,
        login_id: &LoginId,
        email: &EmailAddress,
    ) -> Result<bool, StoreError> {
        Ok(self
            .lock()
            .residents
            .values()
            .any(|r| &r.login_id == login_id || &r.email == email))
    }

    async fn list_residents(&self) -> Result<Vec<Resident>, StoreError> {
        let mut residents: Vec<_> = self.lock().residents.values().cloned().collect();
        residents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(residents)
    }

    async fn count_residents(&self) -> Result<u64, StoreError> {
        Ok(self.lock().residents.len() as u64)
    }

    async fn insert_admin(&self, admin: &Admin) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state
            .admins
            .values()
            .any(|existing| existing.login_id == admin.login_id)
        {
            return Err(StoreError::duplicate("admin login_id"));
        }
        state.admins.insert(*admin.id.as_uuid(), admin.clone());
        Ok(())
    }

    async fn find_admin(&self, id: AdminId) -> Result<Option<Admin>, StoreError> {
        Ok(self.lock().admins.get(id.as_uuid()).cloned())
    }

    async fn find_admin_by_login(&self, login_id: &LoginId) -> Result<Option<Admin>, StoreError> {
        Ok(self
            .lock()
            .admins
            .values()
            .find(|a| &a.login_id == login_id)
            .cloned())
    }
}

#[async_trait]
impl DueRepository for MemoryStore {
    async fn insert(&self, due: &Due) -> Result<(), StoreError> {
        self.lock().dues.insert(due.id, due.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Due>, StoreError> {
        Ok(self.lock().dues.get(&id).cloned())
    }

    async fn update(&self, due: &Due) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.dues.contains_key(&due.id) {
            return Err(StoreError::query("due not found for update"));
        }
        state.dues.insert(due.id, due.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<DueWithOwner>, StoreError> {
        let state = self.lock();
        let mut dues: Vec<_> = state
            .dues
            .values()
            .map(|due| {
                let (owner_name, owner_login_id) = Self::owner_names(&state, due.resident_id);
                DueWithOwner {
                    due: due.clone(),
                    owner_name,
                    owner_login_id,
                }
            })
            .collect();
        dues.sort_by(|a, b| b.due.due_date.cmp(&a.due.due_date));
        Ok(dues)
    }

    async fn find_with_owner(&self, id: Uuid) -> Result<Option<DueWithOwner>, StoreError> {
        let state = self.lock();
        Ok(state.dues.get(&id).map(|due| {
            let (owner_name, owner_login_id) = Self::owner_names(&state, due.resident_id);
            DueWithOwner {
                due: due.clone(),
                owner_name,
                owner_login_id,
            }
        }))
    }

    async fn earliest_outstanding(
        &self,
        resident_id: ResidentId,
    ) -> Result<Option<Due>, StoreError> {
        Ok(self
            .lock()
            .dues
            .values()
            .filter(|due| due.resident_id == resident_id && due.status.outstanding())
            .min_by_key(|due| due.due_date)
            .cloned())
    }

    async fn status_counts(&self) -> Result<DueStatusCounts, StoreError> {
        let state = self.lock();
        let mut counts = DueStatusCounts::default();
        for due in state.dues.values() {
            counts.total += 1;
            match due.status {
                DueStatus::Paid => counts.paid += 1,
                DueStatus::Pending => counts.pending += 1,
                DueStatus::Overdue => counts.overdue += 1,
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        self.lock().bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.lock().bookings.get(&id).cloned())
    }

    async fn update(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.bookings.contains_key(&booking.id) {
            return Err(StoreError::query("booking not found for update"));
        }
        state.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.lock().bookings.remove(&id).is_some())
    }

    async fn list_for_resident(
        &self,
        resident_id: ResidentId,
    ) -> Result<Vec<Booking>, StoreError> {
        let mut bookings: Vec<_> = self
            .lock()
            .bookings
            .values()
            .filter(|b| b.resident_id == resident_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.window.start().cmp(&a.window.start()));
        Ok(bookings)
    }

    async fn list_all(&self) -> Result<Vec<BookingWithOwner>, StoreError> {
        let state = self.lock();
        let mut bookings: Vec<_> = state
            .bookings
            .values()
            .map(|booking| {
                let (owner_name, owner_login_id) = Self::owner_names(&state, booking.resident_id);
                BookingWithOwner {
                    booking: booking.clone(),
                    owner_name,
                    owner_login_id,
                }
            })
            .collect();
        bookings.sort_by(|a, b| b.booking.window.start().cmp(&a.booking.window.start()));
        Ok(bookings)
    }

    async fn find_with_owner(&self, id: Uuid) -> Result<Option<BookingWithOwner>, StoreError> {
        let state = self.lock();
        Ok(state.bookings.get(&id).map(|booking| {
            let (owner_name, owner_login_id) = Self::owner_names(&state, booking.resident_id);
            BookingWithOwner {
                booking: booking.clone(),
                owner_name,
                owner_login_id,
            }
        }))
    }

    async fn any_active_overlap(
        &self,
        amenity_name: &str,
        window: &BookingWindow,
    ) -> Result<bool, StoreError> {
        Ok(self.lock().bookings.values().any(|b| {
            b.amenity_name == amenity_name
                && b.status.holds_slot()
                && b.window.overlaps(window)
        }))
    }
}

#[async_trait]
impl GuestPassRepository for MemoryStore {
    async fn insert(&self, pass: &GuestPass) -> Result<(), StoreError> {
        self.lock().guest_passes.insert(pass.id, pass.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<GuestPass>, StoreError> {
        Ok(self.lock().guest_passes.get(&id).cloned())
    }

    async fn update(&self, pass: &GuestPass) -> Result<(), StoreError> {
        let mut state = self.lock();
        if let Some(code) = &pass.code {
            let collision = state
                .guest_passes
                .values()
                .any(|other| other.id != pass.id && other.code.as_deref() == Some(code));
            if collision {
                return Err(StoreError::duplicate("code"));
            }
        }
        if !state.guest_passes.contains_key(&pass.id) {
            return Err(StoreError::query("guest pass not found for update"));
        }
        state.guest_passes.insert(pass.id, pass.clone());
        Ok(())
    }

    async fn list_for_resident(
        &self,
        resident_id: ResidentId,
    ) -> Result<Vec<GuestPassWithNames>, StoreError> {
        let state = self.lock();
        let mut passes: Vec<_> = state
            .guest_passes
            .values()
            .filter(|p| p.resident_id == resident_id)
            .map(|pass| Self::pass_with_names(&state, pass))
            .collect();
        passes.sort_by(|a, b| b.pass.visit_date.cmp(&a.pass.visit_date));
        Ok(passes)
    }

    async fn list_all(&self) -> Result<Vec<GuestPassWithNames>, StoreError> {
        let state = self.lock();
        let mut passes: Vec<_> = state
            .guest_passes
            .values()
            .map(|pass| Self::pass_with_names(&state, pass))
            .collect();
        passes.sort_by(|a, b| b.pass.created_at.cmp(&a.pass.created_at));
        Ok(passes)
    }

    async fn find_with_names(&self, id: Uuid) -> Result<Option<GuestPassWithNames>, StoreError> {
        let state = self.lock();
        Ok(state
            .guest_passes
            .get(&id)
            .map(|pass| Self::pass_with_names(&state, pass)))
    }
}

impl MemoryStore {
    fn pass_with_names(state: &State, pass: &GuestPass) -> GuestPassWithNames {
        let (owner_name, owner_login_id) = Self::owner_names(state, pass.resident_id);
        let handler_login_id = pass
            .handled_by
            .and_then(|id| state.admins.get(id.as_uuid()))
            .map(|admin| admin.login_id.clone());
        GuestPassWithNames {
            pass: pass.clone(),
            owner_name,
            owner_login_id,
            handler_login_id,
        }
    }

    fn ticket_with_owner(state: &State, ticket: &Ticket) -> TicketWithOwner {
        let (owner_name, owner_login_id) = Self::owner_names(state, ticket.resident_id);
        TicketWithOwner {
            ticket: ticket.clone(),
            owner_name,
            owner_login_id,
        }
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn insert(&self, ticket: &Ticket) -> Result<(), StoreError> {
        self.lock().tickets.insert(ticket.id, ticket.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        Ok(self.lock().tickets.get(&id).cloned())
    }

    async fn update(&self, ticket: &Ticket) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.tickets.contains_key(&ticket.id) {
            return Err(StoreError::query("ticket not found for update"));
        }
        state.tickets.insert(ticket.id, ticket.clone());
        Ok(())
    }

    async fn list_for_resident(&self, resident_id: ResidentId) -> Result<Vec<Ticket>, StoreError> {
        let mut tickets: Vec<_> = self
            .lock()
            .tickets
            .values()
            .filter(|t| t.resident_id == resident_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    async fn list_all(&self) -> Result<Vec<TicketWithOwner>, StoreError> {
        let state = self.lock();
        let mut tickets: Vec<_> = state
            .tickets
            .values()
            .map(|ticket| Self::ticket_with_owner(&state, ticket))
            .collect();
        tickets.sort_by(|a, b| b.ticket.created_at.cmp(&a.ticket.created_at));
        Ok(tickets)
    }

    async fn overview(&self) -> Result<TicketOverview, StoreError> {
        let state = self.lock();
        let mut overview = TicketOverview::default();
        for ticket in state.tickets.values() {
            overview.total += 1;
            match ticket.status {
                TicketStatus::Open => overview.open += 1,
                TicketStatus::Assigned => overview.assigned += 1,
                TicketStatus::Closed => overview.closed += 1,
                _ => {}
            }
        }
        Ok(overview)
    }

    async fn sla_breaches(&self, now: DateTime<Utc>) -> Result<Vec<TicketWithOwner>, StoreError> {
        let state = self.lock();
        let mut breached: Vec<_> = state
            .tickets
            .values()
            .filter(|t| t.status != TicketStatus::Closed && t.sla_due_at < now)
            .map(|ticket| Self::ticket_with_owner(&state, ticket))
            .collect();
        breached.sort_by(|a, b| a.ticket.sla_due_at.cmp(&b.ticket.sla_due_at));
        Ok(breached)
    }
}

#[async_trait]
impl PollRepository for MemoryStore {
    async fn insert(&self, poll: &Poll) -> Result<(), StoreError> {
        self.lock().polls.insert(poll.id, poll.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Poll>, StoreError> {
        Ok(self.lock().polls.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Poll>, StoreError> {
        let mut polls: Vec<_> = self.lock().polls.values().cloned().collect();
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(polls)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.lock().polls.remove(&id).is_some())
    }

    async fn record_vote(
        &self,
        poll_id: Uuid,
        option_index: usize,
    ) -> Result<Option<Poll>, StoreError> {
        let mut state = self.lock();
        let Some(poll) = state.polls.get_mut(&poll_id) else {
            return Ok(None);
        };
        let Some(option) = poll.options.get_mut(option_index) else {
            return Err(StoreError::query("option index out of range"));
        };
        option.votes += 1;
        Ok(Some(poll.clone()))
    }
}

#[async_trait]
impl MarketplaceRepository for MemoryStore {
    async fn insert(&self, item: &MarketplaceItem) -> Result<(), StoreError> {
        self.lock().items.insert(item.id, item.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<MarketplaceItem>, StoreError> {
        Ok(self.lock().items.get(&id).cloned())
    }

    async fn update(&self, item: &MarketplaceItem) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.items.contains_key(&item.id) {
            return Err(StoreError::query("listing not found for update"));
        }
        state.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.lock().items.remove(&id).is_some())
    }

    async fn list_available(&self) -> Result<Vec<ItemWithSeller>, StoreError> {
        let state = self.lock();
        let mut items: Vec<_> = state
            .items
            .values()
            .filter(|item| item.status == ItemStatus::Available)
            .map(|item| Self::item_with_seller(&state, item))
            .collect();
        items.sort_by(|a, b| b.item.created_at.cmp(&a.item.created_at));
        Ok(items)
    }

    async fn list_for_seller(
        &self,
        seller_id: ResidentId,
    ) -> Result<Vec<MarketplaceItem>, StoreError> {
        let mut items: Vec<_> = self
            .lock()
            .items
            .values()
            .filter(|item| item.seller_id == seller_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn find_with_seller(&self, id: Uuid) -> Result<Option<ItemWithSeller>, StoreError> {
        let state = self.lock();
        Ok(state
            .items
            .get(&id)
            .map(|item| Self::item_with_seller(&state, item)))
    }
}

impl MemoryStore {
    fn item_with_seller(state: &State, item: &MarketplaceItem) -> ItemWithSeller {
        let (seller_name, seller_login_id) = Self::owner_names(state, item.seller_id);
        ItemWithSeller {
            item: item.clone(),
            seller_name,
            seller_login_id,
        }
    }
}

#[async_trait]
impl BulletinRepository for MemoryStore {
    async fn insert_notice(&self, notice: &Notice) -> Result<(), StoreError> {
        self.lock().notices.insert(notice.id, notice.clone());
        Ok(())
    }

    async fn list_notices(&self) -> Result<Vec<Notice>, StoreError> {
        let mut notices: Vec<_> = self.lock().notices.values().cloned().collect();
        notices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notices)
    }

    async fn insert_task(&self, task: &MaintenanceTask) -> Result<(), StoreError> {
        self.lock().tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<MaintenanceTask>, StoreError> {
        Ok(self.lock().tasks.get(&id).cloned())
    }

    async fn update_task(&self, task: &MaintenanceTask) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.tasks.contains_key(&task.id) {
            return Err(StoreError::query("task not found for update"));
        }
        state.tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<MaintenanceTask>, StoreError> {
        let mut tasks: Vec<_> = self.lock().tasks.values().cloned().collect();
        tasks.sort_by(|a, b| b.scheduled_date.cmp(&a.scheduled_date));
        Ok(tasks)
    }

    async fn insert_expense(&self, expense: &Expense) -> Result<(), StoreError> {
        self.lock().expenses.insert(expense.id, expense.clone());
        Ok(())
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, StoreError> {
        let mut expenses: Vec<_> = self.lock().expenses.values().cloned().collect();
        expenses.sort_by(|a, b| b.spent_on.cmp(&a.spent_on));
        Ok(expenses)
    }
}

/// Notifier that records deliveries instead of sending them.
///
/// Tests use it to assert on issued codes; it also backs development runs
/// where no gateway is configured.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail_next: Mutex<bool>,
}

impl RecordingNotifier {
    /// Create a notifier that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next delivery fail with `Unavailable`.
    pub fn fail_next(&self) {
        if let Ok(mut flag) = self.fail_next.lock() {
            *flag = true;
        }
    }

    /// Recorded `(recipient, code)` pairs in delivery order.
    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl OtpNotifier for RecordingNotifier {
    async fn deliver(&self, recipient: &str, code: &str) -> Result<(), NotifyError> {
        if let Ok(mut flag) = self.fail_next.lock() {
            if *flag {
                *flag = false;
                return Err(NotifyError::unavailable("gateway unreachable"));
            }
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((recipient.to_owned(), code.to_owned()));
        }
        Ok(())
    }
}
