//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. When migrations change the schema, regenerate or update this
//! file to match (`diesel print-schema`).

diesel::table! {
    /// Resident accounts.
    residents (id) {
        id -> Uuid,
        name -> Varchar,
        login_id -> Varchar,
        email -> Varchar,
        phone -> Nullable<Varchar>,
        password_hash -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Management-staff accounts.
    admins (id) {
        id -> Uuid,
        login_id -> Varchar,
        password_hash -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Dues ledger.
    dues (id) {
        id -> Uuid,
        resident_id -> Uuid,
        due_type -> Varchar,
        amount -> Int8,
        due_date -> Timestamptz,
        status -> Varchar,
        paid_on -> Nullable<Timestamptz>,
        notes -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Amenity bookings. The composite (amenity_name, start_time, end_time)
    /// index backs the overlap probe.
    bookings (id) {
        id -> Uuid,
        amenity_name -> Varchar,
        resident_id -> Uuid,
        event_description -> Text,
        start_time -> Timestamptz,
        end_time -> Timestamptz,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Guest passes; `code` is unique when present.
    guest_passes (id) {
        id -> Uuid,
        resident_id -> Uuid,
        guest_name -> Varchar,
        visit_date -> Timestamptz,
        reason -> Text,
        code -> Nullable<Varchar>,
        status -> Varchar,
        handled_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Support tickets with the OTP closure columns.
    tickets (id) {
        id -> Uuid,
        resident_id -> Uuid,
        title -> Varchar,
        description -> Text,
        category -> Varchar,
        priority -> Varchar,
        status -> Varchar,
        assigned_to -> Nullable<Varchar>,
        sla_due_at -> Timestamptz,
        resolved_at -> Nullable<Timestamptz>,
        closed_at -> Nullable<Timestamptz>,
        otp -> Nullable<Varchar>,
        otp_expires_at -> Nullable<Timestamptz>,
        otp_verified -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Poll questions.
    polls (id) {
        id -> Uuid,
        question -> Text,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Poll answer options; `position` orders them within a poll.
    poll_options (id) {
        id -> Uuid,
        poll_id -> Uuid,
        position -> Int4,
        text -> Text,
        votes -> Int4,
    }
}

diesel::table! {
    /// Marketplace listings.
    marketplace_items (id) {
        id -> Uuid,
        seller_id -> Uuid,
        title -> Varchar,
        description -> Text,
        price -> Int8,
        category -> Varchar,
        condition -> Varchar,
        image_url -> Text,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Notice board.
    notices (id) {
        id -> Uuid,
        title -> Varchar,
        body -> Text,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Scheduled maintenance tasks.
    maintenance_tasks (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        scheduled_date -> Timestamptz,
        status -> Varchar,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Society expense log.
    expenses (id) {
        id -> Uuid,
        title -> Varchar,
        amount -> Int8,
        category -> Varchar,
        description -> Text,
        spent_on -> Timestamptz,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(dues -> residents (resident_id));
diesel::joinable!(bookings -> residents (resident_id));
diesel::joinable!(guest_passes -> residents (resident_id));
diesel::joinable!(guest_passes -> admins (handled_by));
diesel::joinable!(tickets -> residents (resident_id));
diesel::joinable!(poll_options -> polls (poll_id));
diesel::joinable!(marketplace_items -> residents (seller_id));

diesel::allow_tables_to_appear_in_same_query!(
    residents,
    admins,
    dues,
    bookings,
    guest_passes,
    tickets,
    polls,
    poll_options,
    marketplace_items,
    notices,
    maintenance_tasks,
    expenses,
);
