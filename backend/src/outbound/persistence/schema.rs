//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` against a migrated database when the SQL changes.

diesel::table! {
    /// Donor, requester and admin accounts.
    ///
    /// `email` carries a unique constraint (`users_email_key`); sign-in
    /// relies on it to resolve concurrent first logins.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Text,
        phone -> Nullable<Text>,
        blood_group -> Varchar,
        medical_history -> Nullable<Text>,
        profile_image -> Nullable<Text>,
        /// `admin` or `regular`.
        role -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only movements of blood units.
    ///
    /// Entries materialised from a grant carry `request_grant_id`, which is
    /// unique so a grant can own at most one entry.
    ledger_entries (id) {
        id -> Uuid,
        user_id -> Uuid,
        /// `IN` or `OUT`.
        direction -> Varchar,
        blood_group -> Varchar,
        quantity -> Int2,
        phone -> Nullable<Text>,
        /// `DONATION`, `REQUEST` or null for legacy rows.
        source -> Nullable<Varchar>,
        request_grant_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Requests for blood units and their admin decision.
    ///
    /// A check constraint ties `status = 'granted'` to a non-null
    /// `ledger_entry_id`. `revision` increments on every committed transition.
    request_grants (id) {
        id -> Uuid,
        user_id -> Uuid,
        name -> Varchar,
        phone -> Text,
        blood_group -> Varchar,
        quantity -> Int2,
        /// `pending`, `granted` or `rejected`.
        status -> Varchar,
        ledger_entry_id -> Nullable<Uuid>,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per applied example data seed.
    example_data_seeds (seed_key) {
        seed_key -> Varchar,
        seed -> Int8,
        user_count -> Int4,
        donation_count -> Int4,
        grant_count -> Int4,
        seeded_at -> Timestamptz,
    }
}

diesel::joinable!(ledger_entries -> users (user_id));
diesel::joinable!(request_grants -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    example_data_seeds,
    ledger_entries,
    request_grants,
    users,
);
