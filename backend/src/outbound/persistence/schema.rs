//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the SQL in `migrations/` exactly; Diesel
//! uses them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered accounts referenced by results.
    users (id) {
        /// Primary key: serial identifier.
        id -> Int4,
        /// Unique lookup key.
        email -> Varchar,
        /// Stored secret; owned by the identity provisioning flow.
        password -> Varchar,
        /// Granted role names.
        roles -> Array<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Score entries; each row belongs to one user.
    results (id) {
        /// Primary key: serial identifier.
        id -> Int4,
        /// The recorded score.
        result -> Int4,
        /// Owning user.
        user_id -> Int4,
        /// When the score was achieved.
        time -> Timestamptz,
    }
}

diesel::joinable!(results -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(results, users);
