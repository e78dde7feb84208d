//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. They are used by
//! Diesel for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered library users.
    users (id) {
        /// Primary key.
        id -> Int8,
        /// Display and lookup name (max 255 characters).
        name -> Varchar,
        /// Optional non-negative age.
        age -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Book catalogue. Names are not unique.
    books (id) {
        /// Primary key.
        id -> Int8,
        /// Book name (max 255 characters).
        name -> Varchar,
        /// Upper-case category label guarded by a CHECK constraint.
        book_type -> Varchar,
    }
}

diesel::table! {
    /// Loan records owned by users.
    ///
    /// A partial unique index allows one `LOANED` row per `book_name`.
    loan_histories (id) {
        /// Primary key.
        id -> Int8,
        /// Owning user; rows cascade on user deletion.
        user_id -> Int8,
        /// Borrowed book, matched by name.
        book_name -> Varchar,
        /// `LOANED` or `RETURNED`.
        status -> Varchar,
    }
}

diesel::joinable!(loan_histories -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, books, loan_histories);
