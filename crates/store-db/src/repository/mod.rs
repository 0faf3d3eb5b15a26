//! # Repository Module
//!
//! Database repository implementations for the store admin.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.bills().record_sale(&draft)                                │
//! │       ▼                                                                 │
//! │  BillRepository                                                        │
//! │  ├── record_sale(&self, draft)     one transaction                     │
//! │  ├── list(&self, search, page)                                         │
//! │  ├── get_detail(&self, id)                                             │
//! │  └── summary(&self)                                                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ItemRepository`](item::ItemRepository) - Catalog CRUD, usage counts
//! - [`BillRepository`](bill::BillRepository) - Recording and reading sales

pub mod bill;
pub mod item;

/// Escapes `%`, `_` and `\` so user input matches literally inside LIKE.
///
/// Pair with `ESCAPE '\'` in the SQL.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Current time in the fixed-width text form stored in `created_at` columns.
///
/// Fixed width keeps lexical order equal to chronological order.
pub(crate) fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
