//! # store-core: Pure Business Logic for the Store Admin
//!
//! This crate holds the domain model of the store admin backend as pure
//! types and functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Store Admin Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard (browser)                          │   │
//! │  │    Inventory UI ──► Sales History UI ──► PDF receipt            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    store-api (axum handlers)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ store-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  requests │  │ validation│  │   │
//! │  │   │   Item    │  │   Money   │  │  NewSale  │  │   rules   │  │   │
//! │  │   │   Bill    │  │  parsing  │  │  NewItem  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    store-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Bill, BillItem, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`requests`] - Incoming payloads and their validated forms
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use store_core::money::Money;
//!
//! let rate: Money = "10.00".parse().unwrap();
//! let subtotal = rate.multiply_quantity(2.0);
//! assert_eq!(subtotal.cents(), 2000);
//! ```

pub mod error;
pub mod money;
pub mod requests;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use requests::*;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines on a single bill.
pub const MAX_BILL_LINES: usize = 100;

/// Maximum quantity on a single bill line (pieces or kilograms alike).
pub const MAX_LINE_QUANTITY: f64 = 9999.0;

/// Largest accepted image payload (the base64 data URL, in bytes).
///
/// The dashboard downsizes pictures to 800px JPEGs before upload, which
/// lands far below this.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Largest amount accepted from a client, in cents (100 billion).
///
/// Keeps rate × quantity and bill totals far inside i64.
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000_000;

/// Allowed difference between a submitted amount and the recomputed one.
pub const ROUNDING_TOLERANCE_CENTS: i64 = 1;

/// Category assigned when an item is added without one.
pub const DEFAULT_CATEGORY: &str = "General";
