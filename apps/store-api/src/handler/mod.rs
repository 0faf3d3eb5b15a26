//! # HTTP Handlers
//!
//! One module per resource, each a thin layer over store-db:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  Route                    Handler                  Repository call   │
//! │  ───────────────────────  ───────────────────────  ─────────────────  │
//! │  GET    /health           health::health           health_check      │
//! │  GET    /items            item::list_items         items().list      │
//! │  POST   /items            item::add_item           items().insert    │
//! │  PUT    /items/{id}       item::update_item        items().update    │
//! │  DELETE /items/{id}       item::delete_item        items().delete    │
//! │  GET    /bills            bill::list_bills         bills().list      │
//! │  POST   /bills            bill::record_bill        bills().record_sale│
//! │  GET    /bills/summary    bill::sales_summary      bills().summary   │
//! │  GET    /bills/{id}       bill::get_bill           bills().get_detail│
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Extractors are taken as `Result<_, Rejection>` so malformed input is
//! reported through [`ApiError`](crate::error::ApiError) like every other
//! failure.

pub mod bill;
pub mod health;
pub mod item;

use serde::{Deserialize, Serialize};

/// Body returned by mutating item endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(message: impl Into<String>, id: i64) -> Self {
        MessageResponse {
            message: message.into(),
            id: Some(id),
        }
    }
}
