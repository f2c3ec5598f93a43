//! # survey
//!
//! Server and CLI around `survey-core`.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                   apps/survey (THE BINARY)                │
//! │                                                           │
//! │  ┌───────────┐   ┌───────────┐   ┌─────────────────────┐  │
//! │  │   CLI     │   │ HTTP API  │   │  Store backends     │  │
//! │  │  (clap)   │   │  (axum)   │   │ sheets/local/memory │  │
//! │  └─────┬─────┘   └─────┬─────┘   └──────────┬──────────┘  │
//! │        └───────────────┼────────────────────┘             │
//! │                        ▼                                  │
//! │                ┌───────────────┐                          │
//! │                │  survey-core  │                          │
//! │                └───────────────┘                          │
//! └───────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod response;
pub mod sheets;
pub mod store;
