//! # duka-checkout: Payment Flow Engine for Duka POS
//!
//! This crate wraps the pure till logic from `duka-core` in an async engine:
//! one shared lock, one active payment flow, and spawned tasks for the
//! confirmation timer and the backend commit.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Engine Architecture                       │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │                  CheckoutEngine (Orchestrator)                   │   │
//! │  │                                                                  │   │
//! │  │  Owns Arc<Mutex<EngineState>> with the Register inside           │   │
//! │  │  Every transition bumps an epoch that disowns stale tasks        │   │
//! │  └───────────┬─────────────────────┬────────────────────────────────┘   │
//! │              │                     │                                    │
//! │              ▼                     ▼                                    │
//! │  ┌────────────────────┐  ┌────────────────────┐                         │
//! │  │ Processing Timer   │  │   Commit Task      │                         │
//! │  │                    │  │                    │                         │
//! │  │ Walks confirmation │  │ Calls the backend  │                         │
//! │  │ steps 1..3, then   │  │ with the frozen    │                         │
//! │  │ triggers commit    │  │ cart snapshot      │                         │
//! │  └────────────────────┘  └─────────┬──────────┘                         │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │            CatalogProvider + SaleCommitService traits            │   │
//! │  │                                                                  │   │
//! │  │  InMemoryBackend implements both for standalone tills and tests  │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - Traits the engine commits through
//! - [`config`] - Store name and flow timing configuration
//! - [`engine`] - The `CheckoutEngine` orchestrator
//! - [`error`] - Checkout error types
//! - [`memory`] - In-memory backend for standalone tills and tests
//! - [`telemetry`] - Tracing subscriber setup for host binaries
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use duka_checkout::{CheckoutConfig, CheckoutEngine, InMemoryBackend};
//! use duka_core::{EntryPoint, PaymentMethod};
//!
//! let config = CheckoutConfig::load_or_default(None);
//! let backend = Arc::new(InMemoryBackend::new(items));
//! let engine = CheckoutEngine::new(&config, backend.clone(), backend);
//!
//! engine.refresh_catalog().await?;
//! engine.quick_add("veg-001").await;
//! engine.start_checkout(&EntryPoint::Quick).await;
//! engine.select_method(PaymentMethod::Cash).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{CatalogProvider, CommitOutcome, DeclineReason, SaleCommitService};
pub use config::{CheckoutConfig, FlowSettings, StoreConfig};
pub use engine::{CheckoutEngine, CheckoutStatus};
pub use error::{CheckoutError, CheckoutResult};
pub use memory::InMemoryBackend;
