//! # salon-db: Database Layer for the Salon Back Office
//!
//! SQLite storage for therapists, transactions and the hours ledger, plus
//! the report service that feeds stored data through salon-core.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Salon Data Flow                                  │
//! │                                                                         │
//! │  Dashboard request (payroll for June)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     salon-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ TherapistRepo  │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ TransactionRepo│    │              │  │   │
//! │  │   │               │    │ HoursRepo      │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │            ▲                                                    │   │
//! │  │            │          ┌────────────────┐                        │   │
//! │  │            └──────────│ ReportService  │──► salon-core          │   │
//! │  │                       └────────────────┘                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`report`] - Fetch-then-compute reports
//!
//! ## Usage
//!
//! ```rust,ignore
//! use salon_core::{DateRange, SalonConfig};
//! use salon_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./salon.db")).await?;
//! let config = SalonConfig::from_env()?;
//!
//! let payroll = db.reports(config).payroll_summary(&range).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod report;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use report::ReportService;

pub use repository::hours::HoursRepository;
pub use repository::therapist::TherapistRepository;
pub use repository::transaction::TransactionRepository;
