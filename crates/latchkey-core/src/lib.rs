//! # latchkey-core
//!
//! Core scheduling engine for latchkey, a booking system for time-bounded
//! smart lock access.
//!
//! This crate provides:
//! - Time window arithmetic and overlap detection
//! - The booking lifecycle state machine
//! - Request validation and availability checking
//! - Consecutive-booking grouping for maintenance
//! - The scheduling orchestrator, serialized per device
//!
//! ## Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`window`] - The `TimeWindow` value type and interval arithmetic
//! - [`booking`] - The `Booking` aggregate, its lifecycle, and user records
//! - [`validation`] - Booking request validation
//! - [`availability`] - Overlap detection against existing windows
//! - [`grouping`] - Consecutive-booking grouping
//! - [`codegen`] - Random access code generation
//! - [`provider`] - The external access code provider capability
//! - [`notify`] - The fire-and-forget notification capability
//! - [`repository`] / [`storage`] - Booking and user persistence
//! - [`scheduler`] - The orchestrator tying the above together
//! - [`config`] - Application configuration
//! - [`error`] - Unified error types

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod availability;
pub mod booking;
pub mod codegen;
pub mod config;
pub mod error;
pub mod grouping;
pub mod notify;
pub mod provider;
pub mod repository;
pub mod scheduler;
pub mod storage;
pub mod validation;
pub mod window;

// Re-export primary types for convenience
pub use availability::{find_conflict, is_available};
pub use booking::{Booking, BookingStatus, LifecycleError, User};
pub use codegen::{generate_access_code, DEFAULT_CODE_LENGTH};
pub use config::{
    ConfigError, DeviceConfig, LatchkeyConfig, SchedulingConfig, StorageConfig, SystemConfig,
};
pub use error::{LatchkeyError, Result};
pub use grouping::{consecutive_groups, DEFAULT_ADJACENCY_THRESHOLD_SECS};
pub use notify::{Contact, LogSink, Notice, NotificationSink};
#[cfg(feature = "memory-provider")]
pub use provider::MemoryProvider;
pub use provider::{AccessCodeProvider, IssuedCode, ProviderCode, ProviderError};
pub use repository::{BookingRepository, MemoryRepository, RepositoryError};
pub use scheduler::{BookedPeriod, Scheduler, SchedulerError};
pub use storage::{default_data_dir, JsonFileRepository};
pub use validation::{
    validate_booking_request, BookingRequest, ValidationError, MAX_DURATION_HOURS,
};
pub use window::{TimeWindow, WindowError};
