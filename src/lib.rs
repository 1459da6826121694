#![forbid(unsafe_code)]

//! `logwarden` - Structured logging service with notifier fan-out, metrics,
//! and size-based rotation.
//!
//! The same core serves two shapes:
//! - One-shot CLI invocations that write a single entry and exit
//! - A single-instance daemon that ingests entries over HTTP, fans them
//!   out to configured notifiers, and keeps counters and log files in shape
//!
//! # Example
//!
//! ```no_run
//! use logwarden::{ConfigHandle, Level, Logger, MetricsStore, NotifierManager};
//! use std::sync::Arc;
//!
//! let config = ConfigHandle::default();
//! let logger = Logger::new(
//!     config,
//!     Arc::new(NotifierManager::new()),
//!     Arc::new(MetricsStore::open_default()),
//! );
//!
//! logger.info("application started");
//! let entry = logger
//!     .entry(Level::Warn)
//!     .message("connection timeout")
//!     .source("net")
//!     .build();
//! logger.log(&entry);
//! ```

pub mod cli;
pub mod config;
pub mod daemon;
pub mod entry;
pub mod error;
pub mod fmt;
pub mod level;
pub mod logger;
pub mod metrics;
pub mod notify;
pub mod rotate;
pub mod tail;
pub mod writer;

pub use config::{Config, ConfigHandle, ConfigManager, IntegrationConfig, Mode, NotifierConfig};
pub use entry::{EntryBuilder, LogEntry};
pub use error::Error;
pub use level::Level;
pub use logger::Logger;
pub use metrics::{Metric, MetricsStore};
pub use notify::{FiringRules, Notifier, NotifierManager};
pub use tail::Tailer;
pub use writer::{Target, Writer};
