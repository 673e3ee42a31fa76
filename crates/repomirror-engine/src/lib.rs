//! Run controller for repomirror
//!
//! This crate wires the synchronization stages into one mirror run:
//!
//! - **Controller**: Gate, snapshot, plan, stage, validate, commit and check, in that order
//! - **Builder**: Production stages by default, any of them replaceable for tests
//! - **Report aggregation**: Stage reports merged and sorted by name
//!
//! # Examples
//!
//! ```rust,no_run
//! use repomirror_config::ConfigLoader;
//! use repomirror_engine::{ControllerBuilder, RunOutcome};
//! use repomirror_network::{FtpRepository, FtpSettings, SuppaConnector};
//! use repomirror_sync::RunContext;
//! use repomirror_types::{NoProgress, OperatorPrompt};
//! use std::rc::Rc;
//!
//! # fn example(prompt: Rc<dyn OperatorPrompt>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load_from_file("mirror.yaml")?;
//! let mut remote = FtpRepository::new(SuppaConnector, FtpSettings::from_config(&config));
//! let ctx = RunContext::new(config).with_once_per_day(true);
//!
//! let controller = ControllerBuilder::new(prompt).build();
//! if let RunOutcome::Completed { synchronized, report } = controller.run(&ctx, &mut remote, &mut NoProgress)? {
//!     println!("in sync: {}, {} report items", synchronized, report.len());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod controller;
pub mod report;

pub use controller::{ControllerBuilder, RunOutcome, SyncController};
pub use report::ReportAggregator;
