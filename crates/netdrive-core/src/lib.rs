pub mod blacklist;
pub mod catalog;
pub mod config;
pub mod dns;
pub mod drives;
pub mod engine;
pub mod error;
pub mod identity;
pub mod pattern;
pub mod platform;
pub mod progress;
pub mod settings;
pub mod storage;
pub mod unc;

pub use config::AppConfig;
pub use drives::{DriveRecord, DriveSource};
pub use engine::{DriveOutcome, ReconcileEngine, RunOptions, RunReport};
pub use error::{DnsError, Error, PlatformError};
pub use identity::Identity;
pub use progress::{ProgressReporter, SilentReporter};
