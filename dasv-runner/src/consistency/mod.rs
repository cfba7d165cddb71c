//! Repository hygiene checks
//!
//! - `registry_check` - files named by the registry exist and every domain has all four phases
//! - `path_sync` - literal paths that should use registry path variables
//! - `report` - scored issue lists saved as timestamped JSON

pub mod path_sync;
pub mod registry_check;
pub mod report;

pub use path_sync::{FixSummary, PathSynchronizer, BACKUP_DIR, PATH_SYNC_REPORT_KIND};
pub use registry_check::{RegistryConsistencyValidator, REGISTRY_REPORT_KIND};
pub use report::{ConsistencyIssue, ConsistencyReport, IssueKind};
