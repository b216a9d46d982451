//! Platform administration: dashboard counts, reports, account moderation,
//! and the audit trail.

pub mod report;
pub mod router;
pub mod service;
pub mod users;


pub use report::{CompanyActivity, Report, ReportKind, ReportWindow};
pub use router::{admin_router, ReportFormat, ReportQuery};
pub use service::{AdminError, AdminService, AdminStore, PlatformOverview};
pub use users::{BulkUserAction, BulkUserActionSummary, UserAction, UserActionRequest};
