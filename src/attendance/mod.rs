//! Attendance record lifecycle: derived metrics, the service that owns every
//! write, and CSV reports.

pub mod export;
pub mod metrics;
pub mod service;

pub use metrics::LateCutoff;
pub use service::{AbsenceMode, AttendanceFilter, AttendanceService, DashboardSummary, ManualEntry};
