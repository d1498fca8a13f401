use std::sync::Arc;
use std::time::Duration;

use crate::attendance::AttendanceService;
use crate::config::Config;
use crate::db::Stores;
use crate::store::EmployeeStore;
use crate::utils::employee_directory::EmployeeDirectory;

/// Shared handler state, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub attendance: AttendanceService,
    pub employees: Arc<dyn EmployeeStore>,
    pub directory: EmployeeDirectory,
}

impl AppState {
    pub fn new(stores: &Stores, config: &Config) -> Self {
        let directory = EmployeeDirectory::new(
            stores.employees.clone(),
            Duration::from_secs(config.employee_cache_ttl),
        );
        let attendance = AttendanceService::new(
            stores.attendance.clone(),
            directory.clone(),
            config.late_cutoff,
            config.absence_mode,
        );

        Self {
            attendance,
            employees: stores.employees.clone(),
            directory,
        }
    }
}
