use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::MySqlPool;
use tracing::warn;

use crate::store::memory::{MemoryAttendanceStore, MemoryEmployeeStore};
use crate::store::mysql::{MySqlAttendanceStore, MySqlEmployeeStore};
use crate::store::{AttendanceStore, EmployeeStore};

pub const MEMORY_URL: &str = "memory:";

#[derive(Clone)]
pub struct Stores {
    pub attendance: Arc<dyn AttendanceStore>,
    pub employees: Arc<dyn EmployeeStore>,
    /// Present only for MySQL-backed stores.
    pub pool: Option<MySqlPool>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            attendance: Arc::new(MemoryAttendanceStore::default()),
            employees: Arc::new(MemoryEmployeeStore::default()),
            pool: None,
        }
    }

    pub fn mysql(pool: MySqlPool) -> Self {
        Self {
            attendance: Arc::new(MySqlAttendanceStore::new(pool.clone())),
            employees: Arc::new(MySqlEmployeeStore::new(pool.clone())),
            pool: Some(pool),
        }
    }
}

pub async fn init_db(database_url: &str) -> Result<Stores> {
    if database_url.starts_with(MEMORY_URL) {
        warn!("Using in-memory store; records are lost on restart");
        return Ok(Stores::in_memory());
    }

    let pool = MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    Ok(Stores::mysql(pool))
}
