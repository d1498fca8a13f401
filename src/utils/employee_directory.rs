use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;

use crate::error::AppResult;
use crate::model::attendance::AttendanceRecord;
use crate::store::EmployeeStore;

const CACHE_CAPACITY: u64 = 50_000;

/// Resolves employee ids to their current display names.
///
/// Misses are cached too (`None`), so manual entries whose generated id has
/// no employee behind it do not hit the store on every listing. Writers to
/// the employee table must call [`EmployeeDirectory::invalidate`].
#[derive(Clone)]
pub struct EmployeeDirectory {
    store: Arc<dyn EmployeeStore>,
    names: Cache<String, Option<String>>,
}

impl EmployeeDirectory {
    pub fn new(store: Arc<dyn EmployeeStore>, ttl: Duration) -> Self {
        Self {
            store,
            names: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn resolve(&self, employee_id: &str) -> AppResult<Option<String>> {
        if let Some(hit) = self.names.get(employee_id).await {
            return Ok(hit);
        }

        let name = self
            .store
            .find_by_employee_id(employee_id)
            .await?
            .map(|employee| employee.name);

        self.names.insert(employee_id.to_string(), name.clone()).await;
        Ok(name)
    }

    /// Replaces each record's stored name with the directory name, when the
    /// employee is known.
    pub async fn resolve_names(&self, records: &mut [AttendanceRecord]) -> AppResult<()> {
        let ids: BTreeSet<&str> = records.iter().map(|r| r.employee_id.as_str()).collect();

        let lookups = ids.into_iter().map(|id| async move {
            self.resolve(id).await.map(|name| (id.to_string(), name))
        });
        let resolved: HashMap<String, Option<String>> =
            futures::future::try_join_all(lookups).await?.into_iter().collect();

        for record in records.iter_mut() {
            if let Some(Some(name)) = resolved.get(&record.employee_id) {
                record.employee_name.clone_from(name);
            }
        }
        Ok(())
    }

    pub async fn invalidate(&self, employee_id: &str) {
        self.names.invalidate(employee_id).await;
    }

    async fn prime(&self, entries: &[(String, String)]) {
        let futures: Vec<_> = entries
            .iter()
            .map(|(id, name)| self.names.insert(id.clone(), Some(name.clone())))
            .collect();

        futures::future::join_all(futures).await;
    }
}

/// Load every employee's name into the directory cache (batched)
pub async fn warmup_employee_directory(
    pool: &MySqlPool,
    directory: &EmployeeDirectory,
    batch_size: usize,
) -> Result<()> {
    let mut stream =
        sqlx::query_as::<_, (String, String)>("SELECT employee_id, name FROM employees").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        batch.push(row?);
        total += 1;

        if batch.len() >= batch_size {
            directory.prime(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        directory.prime(&batch).await;
    }

    tracing::info!(total, "Employee directory warmup complete");
    Ok(())
}
