//! Dashboard statistics.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiRequest};

pub const DASHBOARD_PATH: &str = "/dashboard-stats/";
const LOAD_FAILED: &str = "Failed to load dashboard data.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub companies: u64,
    pub departments: u64,
    pub employees: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeesPerCompany {
    pub name: String,
    pub employee_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentsPerCompany {
    pub name: String,
    pub department_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub employees_per_company: Vec<EmployeesPerCompany>,
    #[serde(default)]
    pub departments_per_company: Vec<DepartmentsPerCompany>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub stats: Totals,
    #[serde(default)]
    pub chart_data: ChartData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    /// Zeroed until the first successful load
    pub data: DashboardStats,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct DashboardStore {
    client: ApiClient,
    state: Mutex<DashboardState>,
}

impl DashboardStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Mutex::new(DashboardState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> DashboardState {
        self.lock().clone()
    }

    pub async fn fetch_dashboard_data(&self) {
        {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
        }

        let result = self
            .client
            .fetch::<DashboardStats>(ApiRequest::get(DASHBOARD_PATH))
            .await;

        let mut state = self.lock();
        state.loading = false;
        match result {
            Ok(data) => state.data = data,
            Err(err) => {
                tracing::warn!(error = %err, "dashboard fetch failed");
                state.error = Some(LOAD_FAILED.to_string());
            }
        }
    }
}
