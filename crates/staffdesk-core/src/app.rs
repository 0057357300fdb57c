//! Composition root: builds every service once and wires them together.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::api::{ApiClient, BearerAuth, RefreshOnUnauthorized};
use crate::auth::{AuthService, Session, TokenRefresher};
use crate::choices::ChoicesStore;
use crate::config::Config;
use crate::crud::Slice;
use crate::dashboard::DashboardStore;
use crate::entities::{Company, Department, Employee};
use crate::list::ListController;
use crate::storage::{FileStore, KeyValueStore};
use crate::theme::ThemeStore;
use crate::toast::ToastBus;

pub struct AppContext {
    pub config: Config,
    pub session: Arc<Session>,
    pub client: ApiClient,
    pub toasts: Arc<ToastBus>,
    pub auth: AuthService,
    pub companies: Arc<Slice<Company>>,
    pub departments: Arc<Slice<Department>>,
    pub employees: Arc<Slice<Employee>>,
    pub choices: ChoicesStore,
    pub dashboard: DashboardStore,
    pub theme: ThemeStore,
}

impl AppContext {
    /// Builds the context with file-backed storage under `home`.
    ///
    /// # Errors
    /// Returns an error if persisted state cannot be read, the base URL is
    /// invalid, or the HTTP client cannot be built.
    pub fn init(config: Config, home: &Path) -> Result<Self> {
        let base_url = config.resolve_api_base_url()?;
        Self::with_store(config, &base_url, Arc::new(FileStore::new(home)))
    }

    /// Builds the context against an explicit base URL and store.
    ///
    /// # Errors
    /// Returns an error if persisted state cannot be read or the HTTP client
    /// cannot be built.
    pub fn with_store(
        config: Config,
        base_url: &str,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let timeout = config.request_timeout();
        let session = Arc::new(Session::init(Arc::clone(&store))?);
        let refresher = TokenRefresher::new(Arc::clone(&session), base_url, timeout)?;

        let client = ApiClient::builder(base_url)
            .timeout(timeout)
            .request_stage(BearerAuth::new(Arc::clone(&session)))
            .response_stage(RefreshOnUnauthorized::new(Arc::clone(&session), refresher))
            .build()?;

        let toasts = Arc::new(ToastBus::new(config.toast_duration()));
        tracing::debug!(base_url, "application context ready");

        Ok(Self {
            auth: AuthService::new(client.clone(), Arc::clone(&session)),
            companies: Arc::new(Slice::new(client.clone(), Arc::clone(&toasts))),
            departments: Arc::new(Slice::new(client.clone(), Arc::clone(&toasts))),
            employees: Arc::new(Slice::new(client.clone(), Arc::clone(&toasts))),
            choices: ChoicesStore::new(client.clone()),
            dashboard: DashboardStore::new(client.clone()),
            theme: ThemeStore::new(store),
            config,
            session,
            client,
            toasts,
        })
    }

    /// List controller over the company slice.
    pub fn company_list(&self) -> ListController<Company> {
        ListController::new(Arc::clone(&self.companies), self.config.effective_page_size())
    }

    pub fn department_list(&self) -> ListController<Department> {
        ListController::new(
            Arc::clone(&self.departments),
            self.config.effective_page_size(),
        )
    }

    pub fn employee_list(&self) -> ListController<Employee> {
        ListController::new(Arc::clone(&self.employees), self.config.effective_page_size())
    }
}
