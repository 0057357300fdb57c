//! Generic list/view/mutation state for one entity kind.
//!
//! Fetch failures are absorbed into state and prior rows stay visible.
//! Mutations report a [`MutationOutcome`] and push a toast. List and view
//! fetches carry sequence tokens so only the latest response lands.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use super::entity::{Entity, Resource};
use super::outcome::{Mutation, MutationOutcome, mutation_error};
use super::page::{ListPayload, RequestSeq};
use crate::api::{ApiClient, ApiError, ApiRequest, ApiResult};
use crate::toast::ToastBus;

/// Observable state of a slice.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceState<T> {
    /// Current page, server order
    pub items: Vec<T>,
    /// Unpaged cache
    pub all_items: Vec<T>,
    /// Total rows matching the list query
    pub count: usize,
    pub view_item: Option<T>,
    pub loading: bool,
    pub all_items_loading: bool,
    pub view_loading: bool,
    pub error: Option<String>,
    pub view_error: Option<String>,
}

impl<T> Default for SliceState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            all_items: Vec::new(),
            count: 0,
            view_item: None,
            loading: false,
            all_items_loading: false,
            view_loading: false,
            error: None,
            view_error: None,
        }
    }
}

struct Inner<T> {
    state: SliceState<T>,
    list_seq: RequestSeq,
    view_seq: RequestSeq,
}

pub struct Slice<T: Entity> {
    resource: Resource,
    client: ApiClient,
    toasts: Arc<ToastBus>,
    inner: Mutex<Inner<T>>,
}

impl<T: Entity> Slice<T> {
    /// Slice for `T`'s own resource.
    pub fn new(client: ApiClient, toasts: Arc<ToastBus>) -> Self {
        Self::with_resource(client, toasts, T::resource())
    }

    pub fn with_resource(client: ApiClient, toasts: Arc<ToastBus>, resource: Resource) -> Self {
        Self {
            resource,
            client,
            toasts,
            inner: Mutex::new(Inner {
                state: SliceState::default(),
                list_seq: RequestSeq::default(),
                view_seq: RequestSeq::default(),
            }),
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SliceState<T> {
        self.lock().state.clone()
    }

    /// Rows on the current page.
    pub fn items_len(&self) -> usize {
        self.lock().state.items.len()
    }

    /// Loads one page into `items` and `count`.
    pub async fn fetch_items(&self, page: usize) {
        let token = {
            let mut inner = self.lock();
            inner.state.loading = true;
            inner.state.error = None;
            inner.list_seq.next()
        };

        let request = ApiRequest::get(self.resource.endpoint).with_query("page", page);
        let result = self.client.fetch::<ListPayload<T>>(request).await;

        let mut inner = self.lock();
        if !inner.list_seq.is_latest(token) {
            tracing::debug!(
                resource = self.resource.entity_name_plural,
                page,
                "discarding stale list response"
            );
            return;
        }
        inner.state.loading = false;
        match result {
            Ok(payload) => {
                let (items, count) = payload.into_parts();
                inner.state.items = items;
                inner.state.count = count;
            }
            Err(err) => {
                tracing::warn!(
                    resource = self.resource.entity_name_plural,
                    page,
                    error = %err,
                    "list fetch failed"
                );
                inner.state.error = Some(
                    err.detail_or(format!("Failed to load {}", self.resource.entity_name_plural)),
                );
            }
        }
    }

    /// Loads the unpaged collection. No-op without an `all_endpoint`.
    pub async fn fetch_all_items(&self) {
        let Some(endpoint) = self.resource.all_endpoint else {
            return;
        };
        self.lock().state.all_items_loading = true;

        let result = self
            .client
            .fetch::<ListPayload<T>>(ApiRequest::get(endpoint))
            .await;

        let mut inner = self.lock();
        inner.state.all_items_loading = false;
        match result {
            Ok(payload) => inner.state.all_items = payload.into_parts().0,
            Err(err) => {
                tracing::warn!(
                    resource = self.resource.entity_name_plural,
                    error = %err,
                    "unpaged fetch failed"
                );
                inner.state.error = Some(err.detail_or(format!(
                    "Failed to load all {}",
                    self.resource.entity_name_plural
                )));
            }
        }
    }

    /// Replaces `view_item` with the record `id`.
    pub async fn fetch_item_by_id(&self, id: i64) {
        let token = {
            let mut inner = self.lock();
            inner.state.view_item = None;
            inner.state.view_error = None;
            inner.state.view_loading = true;
            inner.view_seq.next()
        };

        let request = ApiRequest::get(self.resource.item_path(id));
        let result = self.client.fetch::<T>(request).await;

        let mut inner = self.lock();
        if !inner.view_seq.is_latest(token) {
            tracing::debug!(
                resource = self.resource.entity_name,
                id,
                "discarding stale view response"
            );
            return;
        }
        inner.state.view_loading = false;
        match result {
            Ok(item) => inner.state.view_item = Some(item),
            Err(err) => {
                inner.state.view_error = Some(
                    err.detail_or(format!("Failed to load {}", self.resource.entity_name)),
                );
            }
        }
    }

    pub async fn add_item(&self, draft: &T::Draft) -> MutationOutcome<T> {
        let result = match encode(draft) {
            Ok(body) => {
                self.client
                    .dispatch(ApiRequest::post(self.resource.endpoint, body))
                    .await
            }
            Err(err) => Err(err),
        };
        self.complete(Mutation::Add, result.map(|r| decode_item(r.body)))
    }

    /// Updates `id`; on success the matching row in `items` is replaced in place.
    pub async fn update_item(&self, id: i64, draft: &T::Draft) -> MutationOutcome<T> {
        let result = match encode(draft) {
            Ok(body) => {
                self.client
                    .dispatch(ApiRequest::put(self.resource.item_path(id), body))
                    .await
            }
            Err(err) => Err(err),
        };
        let result = result.map(|r| decode_item::<T>(r.body));

        if let Ok(Some(updated)) = &result {
            let mut inner = self.lock();
            if let Some(slot) = inner.state.items.iter_mut().find(|item| item.id() == id) {
                *slot = updated.clone();
            }
        }
        self.complete(Mutation::Update, result)
    }

    /// Deletes `id`. `items` is left alone; callers re-fetch.
    pub async fn delete_item(&self, id: i64) -> MutationOutcome<T> {
        let result = self
            .client
            .dispatch(ApiRequest::delete(self.resource.item_path(id)))
            .await
            .map(|_| None);
        self.complete(Mutation::Delete, result)
    }

    fn complete(&self, mutation: Mutation, result: ApiResult<Option<T>>) -> MutationOutcome<T> {
        match result {
            Ok(data) => {
                tracing::info!(resource = self.resource.entity_name, %mutation, "mutation succeeded");
                self.toasts.success(mutation.success_message(&self.resource));
                MutationOutcome::Success { data }
            }
            Err(err) => {
                tracing::warn!(
                    resource = self.resource.entity_name,
                    %mutation,
                    error = %err,
                    "mutation failed"
                );
                self.toasts.error(mutation.failure_message(&self.resource));
                let (error, field_errors) = mutation_error(&err, &self.resource, mutation);
                MutationOutcome::Failure {
                    error,
                    field_errors,
                }
            }
        }
    }
}

fn encode(draft: &impl Serialize) -> ApiResult<serde_json::Value> {
    serde_json::to_value(draft).map_err(|e| ApiError::parse(format!("Failed to encode draft: {e}")))
}

fn decode_item<T: Entity>(body: serde_json::Value) -> Option<T> {
    match serde_json::from_value(body) {
        Ok(item) => Some(item),
        Err(err) => {
            tracing::debug!(error = %err, "mutation response is not a full record");
            None
        }
    }
}
