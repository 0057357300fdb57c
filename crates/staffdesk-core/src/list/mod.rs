//! List page orchestration: one slice plus page, selection, and modals.

pub mod modal;

use std::sync::{Arc, Mutex, MutexGuard};

pub use modal::Modal;

use crate::crud::{Entity, FieldErrors, MutationOutcome, Slice, total_pages};

/// Row pending deletion.
#[derive(Debug, Clone)]
pub struct DeleteState<T> {
    pub item: T,
    pub error: Option<String>,
}

/// Why the last form submit failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub message: String,
    /// Per-field messages, when the backend sent them
    pub fields: Option<FieldErrors>,
}

/// Add/edit form contents.
#[derive(Debug, Clone)]
pub struct FormState<T: Entity> {
    /// Row being edited; `None` when adding
    pub editing: Option<T>,
    pub draft: T::Draft,
    pub error: Option<FormError>,
}

impl<T: Entity> FormState<T> {
    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub id: i64,
}

/// Display-ready snapshot of a list page.
#[derive(Debug, Clone)]
pub struct ListView<T: Entity> {
    pub items: Vec<T>,
    pub count: usize,
    pub page: usize,
    pub total_pages: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub delete: Modal<DeleteState<T>>,
    pub form: Modal<FormState<T>>,
    pub view: Modal<ViewState>,
    pub view_item: Option<T>,
    pub view_loading: bool,
    pub view_error: Option<String>,
}

struct UiState<T: Entity> {
    page: usize,
    delete: Modal<DeleteState<T>>,
    form: Modal<FormState<T>>,
    view: Modal<ViewState>,
}

/// Drives one list page on top of a shared [`Slice`].
pub struct ListController<T: Entity> {
    slice: Arc<Slice<T>>,
    page_size: usize,
    ui: Mutex<UiState<T>>,
}

impl<T: Entity> ListController<T> {
    pub fn new(slice: Arc<Slice<T>>, page_size: usize) -> Self {
        Self {
            slice,
            page_size: page_size.max(1),
            ui: Mutex::new(UiState {
                page: 1,
                delete: Modal::Closed,
                form: Modal::Closed,
                view: Modal::Closed,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, UiState<T>> {
        self.ui
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn slice(&self) -> &Arc<Slice<T>> {
        &self.slice
    }

    pub fn page(&self) -> usize {
        self.lock().page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.slice.snapshot().count, self.page_size)
    }

    /// Initial fetch of the current page.
    pub async fn mount(&self) {
        let page = self.page();
        self.slice.fetch_items(page).await;
    }

    /// Moves to `page` (minimum 1) and fetches it if it changed.
    pub async fn set_page(&self, page: usize) {
        let page = page.max(1);
        {
            let mut ui = self.lock();
            if ui.page == page {
                return;
            }
            ui.page = page;
        }
        self.slice.fetch_items(page).await;
    }

    pub fn open_delete(&self, item: T) -> bool {
        self.lock().delete.open(DeleteState { item, error: None })
    }

    pub fn close_delete(&self) {
        self.lock().delete.close();
    }

    /// Deletes the selected row.
    ///
    /// On success the modal closes and the page is re-fetched, stepping back
    /// one page when the row was the last one on a page beyond the first.
    /// On failure the modal stays open with the error. Returns `None` when no
    /// delete is pending.
    pub async fn confirm_delete(&self) -> Option<MutationOutcome<T>> {
        let id = {
            let mut ui = self.lock();
            if !ui.delete.begin_submit() {
                return None;
            }
            ui.delete.state().map(|s| s.item.id())?
        };

        let outcome = self.slice.delete_item(id).await;

        if let MutationOutcome::Failure { error, .. } = &outcome {
            self.lock()
                .delete
                .fail_submit(|s| s.error = Some(error.clone()));
            return Some(outcome);
        }

        let (page, step_back) = {
            let mut ui = self.lock();
            ui.delete.close();
            let sole_row = self.slice.items_len() == 1;
            (ui.page, sole_row && ui.page > 1)
        };
        if step_back {
            self.set_page(page - 1).await;
        } else {
            self.slice.fetch_items(page).await;
        }
        Some(outcome)
    }

    /// Opens the form seeded with an empty draft.
    pub fn open_add(&self) -> bool {
        self.lock().form.open(FormState {
            editing: None,
            draft: T::Draft::default(),
            error: None,
        })
    }

    /// Opens the form seeded from `item`.
    pub fn open_edit(&self, item: T) -> bool {
        let draft = item.to_draft();
        self.lock().form.open(FormState {
            editing: Some(item),
            draft,
            error: None,
        })
    }

    pub fn close_form(&self) {
        self.lock().form.close();
    }

    /// Submits `draft` as an update when editing, otherwise as a create.
    ///
    /// Returns `None` when the form is not open.
    pub async fn submit_form(&self, draft: T::Draft) -> Option<MutationOutcome<T>> {
        let editing = {
            let mut ui = self.lock();
            if !ui.form.begin_submit() {
                return None;
            }
            let state = ui.form.state_mut()?;
            state.draft = draft.clone();
            state.error = None;
            state.editing.as_ref().map(Entity::id)
        };

        let outcome = match editing {
            Some(id) => self.slice.update_item(id, &draft).await,
            None => self.slice.add_item(&draft).await,
        };

        match &outcome {
            MutationOutcome::Success { .. } => {
                let page = {
                    let mut ui = self.lock();
                    ui.form.close();
                    ui.page
                };
                self.slice.fetch_items(page).await;
            }
            MutationOutcome::Failure {
                error,
                field_errors,
            } => {
                let form_error = FormError {
                    message: error.clone(),
                    fields: field_errors.clone(),
                };
                self.lock()
                    .form
                    .fail_submit(|s| s.error = Some(form_error));
            }
        }
        Some(outcome)
    }

    /// Opens the view modal and loads the record. Returns false if the modal
    /// was already open.
    pub async fn open_view(&self, id: i64) -> bool {
        let opened = self.lock().view.open(ViewState { id });
        if opened {
            self.slice.fetch_item_by_id(id).await;
        }
        opened
    }

    /// Hides the view modal. An in-flight fetch still lands in the slice.
    pub fn close_view(&self) {
        self.lock().view.close();
    }

    pub fn snapshot(&self) -> ListView<T> {
        let slice = self.slice.snapshot();
        let ui = self.lock();
        ListView {
            total_pages: total_pages(slice.count, self.page_size),
            items: slice.items,
            count: slice.count,
            page: ui.page,
            loading: slice.loading,
            error: slice.error,
            delete: ui.delete.clone(),
            form: ui.form.clone(),
            view: ui.view.clone(),
            view_item: slice.view_item,
            view_loading: slice.view_loading,
            view_error: slice.view_error,
        }
    }
}
