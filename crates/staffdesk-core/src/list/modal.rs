use std::mem;

/// Lifecycle of a modal dialog.
///
/// `Closed -> Open -> (Submitting) -> Closed`. A modal only opens from
/// `Closed`; a failed submit returns to `Open`.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal<S> {
    Closed,
    Open(S),
    Submitting(S),
}

impl<S> Default for Modal<S> {
    fn default() -> Self {
        Modal::Closed
    }
}

impl<S> Modal<S> {
    /// Opens with `state`. Returns false if already open.
    pub fn open(&mut self, state: S) -> bool {
        if self.is_open() {
            return false;
        }
        *self = Modal::Open(state);
        true
    }

    /// `Open -> Submitting`. Returns false from any other state.
    pub fn begin_submit(&mut self) -> bool {
        match mem::replace(self, Modal::Closed) {
            Modal::Open(state) => {
                *self = Modal::Submitting(state);
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    /// `Submitting -> Open`, letting `update` record the failure.
    pub fn fail_submit(&mut self, update: impl FnOnce(&mut S)) {
        match mem::replace(self, Modal::Closed) {
            Modal::Submitting(mut state) => {
                update(&mut state);
                *self = Modal::Open(state);
            }
            other => *self = other,
        }
    }

    pub fn close(&mut self) {
        *self = Modal::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Modal::Submitting(_))
    }

    pub fn state(&self) -> Option<&S> {
        match self {
            Modal::Closed => None,
            Modal::Open(state) | Modal::Submitting(state) => Some(state),
        }
    }

    pub fn state_mut(&mut self) -> Option<&mut S> {
        match self {
            Modal::Closed => None,
            Modal::Open(state) | Modal::Submitting(state) => Some(state),
        }
    }
}
