use serde::Deserialize;

/// A list response: paginated envelope or bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Envelope {
        results: Vec<T>,
        #[serde(default)]
        count: Option<usize>,
    },
    Bare(Vec<T>),
}

impl<T> ListPayload<T> {
    /// Rows and total count. The count never falls below the rows received.
    pub fn into_parts(self) -> (Vec<T>, usize) {
        match self {
            ListPayload::Envelope { results, count } => {
                let count = count.unwrap_or(results.len()).max(results.len());
                (results, count)
            }
            ListPayload::Bare(items) => {
                let count = items.len();
                (items, count)
            }
        }
    }
}

/// `ceil(count / page_size)`; zero rows means zero pages.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// Monotonic tokens identifying the latest dispatched fetch.
#[derive(Debug, Default)]
pub struct RequestSeq {
    latest: u64,
}

impl RequestSeq {
    pub fn next(&mut self) -> u64 {
        self.latest = self.latest.wrapping_add(1);
        self.latest
    }

    pub fn is_latest(&self, token: u64) -> bool {
        self.latest == token
    }
}
