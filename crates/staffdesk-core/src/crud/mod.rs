//! Generic CRUD synchronization engine.

pub mod entity;
pub mod outcome;
pub mod page;
pub mod slice;

pub use entity::{Entity, Resource};
pub use outcome::{FieldErrors, Mutation, MutationOutcome};
pub use page::{ListPayload, total_pages};
pub use slice::{Slice, SliceState};
