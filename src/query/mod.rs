//! Data-fetching primitives: cached reads, writes, and debounced calls.

pub mod debounce;
pub mod fetch;
pub mod mutation;
pub mod options;

pub use debounce::Debouncer;
pub use fetch::Query;
pub use mutation::{Mutation, MutationOptions};
pub use options::QueryOptions;
