pub mod model;
pub mod store;

pub use model::{derive_status, Contest, ContestStatus, Platform};
pub use store::{
    ContestQuery, ContestStore, InMemoryContestStore, PgContestStore, SharedContestStore,
    SortOrder, StatusTransition, StoreError, UpsertOutcome,
};
