pub mod handlers;
pub mod ingestion;
pub mod platforms;
pub mod query;
pub mod reconciler;
pub mod scheduler;
