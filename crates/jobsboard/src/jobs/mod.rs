pub mod demo;
pub mod model;
pub mod query;
pub mod repo;

pub use model::{JobRecord, JobStatus, SortColumn, SortOrder};
pub use query::{JobsInfo, JobsQuery, Paged, Statistics};
pub use repo::{JobSource, JobsRepo, MemoryJobSource};
