pub mod job_store;
pub mod pool;
