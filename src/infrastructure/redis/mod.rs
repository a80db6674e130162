pub mod client;
pub mod job_store;
