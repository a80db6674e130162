pub mod db;
pub mod job_store_factory;
pub mod queue;
pub mod recorder;
pub mod redis;
pub mod storage;
