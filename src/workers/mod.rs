pub mod recording_worker;
