pub mod recording_queue;
