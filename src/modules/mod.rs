pub mod recording;
pub mod videos;
