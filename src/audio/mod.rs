//! Audio module - playback, the filter pipeline, and spectrum analysis.

pub mod metadata;
pub mod pipeline;
pub mod player;
pub mod spectrum;

// Re-export commonly used types
pub use metadata::TrackMetadata;
pub use pipeline::{Bus, Element, ElementId, ElementState, PipelineEvent, Registry};
pub use player::MusicPlayer;
pub use spectrum::SpectrumElement;
