//! Unit generation back-ends.
//!
//! Every unit of text is turned into two artifacts: narration audio and a
//! screenshot. Both are produced through the [`UnitGenerator`] trait so the
//! pipeline can run against real services or test doubles.

mod capture;
mod config;
mod error;
mod speech;
mod traits;
mod types;

pub use capture::CaptureGenerator;
pub use config::{CaptureConfig, SpeechConfig};
pub use error::{GenerationError, GenerationErrorKind};
pub use speech::HttpSpeechGenerator;
pub use traits::UnitGenerator;
pub use types::{GenerationRequest, GeneratorRole, RenderPayload};
