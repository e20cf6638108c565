//! Media assembly: per-unit muxing and ordered concatenation through an
//! external encoder.

mod assemble;
mod config;
mod encoder;
mod error;
mod ffmpeg;
mod manifest;

pub use assemble::Assembler;
pub use config::EncoderConfig;
pub use encoder::{EncodeMode, MediaEncoder};
pub use error::AssemblyError;
pub use ffmpeg::FfmpegEncoder;
pub use manifest::{parse_manifest, render_manifest};
