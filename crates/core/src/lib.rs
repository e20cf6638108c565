pub mod assembler;
pub mod cancel;
pub mod config;
pub mod content;
pub mod generator;
pub mod metrics;
pub mod orchestrator;
pub mod processor;
pub mod splicer;
pub mod staging;
pub mod testing;

mod process;

pub use assembler::{
    Assembler, AssemblyError, EncodeMode, EncoderConfig, FfmpegEncoder, MediaEncoder,
};
pub use cancel::CancelToken;
pub use config::{
    config_path, load_config, load_config_from_str, validate_config, Config, ConfigError,
    ContentConfig, RenderServerConfig,
};
pub use content::{
    load_directory, load_file, ContentError, ContentNode, NodePath, RenderKind, TextUnit,
};
pub use generator::{
    CaptureConfig, CaptureGenerator, GenerationError, GenerationErrorKind, GenerationRequest,
    GeneratorRole, HttpSpeechGenerator, RenderPayload, SpeechConfig, UnitGenerator,
};
pub use orchestrator::{
    DispatchReport, Orchestrator, OrchestratorConfig, OrchestratorError, OrchestratorStatus,
};
pub use processor::{Clip, ClipSource, NodeError, NodeProcessor};
pub use splicer::{ConcatOrder, SpliceError, SpliceReport, SpliceState, TreeSplicer};
pub use staging::{NodeStaging, StagingArea, StagingConfig, StagingError};
