//! PixelPipe Core - Image Action Pipeline Engine
//!
//! A caller hands in an encoded image and an ordered list of named
//! transformation steps; the engine applies them in sequence and hands
//! back the encoded result. The pieces:
//!
//! 1. Codec: wire string (base64, optional type header) to pixel buffer
//! 2. Registry: fixed name -> transformation table, built at startup
//! 3. Validator: structural gate over a candidate action list
//! 4. Executor: strict left-to-right fold through the registry

pub mod buffer;
pub mod codec;
pub mod ops;
pub mod pipeline;
pub mod registry;
pub mod validation;

pub use buffer::PixelBuffer;
pub use codec::{decode, encode, CodecError, OutputFormat, DEFAULT_FORMAT, DEFAULT_QUALITY};
pub use pipeline::{apply, process, process_as, Action, PipelineError};
pub use registry::{Arguments, Registry, RegistryBuilder, Transformation};
pub use validation::{actions_valid, check_actions, parse_actions, ValidationError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
