pub mod command;
pub mod error;
pub mod file;
pub mod profile;
pub mod stream;
pub mod units;

pub use command::{CommandBuilder, InputId, OutputId};
pub use error::{TransformError, TransformResult};
pub use file::{File, FileKind};
pub use profile::{AudioProfile, MediaProfile, VideoProfile};
pub use stream::{Codec, Stream, StreamId, StreamLabel, StreamMut, StreamRef, StreamType};
