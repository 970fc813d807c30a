use once_cell::unsync::OnceCell;
use tracing::trace;

use crate::core::error::{TransformError, TransformResult};
use crate::core::file::File;

/// Handle of a stream inside its owning [`File`]. Stable across reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamType {
    #[default]
    Any,
    Video,
    Audio,
    Subtitle,
    Data,
    Unknown,
}

impl StreamType {
    /// Stream specifier letter used by ffmpeg. `Any` and `Unknown` have none.
    pub fn specifier(self) -> &'static str {
        match self {
            StreamType::Video => "v",
            StreamType::Audio => "a",
            StreamType::Subtitle => "s",
            StreamType::Data => "d",
            StreamType::Any | StreamType::Unknown => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Codec {
    /// No codec requested; output streams fall back to stream copy.
    #[default]
    Default,
    Explicit(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamLabel {
    /// Numbered by position among same-typed streams of the file.
    Auto,
    Index(usize),
    Named(String),
}

/// One input or output stream. Owned by a [`File`]; use [`StreamRef`] and
/// [`StreamMut`] to work with it in the context of that file.
#[derive(Debug)]
pub struct Stream {
    pub(crate) id: StreamId,
    label: StreamLabel,
    resolved: OnceCell<String>,
    stream_type: StreamType,
    is_input: bool,
    is_mapped: bool,
    codec: Codec,
    options: Vec<String>,
}

impl Stream {
    pub(crate) fn new(id: StreamId, label: StreamLabel, stream_type: StreamType, is_input: bool) -> Self {
        Self {
            id,
            label,
            resolved: OnceCell::new(),
            stream_type,
            is_input,
            is_mapped: false,
            codec: Codec::Default,
            options: Vec::new(),
        }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn label(&self) -> &StreamLabel {
        &self.label
    }

    pub fn stream_type(&self) -> StreamType {
        self.stream_type
    }

    pub fn is_input(&self) -> bool {
        self.is_input
    }

    pub fn is_mapped(&self) -> bool {
        self.is_mapped
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Same slot with a fresh option set.
    ///
    /// Identity (label, an already resolved name, type) and the input, mapped
    /// and codec flags carry over; options never do.
    pub fn duplicate(&self) -> Stream {
        let resolved = OnceCell::new();
        if let Some(name) = self.resolved.get() {
            let _ = resolved.set(name.clone());
        }

        Stream {
            id: self.id,
            label: self.label.clone(),
            resolved,
            stream_type: self.stream_type,
            is_input: self.is_input,
            is_mapped: self.is_mapped,
            codec: self.codec.clone(),
            options: Vec::new(),
        }
    }

    /// Drops a name resolved against another file. Literal names are kept.
    pub(crate) fn forget_resolved_name(&mut self) {
        if !matches!(self.label, StreamLabel::Named(_)) {
            self.resolved = OnceCell::new();
        }
    }

    /// Resolves the name once; later calls return the cached value even if
    /// the owning file has changed since.
    pub(crate) fn resolve_name(&self, file_name: &str, ordinal: impl FnOnce() -> usize) -> &str {
        self.resolved.get_or_init(|| match &self.label {
            StreamLabel::Named(name) => name.clone(),
            StreamLabel::Index(index) => compose_name(file_name, self.stream_type, *index),
            StreamLabel::Auto => compose_name(file_name, self.stream_type, ordinal()),
        })
    }

    fn build(&self, name: &str) -> TransformResult<Vec<String>> {
        if !self.is_input && !self.is_mapped {
            return Err(TransformError::NotMapped {
                stream: name.to_string(),
            });
        }

        let mut options = self.options.clone();
        if let (false, Codec::Default) = (self.is_input, &self.codec) {
            options.push(format!("-c:{name}"));
            options.push("copy".to_string());
        }

        Ok(options)
    }
}

fn compose_name(file_name: &str, stream_type: StreamType, index: usize) -> String {
    let index = index.to_string();
    [file_name, stream_type.specifier(), index.as_str()]
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(":")
}

/// Read-only view of a stream together with its owning file.
#[derive(Debug, Clone, Copy)]
pub struct StreamRef<'a> {
    file: &'a File,
    stream: &'a Stream,
}

impl<'a> StreamRef<'a> {
    pub(crate) fn new(file: &'a File, stream: &'a Stream) -> Self {
        Self { file, stream }
    }

    pub fn id(&self) -> StreamId {
        self.stream.id
    }

    pub fn name(&self) -> &'a str {
        self.file.resolve_name(self.stream)
    }

    pub fn stream_type(&self) -> StreamType {
        self.stream.stream_type
    }

    pub fn is_input(&self) -> bool {
        self.stream.is_input
    }

    pub fn is_mapped(&self) -> bool {
        self.stream.is_mapped
    }

    pub fn codec(&self) -> &'a Codec {
        &self.stream.codec
    }

    pub fn options(&self) -> &'a [String] {
        &self.stream.options
    }

    pub fn stream(&self) -> &'a Stream {
        self.stream
    }

    /// Option tokens of this stream. Mapped output streams without an explicit
    /// codec get a trailing `-c:<name> copy`.
    pub fn build(&self) -> TransformResult<Vec<String>> {
        self.stream.build(self.name())
    }

    /// Built tokens, each shell-quoted, joined by single spaces. For display
    /// only; pass [`StreamRef::build`] to the process instead.
    pub fn to_display_string(&self) -> TransformResult<String> {
        Ok(shell_words::join(self.build()?))
    }

    pub fn duplicate(&self) -> Stream {
        self.stream.duplicate()
    }

    pub fn end(&self) -> &'a File {
        self.file
    }
}

/// Mutable sub-builder for one stream of a file. [`StreamMut::end`] hands the
/// file back for further chaining.
#[derive(Debug)]
pub struct StreamMut<'a> {
    file: &'a mut File,
    position: usize,
}

impl<'a> StreamMut<'a> {
    pub(crate) fn new(file: &'a mut File, position: usize) -> Self {
        Self { file, position }
    }

    fn stream(&mut self) -> &mut Stream {
        &mut self.file.slots_mut()[self.position]
    }

    pub fn id(&self) -> StreamId {
        self.view().id()
    }

    pub fn name(&self) -> String {
        self.view().name().to_string()
    }

    pub fn view(&self) -> StreamRef<'_> {
        StreamRef::new(&*self.file, &self.file.slots()[self.position])
    }

    /// Appends `<flag>:<name> <value>`.
    pub fn option(mut self, flag: &str, value: impl Into<String>) -> Self {
        let token = format!("{flag}:{}", self.name());
        let value = value.into();
        let options = &mut self.stream().options;
        options.push(token);
        options.push(value);
        self
    }

    /// Appends a token verbatim.
    pub fn raw(mut self, token: impl Into<String>) -> Self {
        self.stream().options.push(token.into());
        self
    }

    pub fn codec(self, codec: impl Into<String>) -> Self {
        let codec = codec.into();
        let mut this = self.option("-c", codec.clone());
        this.stream().codec = Codec::Explicit(codec);
        this
    }

    pub fn bitrate(self, bits_per_second: u64) -> Self {
        self.option("-b", bits_per_second.to_string())
    }

    pub fn frame_rate(self, fps: f64) -> Self {
        self.option("-r", fps.to_string())
    }

    pub fn size(self, width: u32, height: u32) -> Self {
        self.option("-s", format!("{width}x{height}"))
    }

    pub fn pixel_format(self, format: impl Into<String>) -> Self {
        self.option("-pix_fmt", format)
    }

    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.option("-preset", preset)
    }

    pub fn profile(self, profile: impl Into<String>) -> Self {
        self.option("-profile", profile)
    }

    pub fn keyframe_interval(self, frames: u32) -> Self {
        self.option("-g", frames.to_string())
    }

    /// Appends `-metadata:s:<name> key=value`.
    pub fn metadata(self, key: &str, value: &str) -> Self {
        let token = format!("-metadata:s:{}", self.name());
        self.raw(token).raw(format!("{key}={value}"))
    }

    pub fn sample_rate(self, hz: u64) -> Self {
        self.option("-ar", hz.to_string())
    }

    pub fn channels(self, count: u32) -> Self {
        self.option("-ac", count.to_string())
    }

    /// Connects this stream to `source` (`-map <source>`).
    pub fn map(mut self, source: impl Into<String>) -> Self {
        let source = source.into();
        trace!(stream = ?self.id(), %source, "mapping stream");
        let stream = self.stream();
        stream.options.push("-map".to_string());
        stream.options.push(source);
        stream.is_mapped = true;
        self
    }

    pub fn set_mapped(mut self, mapped: bool) -> Self {
        self.stream().is_mapped = mapped;
        self
    }

    /// Moves this stream to `position` in the file's output order.
    pub fn move_to(mut self, position: usize) -> TransformResult<Self> {
        let id = self.id();
        self.file.move_stream_to_position(id, position)?;
        self.position = position;
        Ok(self)
    }

    pub fn end(self) -> &'a mut File {
        self.file
    }
}
