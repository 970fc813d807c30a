use tracing::debug;

use crate::core::error::{TransformError, TransformResult};
use crate::core::stream::{Stream, StreamId, StreamLabel, StreamMut, StreamRef, StreamType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Input,
    Output,
}

/// One input or output media path and the streams declared on it.
///
/// Stream order is insertion order until [`File::move_stream_to_position`]
/// changes it; for outputs that order is the order of the emitted arguments.
#[derive(Debug)]
pub struct File {
    kind: FileKind,
    name: String,
    path: String,
    options: Vec<String>,
    streams: Vec<Stream>,
    next_id: u32,
}

impl File {
    pub fn new(kind: FileKind, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            path: path.into(),
            options: Vec::new(),
            streams: Vec::new(),
            next_id: 0,
        }
    }

    /// Input file addressed by its position among inputs (`0`, `1`, ...).
    pub fn input(index: usize, path: impl Into<String>) -> Self {
        Self::new(FileKind::Input, index.to_string(), path)
    }

    /// Output file. Its name is empty: ffmpeg resolves output stream
    /// specifiers relative to the output file they precede.
    pub fn output(path: impl Into<String>) -> Self {
        Self::new(FileKind::Output, "", path)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn is_input(&self) -> bool {
        self.kind == FileKind::Input
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub(crate) fn slots(&self) -> &[Stream] {
        &self.streams
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Stream] {
        &mut self.streams
    }

    pub fn streams(&self) -> impl Iterator<Item = StreamRef<'_>> {
        self.streams.iter().map(move |stream| StreamRef::new(self, stream))
    }

    pub fn stream_ids(&self) -> Vec<StreamId> {
        self.streams.iter().map(Stream::id).collect()
    }

    pub fn position_of(&self, id: StreamId) -> Option<usize> {
        self.streams.iter().position(|stream| stream.id == id)
    }

    pub fn stream(&self, id: StreamId) -> Option<StreamRef<'_>> {
        let position = self.position_of(id)?;
        Some(StreamRef::new(self, &self.streams[position]))
    }

    pub fn stream_mut(&mut self, id: StreamId) -> Option<StreamMut<'_>> {
        let position = self.position_of(id)?;
        Some(StreamMut::new(self, position))
    }

    /// Declares a stream numbered automatically within its type.
    pub fn add_stream(&mut self, stream_type: StreamType) -> StreamMut<'_> {
        self.attach(StreamLabel::Auto, stream_type)
    }

    /// Declares a stream with an explicit ordinal within its type.
    pub fn add_indexed_stream(&mut self, index: usize, stream_type: StreamType) -> StreamMut<'_> {
        self.attach(StreamLabel::Index(index), stream_type)
    }

    /// Declares a stream with a literal specifier such as `0:1` or `[vout]`.
    pub fn add_named_stream(&mut self, name: impl Into<String>, stream_type: StreamType) -> StreamMut<'_> {
        self.attach(StreamLabel::Named(name.into()), stream_type)
    }

    /// Appends a detached stream, typically one produced by
    /// [`Stream::duplicate`]. It receives a new id in this file, and unless it
    /// carries a literal name, is renamed by its position here.
    pub fn push_stream(&mut self, mut stream: Stream) -> StreamMut<'_> {
        stream.id = self.allocate_id();
        stream.forget_resolved_name();
        debug!(file = %self.path, stream = ?stream.id, "attached stream");
        self.streams.push(stream);
        let position = self.streams.len() - 1;
        StreamMut::new(self, position)
    }

    fn attach(&mut self, label: StreamLabel, stream_type: StreamType) -> StreamMut<'_> {
        let id = self.allocate_id();
        let is_input = self.is_input();
        debug!(file = %self.path, stream = ?id, ?stream_type, "added stream");
        self.streams.push(Stream::new(id, label, stream_type, is_input));
        let position = self.streams.len() - 1;
        StreamMut::new(self, position)
    }

    fn allocate_id(&mut self) -> StreamId {
        let id = StreamId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Zero-based rank of the stream among this file's streams of the same
    /// type, in current order.
    pub fn stream_number(&self, id: StreamId) -> TransformResult<usize> {
        let position = self.position_of(id).ok_or_else(|| self.unknown(id))?;
        Ok(self.rank_at(position))
    }

    /// Types sharing a specifier (`Any` and `Unknown`) are ranked together.
    fn rank_at(&self, position: usize) -> usize {
        let specifier = self.streams[position].stream_type().specifier();
        self.streams[..position]
            .iter()
            .filter(|stream| stream.stream_type().specifier() == specifier)
            .count()
    }

    pub(crate) fn resolve_name<'s>(&'s self, stream: &'s Stream) -> &'s str {
        stream.resolve_name(&self.name, || {
            self.position_of(stream.id)
                .map(|position| self.rank_at(position))
                .unwrap_or(0)
        })
    }

    /// Moves a stream so that it ends up at `position`, shifting the others.
    /// Out-of-range positions fail without touching the order.
    pub fn move_stream_to_position(&mut self, id: StreamId, position: usize) -> TransformResult<()> {
        let len = self.streams.len();
        if position >= len {
            return Err(TransformError::InvalidPosition { position, len });
        }
        let current = self.position_of(id).ok_or_else(|| self.unknown(id))?;

        let stream = self.streams.remove(current);
        self.streams.insert(position, stream);
        debug!(file = %self.path, stream = ?id, from = current, to = position, "moved stream");
        Ok(())
    }

    fn unknown(&self, id: StreamId) -> TransformError {
        TransformError::UnknownStream {
            file: self.path.clone(),
            id,
        }
    }

    /// Appends a file-level option pair.
    pub fn option(&mut self, flag: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.options.push(flag.into());
        self.options.push(value.into());
        self
    }

    pub fn format(&mut self, format: impl Into<String>) -> &mut Self {
        self.option("-f", format)
    }

    pub fn seek(&mut self, seconds: f64) -> &mut Self {
        self.option("-ss", seconds.to_string())
    }

    pub fn duration(&mut self, seconds: f64) -> &mut Self {
        self.option("-t", seconds.to_string())
    }

    /// Arguments for this file in the position ffmpeg expects them:
    /// input options and streams precede `-i <path>`, output streams and
    /// options precede the output path.
    pub fn build(&self) -> TransformResult<Vec<String>> {
        let mut args = Vec::new();

        match self.kind {
            FileKind::Input => {
                args.extend(self.options.iter().cloned());
                for stream in self.streams() {
                    args.extend(stream.build()?);
                }
                args.push("-i".to_string());
                args.push(self.path.clone());
            }
            FileKind::Output => {
                for stream in self.streams() {
                    args.extend(stream.build()?);
                }
                args.extend(self.options.iter().cloned());
                args.push(self.path.clone());
            }
        }

        Ok(args)
    }

    pub fn to_display_string(&self) -> TransformResult<String> {
        Ok(shell_words::join(self.build()?))
    }
}
