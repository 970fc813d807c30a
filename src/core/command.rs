use tracing::debug;

use crate::core::error::{TransformError, TransformResult};
use crate::core::file::File;
use crate::core::profile::MediaProfile;
use crate::core::stream::{StreamId, StreamType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId(usize);

/// Top-level composition of an ffmpeg invocation: global options, input files
/// and output files, serialized in that order.
#[derive(Debug)]
pub struct CommandBuilder {
    program: String,
    global_options: Vec<String>,
    inputs: Vec<File>,
    outputs: Vec<File>,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            global_options: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn program(&mut self, program: impl Into<String>) -> &mut Self {
        self.program = program.into();
        self
    }

    pub fn program_name(&self) -> &str {
        &self.program
    }

    pub fn global_option(&mut self, token: impl Into<String>) -> &mut Self {
        self.global_options.push(token.into());
        self
    }

    pub fn overwrite(&mut self) -> &mut Self {
        self.global_option("-y")
    }

    pub fn hide_banner(&mut self) -> &mut Self {
        self.global_option("-hide_banner")
    }

    pub fn log_level(&mut self, level: impl Into<String>) -> &mut Self {
        self.global_option("-loglevel").global_option(level)
    }

    pub fn add_input(&mut self, path: impl Into<String>) -> InputId {
        let index = self.inputs.len();
        self.inputs.push(File::input(index, path));
        InputId(index)
    }

    pub fn add_output(&mut self, path: impl Into<String>) -> OutputId {
        let index = self.outputs.len();
        self.outputs.push(File::output(path));
        OutputId(index)
    }

    pub fn input(&self, id: InputId) -> TransformResult<&File> {
        self.inputs
            .get(id.0)
            .ok_or(TransformError::UnknownFile { index: id.0 })
    }

    pub fn input_mut(&mut self, id: InputId) -> TransformResult<&mut File> {
        self.inputs
            .get_mut(id.0)
            .ok_or(TransformError::UnknownFile { index: id.0 })
    }

    pub fn output(&self, id: OutputId) -> TransformResult<&File> {
        self.outputs
            .get(id.0)
            .ok_or(TransformError::UnknownFile { index: id.0 })
    }

    pub fn output_mut(&mut self, id: OutputId) -> TransformResult<&mut File> {
        self.outputs
            .get_mut(id.0)
            .ok_or(TransformError::UnknownFile { index: id.0 })
    }

    fn source(&self, input: InputId, stream: StreamId) -> TransformResult<(String, StreamType)> {
        let file = self.input(input)?;
        let source = file.stream(stream).ok_or_else(|| TransformError::UnknownStream {
            file: file.path().to_string(),
            id: stream,
        })?;
        Ok((source.name().to_string(), source.stream_type()))
    }

    /// Creates a mapped output stream fed by `stream` of `input`. The new
    /// stream has the source's type and starts without a codec (stream copy).
    pub fn map(&mut self, output: OutputId, input: InputId, stream: StreamId) -> TransformResult<StreamId> {
        let (source, stream_type) = self.source(input, stream)?;
        let created = self.output_mut(output)?.add_stream(stream_type).map(source.as_str()).id();
        debug!(output = output.0, %source, "mapped stream");
        Ok(created)
    }

    /// Maps every stream of `input` into `output`, in the input's order.
    pub fn map_all(&mut self, output: OutputId, input: InputId) -> TransformResult<Vec<StreamId>> {
        let ids = self.input(input)?.stream_ids();
        ids.into_iter()
            .map(|stream| self.map(output, input, stream))
            .collect()
    }

    /// Maps `sources` into `output` and encodes them per `profile`.
    ///
    /// Video sources take the profile's video tracks in order, audio sources
    /// its audio tracks. Sources left without a track, and other stream types,
    /// are copied. The profile's format becomes the output's `-f`.
    pub fn apply_profile(
        &mut self,
        output: OutputId,
        profile: &MediaProfile,
        sources: &[(InputId, StreamId)],
    ) -> TransformResult<Vec<StreamId>> {
        let mut video = profile.video.iter();
        let mut audio = profile.audio.iter();
        let mut created = Vec::with_capacity(sources.len());

        for &(input, stream) in sources {
            let (source, stream_type) = self.source(input, stream)?;
            let file = self.output_mut(output)?;
            let mapped = file.add_stream(stream_type).map(source.as_str());

            let mapped = match stream_type {
                StreamType::Video => match video.next() {
                    Some(track) => track.apply(mapped),
                    None => mapped,
                },
                StreamType::Audio => match audio.next() {
                    Some(track) => track.apply(mapped),
                    None => mapped,
                },
                _ => mapped,
            };
            created.push(mapped.id());
        }

        if let Some(format) = &profile.format {
            self.output_mut(output)?.format(format.as_str());
        }
        debug!(output = output.0, profile = %profile.name, streams = created.len(), "applied profile");
        Ok(created)
    }

    /// Flat argument vector, without the program name.
    pub fn build(&self) -> TransformResult<Vec<String>> {
        let mut args = self.global_options.clone();

        for input in &self.inputs {
            args.extend(input.build()?);
        }

        for output in &self.outputs {
            args.extend(output.build()?);
        }

        debug!(count = args.len(), "built command");
        Ok(args)
    }

    /// Program name and arguments, shell-quoted, for logs and dry runs.
    pub fn to_display_string(&self) -> TransformResult<String> {
        let mut words = vec![self.program.clone()];
        words.extend(self.build()?);
        Ok(shell_words::join(words))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn builder_with_source() -> (CommandBuilder, InputId, StreamId, StreamId, OutputId) {
        let mut builder = CommandBuilder::new();
        let input = builder.add_input("in.mkv");
        let file = builder.input_mut(input).unwrap();
        let video = file.add_stream(StreamType::Video).id();
        let audio = file.add_stream(StreamType::Audio).id();
        let output = builder.add_output("out.mp4");
        (builder, input, video, audio, output)
    }

    #[test]
    fn maps_input_streams_with_copy_default() {
        let (mut builder, input, _, _, output) = builder_with_source();
        builder.overwrite().hide_banner();
        builder.map_all(output, input).unwrap();

        assert_eq!(
            builder.build().unwrap(),
            vec![
                "-y", "-hide_banner", "-i", "in.mkv", "-map", "0:v:0", "-c:v:0", "copy", "-map",
                "0:a:0", "-c:a:0", "copy", "out.mp4"
            ]
        );
    }

    #[test]
    fn unmapped_output_stream_fails_the_whole_command() {
        let (mut builder, _, _, _, output) = builder_with_source();
        builder.output_mut(output).unwrap().add_stream(StreamType::Audio);

        assert!(matches!(
            builder.build(),
            Err(TransformError::NotMapped { .. })
        ));
    }

    #[test]
    fn applies_profile_tracks_by_type() {
        let (mut builder, input, video, audio, output) = builder_with_source();
        let profile = MediaProfile::from_value(&json!({
            "name": "web",
            "format": "mp4",
            "video": {"codec": "libx264", "bitrate": "2500k"},
            "audio": {"codec": "aac", "bitrate": "128k", "sample_rate": "48k"}
        }))
        .unwrap();

        let created = builder
            .apply_profile(output, &profile, &[(input, audio), (input, video)])
            .unwrap();
        assert_eq!(created.len(), 2);

        assert_eq!(
            builder.build().unwrap(),
            vec![
                "-i", "in.mkv", "-map", "0:a:0", "-c:a:0", "aac", "-b:a:0", "128000", "-ar:a:0",
                "48000", "-map", "0:v:0", "-c:v:0", "libx264", "-b:v:0", "2500000", "-f", "mp4",
                "out.mp4"
            ]
        );
    }

    #[test]
    fn sources_beyond_profile_tracks_are_copied() {
        let (mut builder, input, video, _, output) = builder_with_source();
        let second = builder
            .input_mut(input)
            .unwrap()
            .add_stream(StreamType::Video)
            .id();
        let profile = MediaProfile::from_value(&json!({
            "name": "one",
            "video": {"codec": "libx265"}
        }))
        .unwrap();

        builder
            .apply_profile(output, &profile, &[(input, video), (input, second)])
            .unwrap();

        let args = builder.build().unwrap();
        assert!(args.ends_with(&[
            "-map".to_string(),
            "0:v:1".to_string(),
            "-c:v:1".to_string(),
            "copy".to_string(),
            "out.mp4".to_string()
        ]));
    }

    #[test]
    fn repositioned_output_stream_changes_order() {
        let (mut builder, input, video, audio, output) = builder_with_source();
        builder.map(output, input, video).unwrap();
        let moved = builder.map(output, input, audio).unwrap();
        builder
            .output_mut(output)
            .unwrap()
            .move_stream_to_position(moved, 0)
            .unwrap();

        let args = builder.build().unwrap();
        let maps: Vec<&str> = args
            .windows(2)
            .filter(|pair| pair[0] == "-map")
            .map(|pair| pair[1].as_str())
            .collect();
        assert_eq!(maps, vec!["0:a:0", "0:v:0"]);
    }

    #[test]
    fn unknown_handles_are_errors() {
        let (mut builder, input, _, _, output) = builder_with_source();
        let mut other = CommandBuilder::new();
        other.add_output("a.mp4");
        let foreign = other.add_output("b.mp4");

        assert!(matches!(
            builder.map(foreign, input, StreamId(7)),
            Err(TransformError::UnknownStream { .. })
        ));
        let stream = builder.input(input).unwrap().stream_ids()[0];
        assert!(matches!(
            builder.map(foreign, input, stream),
            Err(TransformError::UnknownFile { index: 1 })
        ));
        assert!(builder.output(output).is_ok());
    }

    #[test]
    fn display_string_starts_with_program_and_quotes() {
        let mut builder = CommandBuilder::new();
        builder.program("/opt/ffmpeg/bin/ffmpeg").log_level("error");
        let input = builder.add_input("holiday clip.mov");
        builder
            .input_mut(input)
            .unwrap()
            .add_stream(StreamType::Video);
        let output = builder.add_output("out.mp4");
        builder.map_all(output, input).unwrap();

        let rendered = builder.to_display_string().unwrap();
        let words = shell_words::split(&rendered).unwrap();
        assert_eq!(words[0], "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(words[1..], builder.build().unwrap()[..]);
        assert!(words.contains(&"holiday clip.mov".to_string()));
    }
}
