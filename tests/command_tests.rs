//! End-to-end composition through the public API.

use fftransformer::core::{CommandBuilder, MediaProfile, StreamType, TransformError};
use serde_json::json;

fn reference_profile() -> MediaProfile {
    MediaProfile::from_value(&json!({
        "name": "reference",
        "format": "mp4",
        "video": {
            "width": 1920,
            "height": 1080,
            "codec": "h264",
            "profile": "main",
            "preset": "veryfast",
            "pixel_format": "yuv420p",
            "bitrate": "6000k",
            "frame_rate": 29.97,
            "keyframe_interval": 250
        },
        "audio": {
            "codec": "aac",
            "bitrate": "128k",
            "sample_rate": "48k"
        }
    }))
    .unwrap()
}

#[test]
fn transcodes_with_reference_profile_and_keeps_subtitles() {
    let mut builder = CommandBuilder::new();
    builder.overwrite();
    let input = builder.add_input("feature.mkv");
    let source = builder.input_mut(input).unwrap();
    let video = source.add_stream(StreamType::Video).id();
    let audio = source.add_stream(StreamType::Audio).id();
    let subtitle = source.add_stream(StreamType::Subtitle).id();

    let output = builder.add_output("feature.mp4");
    builder
        .apply_profile(
            output,
            &reference_profile(),
            &[(input, video), (input, audio), (input, subtitle)],
        )
        .unwrap();

    assert_eq!(
        builder.build().unwrap(),
        vec![
            "-y",
            "-i",
            "feature.mkv",
            "-map",
            "0:v:0",
            "-c:v:0",
            "h264",
            "-profile:v:0",
            "main",
            "-preset:v:0",
            "veryfast",
            "-pix_fmt:v:0",
            "yuv420p",
            "-s:v:0",
            "1920x1080",
            "-b:v:0",
            "6000000",
            "-r:v:0",
            "29.97",
            "-g:v:0",
            "250",
            "-map",
            "0:a:0",
            "-c:a:0",
            "aac",
            "-b:a:0",
            "128000",
            "-ar:a:0",
            "48000",
            "-map",
            "0:s:0",
            "-c:s:0",
            "copy",
            "-f",
            "mp4",
            "feature.mp4",
        ]
    );
}

#[test]
fn reordered_commentary_track_comes_first() {
    let mut builder = CommandBuilder::new();
    let input = builder.add_input("film.mkv");
    let source = builder.input_mut(input).unwrap();
    let main = source.add_stream(StreamType::Audio).id();
    let commentary = source.add_stream(StreamType::Audio).id();

    let output = builder.add_output("film.m4a");
    builder.map(output, input, main).unwrap();
    let moved = builder.map(output, input, commentary).unwrap();
    builder
        .output_mut(output)
        .unwrap()
        .stream_mut(moved)
        .unwrap()
        .move_to(0)
        .unwrap()
        .metadata("title", "Director's cut")
        .option("-disposition", "default");

    let args = builder.build().unwrap();
    assert_eq!(
        &args[2..8],
        [
            "-map",
            "0:a:1",
            "-metadata:s:a:0",
            "title=Director's cut",
            "-disposition:a:0",
            "default"
        ]
    );

    let rendered = builder.to_display_string().unwrap();
    let words = shell_words::split(&rendered).unwrap();
    assert_eq!(words[0], "ffmpeg");
    assert_eq!(words[1..], args[..]);
}

#[test]
fn forgotten_mapping_is_reported_by_name() {
    let mut builder = CommandBuilder::new();
    builder.add_input("in.mp4");
    let output = builder.add_output("out.mp4");
    builder
        .output_mut(output)
        .unwrap()
        .add_stream(StreamType::Video);

    let err = builder.build().unwrap_err();
    assert_eq!(err.to_string(), "stream \"v:0\" is not connected to any output");
    assert!(matches!(err, TransformError::NotMapped { .. }));
}
