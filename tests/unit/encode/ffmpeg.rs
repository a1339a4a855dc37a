use super::*;

fn args_as_strings(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn canvas() -> Canvas {
    Canvas {
        width: 1920,
        height: 1080,
    }
}

#[test]
fn default_args_overlay_raw_stream_and_copy_audio() {
    let args = compositor_args(
        Path::new("in.mp4"),
        Path::new("out.mp4"),
        canvas(),
        &CompositorOpts::default(),
    );
    let expected = [
        "-y",
        "-loglevel",
        "error",
        "-i",
        "in.mp4",
        "-f",
        "rawvideo",
        "-vcodec",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        "1920x1080",
        "-r",
        "60",
        "-i",
        "pipe:0",
        "-filter_complex",
        "[0:v:0][1:v:0]overlay[out]",
        "-shortest",
        "-map",
        "[out]",
        "-map",
        "0:a?",
        "-c:a",
        "copy",
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "out.mp4",
    ];
    assert_eq!(args_as_strings(&args), expected);
}

#[test]
fn hwaccel_codec_and_no_overwrite_are_honoured() {
    let opts = CompositorOpts {
        hwaccel: Some("d3d11va".to_string()),
        video_codec: "h264_amf".to_string(),
        input_rate: 30,
        overwrite: false,
        ..CompositorOpts::default()
    };
    let args = args_as_strings(&compositor_args(
        Path::new("a.mkv"),
        Path::new("b.mp4"),
        canvas(),
        &opts,
    ));
    assert_eq!(&args[..7], ["-n", "-loglevel", "error", "-hwaccel", "d3d11va", "-i", "a.mkv"]);
    let r = args.iter().position(|a| a == "-r").unwrap();
    assert_eq!(args[r + 1], "30");
    let cv = args.iter().position(|a| a == "-c:v").unwrap();
    assert_eq!(args[cv + 1], "h264_amf");
    assert_eq!(args.last().unwrap(), "b.mp4");
}

#[test]
fn opts_deserialize_with_defaults() {
    let opts: CompositorOpts = serde_json::from_str(r#"{ "hwaccel": "vaapi" }"#).unwrap();
    assert_eq!(opts.input_rate, 60);
    assert_eq!(opts.video_codec, "libx264");
    assert_eq!(opts.hwaccel.as_deref(), Some("vaapi"));
    assert!(opts.overwrite);
    assert!(serde_json::from_str::<CompositorOpts>(r#"{ "fps": 60 }"#).is_err());
}

#[test]
fn validate_rejects_zero_rate_and_empty_codec() {
    let mut opts = CompositorOpts {
        input_rate: 0,
        ..CompositorOpts::default()
    };
    assert!(opts.validate().is_err());
    opts.input_rate = 60;
    opts.video_codec = " ".to_string();
    assert!(opts.validate().is_err());
}

#[test]
fn begin_rejects_missing_video() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = CompositorSink::new(
        dir.path().join("missing.mp4"),
        dir.path().join("out.mp4"),
        CompositorOpts::default(),
    );
    let err = sink
        .begin(SinkConfig {
            canvas: canvas(),
            frame_count: 1,
        })
        .unwrap_err();
    assert!(matches!(err, OverplotError::Validation(_)));
}

#[test]
fn begin_rejects_odd_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("in.mp4");
    std::fs::write(&video, b"x").unwrap();
    let mut sink = CompositorSink::new(
        &video,
        dir.path().join("out.mp4"),
        CompositorOpts {
            ffmpeg: dir.path().join("no-such-ffmpeg"),
            ..CompositorOpts::default()
        },
    );
    for (width, height) in [(1919, 1080), (1920, 1079)] {
        let err = sink
            .begin(SinkConfig {
                canvas: Canvas { width, height },
                frame_count: 1,
            })
            .unwrap_err();
        assert!(matches!(err, OverplotError::Validation(_)));
    }
    assert!(!dir.path().join("out.mp4").exists());
}

#[test]
fn begin_reports_unspawnable_compositor() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("in.mp4");
    std::fs::write(&video, b"not really a video").unwrap();
    let mut sink = CompositorSink::new(
        &video,
        dir.path().join("nested/out.mp4"),
        CompositorOpts {
            ffmpeg: dir.path().join("no-such-ffmpeg"),
            ..CompositorOpts::default()
        },
    );
    let err = sink
        .begin(SinkConfig {
            canvas: canvas(),
            frame_count: 1,
        })
        .unwrap_err();
    assert!(matches!(err, OverplotError::Composition(_)));
    assert!(dir.path().join("nested").is_dir());
}

#[cfg(unix)]
#[test]
fn early_exit_surfaces_as_composition_error() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("in.mp4");
    std::fs::write(&video, b"x").unwrap();
    let canvas = Canvas {
        width: 512,
        height: 512,
    };
    // `true` ignores its arguments and exits without reading stdin.
    let mut sink = CompositorSink::new(
        &video,
        dir.path().join("out.mp4"),
        CompositorOpts {
            ffmpeg: PathBuf::from("true"),
            ..CompositorOpts::default()
        },
    );
    sink.begin(SinkConfig {
        canvas,
        frame_count: 2,
    })
    .unwrap();
    let frame = FrameRGBA {
        width: 512,
        height: 512,
        data: vec![0u8; canvas.rgba_len()],
        premultiplied: true,
    };
    let err = sink.push_frame(FrameIndex(0), &frame).unwrap_err();
    assert!(matches!(err, OverplotError::Composition(_)));
}

#[cfg(unix)]
#[test]
fn non_zero_exit_fails_on_end() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("in.mp4");
    std::fs::write(&video, b"x").unwrap();
    let mut sink = CompositorSink::new(
        &video,
        dir.path().join("out.mp4"),
        CompositorOpts {
            ffmpeg: PathBuf::from("false"),
            ..CompositorOpts::default()
        },
    );
    sink.begin(SinkConfig {
        canvas: canvas(),
        frame_count: 0,
    })
    .unwrap();
    let err = sink.end().unwrap_err();
    assert!(matches!(err, OverplotError::Composition(_)));
}
