use super::*;

#[test]
fn frame_zero_trails_the_video_start() {
    let w = window(FrameIndex(0), 2.5, 0.5);
    assert_eq!(w, RenderWindow { start: 2.0, end: 2.5 });
}

#[test]
fn consecutive_windows_are_contiguous_and_one_interval_wide() {
    let offset = -3.4992;
    let interval = 10.0 / 597.0;
    for i in 1..597u64 {
        let a = window(FrameIndex(i), offset, interval);
        let b = window(FrameIndex(i + 1), offset, interval);
        assert!((a.span() - interval).abs() < 1e-9);
        assert_eq!(a.end, b.start);
    }
}

#[test]
fn sixtieth_frame_of_two_second_video_ends_at_data_zero() {
    // 2 s video, 120 frames, data starts 1 s before the video.
    let interval = 2.0 / 120.0;
    let w = window(FrameIndex(60), -1.0, interval);
    assert!((w.end - 0.0).abs() < 1e-12);
    assert!((w.start + interval).abs() < 1e-12);
}
