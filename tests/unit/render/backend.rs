use super::*;

#[test]
fn straight_alpha_conversion() {
    let f = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![128, 0, 0, 128, 0, 0, 0, 0],
        premultiplied: true,
    };
    assert_eq!(f.to_straight_alpha(), vec![255, 0, 0, 128, 0, 0, 0, 0]);

    let straight = FrameRGBA {
        premultiplied: false,
        ..f.clone()
    };
    assert_eq!(straight.to_straight_alpha(), f.data);
}

#[test]
fn line_update_needs_two_adjacent_points() {
    let mut line = LineUpdate {
        channel: ChannelId(0),
        color: Rgba8::WHITE,
        points: vec![Some(Point::new(0.0, 0.0)), None, Some(Point::new(1.0, 1.0))],
    };
    assert!(!line.has_segment());
    line.points.push(Some(Point::new(2.0, 2.0)));
    assert!(line.has_segment());
}

#[test]
fn create_renderer_builds_line_graph() {
    let meta = VideoMetadata::new(1.0, 10, 64, 48).unwrap();
    let mut r = create_renderer(
        RenderStrategy::LineGraph,
        &meta,
        RendererOpts {
            data_time_at_video_start: 0.0,
            text: ChromeText::default(),
            scale: AxisScale::Explicit { min: 0.0, max: 1.0 },
            style: PlotStyle {
                dpi: 20.0,
                ..PlotStyle::default()
            },
        },
    )
    .unwrap();
    r.add_channel("a", vec![0.0, 0.5, 1.0], vec![0.0, 0.5, 1.0])
        .unwrap();
    assert_eq!(r.channel_count(), 1);
    assert_eq!(
        r.canvas(),
        Canvas {
            width: 64,
            height: 48
        }
    );
    let f = r.render(FrameIndex(3)).unwrap();
    assert_eq!(f.data.len(), 64 * 48 * 4);
}

#[test]
fn strategy_serializes_snake_case() {
    assert_eq!(
        serde_json::to_string(&RenderStrategy::LineGraph).unwrap(),
        "\"line_graph\""
    );
}
