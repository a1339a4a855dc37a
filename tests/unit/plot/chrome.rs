use super::*;

fn layout() -> AxesLayout {
    AxesLayout::new(
        Canvas {
            width: 320,
            height: 180,
        },
        (-1.0, 1.0),
        (-30.0, 80.0),
    )
    .unwrap()
}

fn small_style() -> PlotStyle {
    PlotStyle {
        dpi: 50.0,
        ..PlotStyle::default()
    }
}

#[test]
fn svg_contains_escaped_text_and_legend() {
    let text = ChromeText {
        title: "Pressures <A&B>".to_string(),
        xlabel: "Time (seconds)".to_string(),
        ylabel: "Pressure (bar)".to_string(),
    };
    let legend = vec![
        LegendEntry {
            label: "PTX101".to_string(),
            color: Rgba8::rgb(0x1f, 0x77, 0xb4),
        },
        LegendEntry {
            label: "PTX102".to_string(),
            color: Rgba8::rgb(0xff, 0x7f, 0x0e),
        },
    ];
    let svg = build_chrome_svg(&layout(), &small_style(), &text, &legend);
    assert!(svg.contains("Pressures &lt;A&amp;B&gt;"));
    assert!(svg.contains("Time (seconds)"));
    assert!(svg.contains("PTX101"));
    assert!(svg.contains("#ff7f0e"));
    assert!(svg.contains("stroke-dasharray"));
    assert!(svg.ends_with("</svg>"));
}

#[test]
fn chrome_has_transparent_background_and_opaque_spines() {
    let svg = build_chrome_svg(&layout(), &small_style(), &ChromeText::default(), &[]);
    let canvas = layout().canvas;
    let rgba = rasterize_svg(&svg, canvas, build_fontdb(&[] as &[&str])).unwrap();
    assert_eq!(rgba.len(), canvas.rgba_len());

    // Top-left corner of the figure lies outside the axes: untouched.
    assert_eq!(&rgba[0..4], &[0, 0, 0, 0]);

    // Somewhere along the left spine something was painted.
    let p = layout().plot;
    let x = p.x0.round() as usize;
    let painted = (p.y0 as usize + 2..p.y1 as usize - 2)
        .any(|y| rgba[(y * canvas.width as usize + x) * 4 + 3] > 0);
    assert!(painted);
}

#[test]
fn malformed_svg_is_render_error() {
    let canvas = Canvas {
        width: 4,
        height: 4,
    };
    let err = rasterize_svg("<svg", canvas, build_fontdb(&[] as &[&str])).unwrap_err();
    assert!(matches!(err, OverplotError::Render(_)));
}
