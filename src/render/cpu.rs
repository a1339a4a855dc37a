use crate::foundation::core::Canvas;
use crate::foundation::error::{OverplotError, OverplotResult};
use crate::foundation::math::premul_over_px;
use crate::render::backend::LineUpdate;

/// Pixel-space clip rectangle `(x0, y0, x1, y1)`, end exclusive.
pub(crate) type ClipBox = (u32, u32, u32, u32);

/// Strokes line artists with `vello_cpu` and blits them onto a persistent canvas.
pub(crate) struct LineRasterizer {
    width: u16,
    height: u16,
    ctx: Option<vello_cpu::RenderContext>,
    scratch: vello_cpu::Pixmap,
}

impl LineRasterizer {
    pub(crate) fn new(canvas: Canvas) -> OverplotResult<Self> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| OverplotError::render("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| OverplotError::render("surface height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            ctx: None,
            scratch: vello_cpu::Pixmap::new(width, height),
        })
    }

    /// Stroke every line with at least one segment and composite the result over `dst`
    /// inside `clip` only.
    ///
    /// `vello_cpu` renders into a fresh buffer, so lines go to a scratch surface first and are
    /// then premul-over'd onto `dst`, which keeps whatever earlier frames painted there.
    pub(crate) fn paint_lines(
        &mut self,
        lines: &[LineUpdate],
        line_width_px: f64,
        clip: ClipBox,
        dst: &mut [u8],
    ) -> OverplotResult<()> {
        let expected = usize::from(self.width) * usize::from(self.height) * 4;
        if dst.len() != expected {
            return Err(OverplotError::render(format!(
                "canvas buffer has {} bytes, expected {expected}",
                dst.len()
            )));
        }
        if !lines.iter().any(LineUpdate::has_segment) {
            return Ok(());
        }

        let mut ctx = match self.ctx.take() {
            Some(ctx) => ctx,
            None => vello_cpu::RenderContext::new(self.width, self.height),
        };
        ctx.reset();
        ctx.set_stroke(
            vello_cpu::kurbo::Stroke::new(line_width_px)
                .with_join(vello_cpu::kurbo::Join::Round)
                .with_caps(vello_cpu::kurbo::Cap::Round),
        );
        for line in lines.iter().filter(|l| l.has_segment()) {
            let c = line.color;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            ctx.stroke_path(&polyline_to_cpu(&line.points));
        }

        self.scratch.data_as_u8_slice_mut().fill(0);
        ctx.flush();
        ctx.render_to_pixmap(&mut self.scratch);
        self.ctx = Some(ctx);

        blit_over(dst, self.scratch.data_as_u8_slice(), u32::from(self.width), clip);
        Ok(())
    }
}

/// Build a path from polyline vertices; `None` breaks the line.
fn polyline_to_cpu(points: &[Option<crate::foundation::core::Point>]) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    let mut pen_down = false;
    for p in points {
        match p {
            Some(p) => {
                let pt = vello_cpu::kurbo::Point::new(p.x, p.y);
                if pen_down {
                    out.line_to(pt);
                } else {
                    out.move_to(pt);
                    pen_down = true;
                }
            }
            None => pen_down = false,
        }
    }
    out
}

/// Premul-over `src` onto `dst` for the pixels inside `clip`.
pub(crate) fn blit_over(dst: &mut [u8], src: &[u8], width: u32, clip: ClipBox) {
    let (x0, y0, x1, y1) = clip;
    let stride = width as usize * 4;
    for y in y0 as usize..y1 as usize {
        let row = y * stride;
        let a = row + x0 as usize * 4;
        let b = row + x1 as usize * 4;
        for (d, s) in dst[a..b]
            .chunks_exact_mut(4)
            .zip(src[a..b].chunks_exact(4))
        {
            premul_over_px(d, s);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
