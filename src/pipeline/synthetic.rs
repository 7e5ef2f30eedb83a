use std::sync::Arc;

use crate::{
    foundation::error::{PreviewError, PreviewResult},
    pipeline::decode::{
        DecodeFault, DecodedFrame, DecodedResult, FramePipeline, OutputFormat, PipelineFactory,
    },
    pipeline::pool::FramePool,
    timeline::model::{Clip, ClipSource, Timeline},
};

const TIMECODE_CELLS: u32 = 32;

/// Knobs for the reference pipeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SyntheticOpts {
    /// Keyframe interval in frames. Seeks that land on a keyframe decode immediately.
    pub gop_frames: u32,
    /// Number of `Pending` results a non-keyframe seek produces, counting the seek itself.
    pub seek_warmup_steps: u32,
    /// Straight-alpha RGBA8 fill behind all clips.
    pub background_rgba: [u8; 4],
    /// Draw a binary frame-index strip along the top edge.
    pub burn_in_timecode: bool,
    /// Horizontal speed of the test-pattern bar, in pixels per frame.
    pub bar_speed_px: f64,
}

impl Default for SyntheticOpts {
    fn default() -> Self {
        Self {
            gop_frames: 30,
            seek_warmup_steps: 1,
            background_rgba: [18, 20, 28, 255],
            burn_in_timecode: true,
            bar_speed_px: 8.0,
        }
    }
}

/// Factory for [`SyntheticPipeline`].
#[derive(Clone, Debug, Default)]
pub struct SyntheticFactory {
    /// Options applied to every pipeline this factory creates.
    pub opts: SyntheticOpts,
}

impl SyntheticFactory {
    /// Factory with custom options.
    pub fn new(opts: SyntheticOpts) -> Self {
        Self { opts }
    }
}

impl PipelineFactory for SyntheticFactory {
    fn create(
        &self,
        timeline: Arc<Timeline>,
        format: OutputFormat,
        pool: FramePool,
    ) -> PreviewResult<Box<dyn FramePipeline>> {
        Ok(Box::new(SyntheticPipeline::new(
            timeline, format, self.opts, pool,
        )?))
    }
}

/// Reference decode + compose primitive.
///
/// Clips decode to procedural content composited with `vello_cpu`. The decoder emulates a
/// GOP-structured source: random access to a non-keyframe needs warm-up steps before content
/// appears, sequential `advance` is always immediate.
pub struct SyntheticPipeline {
    timeline: Arc<Timeline>,
    format: OutputFormat,
    opts: SyntheticOpts,
    pool: FramePool,
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    position: Option<u64>,
    warmup_remaining: u32,
    last_frame: u64,
}

impl SyntheticPipeline {
    /// Create a pipeline. Output dimensions must be non-zero and fit in `u16`.
    pub fn new(
        timeline: Arc<Timeline>,
        format: OutputFormat,
        opts: SyntheticOpts,
        pool: FramePool,
    ) -> PreviewResult<Self> {
        let width: u16 = format
            .canvas
            .width
            .try_into()
            .map_err(|_| PreviewError::validation("output width exceeds u16"))?;
        let height: u16 = format
            .canvas
            .height
            .try_into()
            .map_err(|_| PreviewError::validation("output height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(PreviewError::validation("output width/height must be > 0"));
        }
        if opts.gop_frames == 0 {
            return Err(PreviewError::validation("gop_frames must be > 0"));
        }
        format.fps.validate()?;

        let last_frame = format.fps.frame_at_ms(timeline.end_ms()).saturating_add(1);
        Ok(Self {
            timeline,
            format,
            opts,
            pool,
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
            position: None,
            warmup_remaining: 0,
            last_frame,
        })
    }

    fn compose(&mut self, frame: u64) -> DecodedResult {
        let ts = self.format.fps.frame_to_ms(frame);
        let w = f64::from(self.width);
        let h = f64::from(self.height);

        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        fill(&mut ctx, self.opts.background_rgba, 0.0, 0.0, w, h);

        for clip in self.timeline.active_clips(ts) {
            self.draw_clip(&mut ctx, clip, ts, w, h);
        }

        if self.opts.burn_in_timecode {
            let strip_h = (h / 16.0).max(1.0);
            let cell_w = w / f64::from(TIMECODE_CELLS);
            for bit in 0..TIMECODE_CELLS {
                let on = (frame >> bit) & 1 == 1;
                let rgba = if on {
                    [255, 255, 255, 255]
                } else {
                    [0, 0, 0, 255]
                };
                let x0 = cell_w * f64::from(bit);
                fill(&mut ctx, rgba, x0, 0.0, x0 + cell_w, strip_h);
            }
        }

        self.pixmap.data_as_u8_slice_mut().fill(0);
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);

        let src = self.pixmap.data_as_u8_slice();
        let mut pixels = self.pool.take(src.len());
        pixels.copy_from_slice(src);
        DecodedResult::Frame(DecodedFrame {
            width: self.format.canvas.width,
            height: self.format.canvas.height,
            pixels,
        })
    }

    fn draw_clip(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        clip: &Clip,
        ts: i64,
        w: f64,
        h: f64,
    ) {
        let r = clip.rect.unwrap_or(kurbo::Rect::new(0.0, 0.0, w, h));
        match clip.source {
            ClipSource::Solid { color } => fill(ctx, color, r.x0, r.y0, r.x1, r.y1),
            ClipSource::TestPattern { color } => {
                fill(ctx, color, r.x0, r.y0, r.x1, r.y1);

                let local_frame = self.format.fps.frame_at_ms(ts - clip.start_ms);
                let bar_w = (r.width() / 16.0).max(1.0);
                let travel = (r.width() - bar_w).max(1.0);
                let x = r.x0 + ((local_frame as f64) * self.opts.bar_speed_px) % travel;
                let inverted = [255 - color[0], 255 - color[1], 255 - color[2], 255];
                fill(ctx, inverted, x, r.y0, x + bar_w, r.y1);
            }
        }
    }
}

impl FramePipeline for SyntheticPipeline {
    fn seek(&mut self, timestamp_ms: i64) -> DecodedResult {
        if timestamp_ms < 0 {
            return DecodedResult::Error(DecodeFault::EndOfContent);
        }
        let frame = self.format.fps.frame_at_ms(timestamp_ms);
        if frame > self.last_frame {
            return DecodedResult::Error(DecodeFault::EndOfContent);
        }
        self.position = Some(frame);

        let is_keyframe = frame % u64::from(self.opts.gop_frames) == 0;
        if !is_keyframe && self.opts.seek_warmup_steps > 0 {
            self.warmup_remaining = self.opts.seek_warmup_steps - 1;
            return DecodedResult::Pending;
        }
        self.warmup_remaining = 0;
        self.compose(frame)
    }

    fn advance(&mut self) -> DecodedResult {
        let Some(pos) = self.position else {
            return DecodedResult::Error(DecodeFault::Codec(
                "advance called without a prior seek".to_string(),
            ));
        };
        let next = pos.saturating_add(1);
        if next > self.last_frame {
            return DecodedResult::Error(DecodeFault::EndOfContent);
        }
        self.position = Some(next);

        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return DecodedResult::Pending;
        }
        self.compose(next)
    }

    fn flush(&mut self) {
        self.position = None;
        self.warmup_remaining = 0;
    }
}

fn fill(ctx: &mut vello_cpu::RenderContext, rgba: [u8; 4], x0: f64, y0: f64, x1: f64, y1: f64) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        rgba[0], rgba[1], rgba[2], rgba[3],
    ));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x0, y0, x1, y1));
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/synthetic.rs"]
mod tests;
