use crate::SvgRenderOptions;
use crate::svg::render_frame_svg;
use algviz_core::RenderOutcome;

/// Presents render outcomes as SVG, re-emitting the previous document for unchanged renders.
#[derive(Debug, Clone, Default)]
pub struct SvgSink {
    options: SvgRenderOptions,
    last: String,
    frames: u64,
}

impl SvgSink {
    pub fn new(options: SvgRenderOptions) -> Self {
        Self {
            options,
            last: String::new(),
            frames: 0,
        }
    }

    pub fn options(&self) -> &SvgRenderOptions {
        &self.options
    }

    /// Last document; empty until the first changed frame.
    pub fn last(&self) -> &str {
        &self.last
    }

    /// Number of changed frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn present(&mut self, outcome: &RenderOutcome) -> &str {
        match outcome {
            RenderOutcome::Changed(frame) => {
                self.last = render_frame_svg(frame, &self.options);
                self.frames += 1;
            }
            RenderOutcome::Unchanged => {
                tracing::trace!(frames = self.frames, "unchanged frame, reusing last document");
            }
        }
        &self.last
    }
}
