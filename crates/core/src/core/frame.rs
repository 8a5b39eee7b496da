//! Viewport frame slot and the backend-agnostic render step.
//!
//! The stream overwrites a single slot; the animation loop draws whatever is
//! in it. GPU calls go through [`Surface`] so the state machine runs headless.

use crate::time::{Duration, Instant};

pub const FRAME_WIDTH: usize = 160;
pub const FRAME_HEIGHT: usize = 144;
/// One byte of luminance per pixel.
pub const FRAME_LEN: usize = FRAME_WIDTH * FRAME_HEIGHT;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame buffer has {actual} bytes, expected {expected}")]
    WrongSize { actual: usize, expected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RendererError {
    #[error("canvas has no WebGL2 context")]
    NoContext,
    #[error("{stage} shader failed to compile: {log}")]
    Shader { stage: &'static str, log: String },
    #[error("shader program failed to link: {0}")]
    Link(String),
    #[error("failed to create {0}")]
    Resource(&'static str),
    #[error("texture upload failed: {0}")]
    Upload(String),
}

/// A full-size luminance frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(pixels: Vec<u8>) -> Result<Self, FrameError> {
        if pixels.len() != FRAME_LEN {
            return Err(FrameError::WrongSize {
                actual: pixels.len(),
                expected: FRAME_LEN,
            });
        }
        Ok(Self { pixels })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// The drawing surface (a WebGL2 canvas in the browser).
pub trait Surface {
    /// Current drawing-buffer size in device pixels.
    fn canvas_size(&self) -> (u32, u32);
    fn set_viewport(&mut self, width: u32, height: u32);
    fn upload_luminance(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<(), RendererError>;
    /// Draw the full-canvas quad with the current texture.
    fn draw(&mut self);
}

pub struct FrameRenderer<S: Surface> {
    surface: S,
    current: Option<Frame>,
    last_size: Option<(u32, u32)>,
}

impl<S: Surface> FrameRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            current: None,
            last_size: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn has_frame(&self) -> bool {
        self.current.is_some()
    }

    /// Replace the current frame. A wrong-sized buffer leaves it untouched.
    pub fn submit(&mut self, pixels: Vec<u8>) -> Result<(), FrameError> {
        match Frame::new(pixels) {
            Ok(frame) => {
                self.current = Some(frame);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "rejected viewport frame");
                Err(e)
            }
        }
    }

    /// Draw the latest frame. Returns `Ok(false)` when there is nothing to draw.
    pub fn render(&mut self) -> Result<bool, RendererError> {
        let Some(frame) = &self.current else {
            return Ok(false);
        };
        let size = self.surface.canvas_size();
        if self.last_size != Some(size) {
            tracing::debug!(width = size.0, height = size.1, "canvas resized");
            self.surface.set_viewport(size.0, size.1);
            self.last_size = Some(size);
        }
        self.surface
            .upload_luminance(FRAME_WIDTH as u32, FRAME_HEIGHT as u32, frame.pixels())?;
        self.surface.draw();
        Ok(true)
    }
}

/// Frames per second over consecutive one-second windows.
#[derive(Debug, Clone, Default)]
pub struct FrameRateMeter {
    window_start: Option<Instant>,
    count: u32,
    fps: Option<u32>,
}

impl FrameRateMeter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame arrival. Returns the new reading when a window closes.
    pub fn record(&mut self, now: Instant) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        if now.duration_since(start) < Self::WINDOW {
            self.count += 1;
            return None;
        }
        let fps = self.count;
        self.fps = Some(fps);
        self.window_start = Some(now);
        self.count = 1;
        Some(fps)
    }

    /// Last completed window's reading.
    pub fn fps(&self) -> Option<u32> {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, PartialEq)]
    enum Call {
        Viewport(u32, u32),
        Upload(u8),
        Draw,
    }

    struct FakeSurface {
        size: (u32, u32),
        calls: Vec<Call>,
        fail_upload: bool,
    }

    impl FakeSurface {
        fn new(w: u32, h: u32) -> Self {
            Self {
                size: (w, h),
                calls: Vec::new(),
                fail_upload: false,
            }
        }
    }

    impl Surface for FakeSurface {
        fn canvas_size(&self) -> (u32, u32) {
            self.size
        }
        fn set_viewport(&mut self, width: u32, height: u32) {
            self.calls.push(Call::Viewport(width, height));
        }
        fn upload_luminance(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<(), RendererError> {
            assert_eq!((width as usize, height as usize), (FRAME_WIDTH, FRAME_HEIGHT));
            if self.fail_upload {
                return Err(RendererError::Upload("lost context".into()));
            }
            self.calls.push(Call::Upload(pixels[0]));
            Ok(())
        }
        fn draw(&mut self) {
            self.calls.push(Call::Draw);
        }
    }

    fn filled(v: u8) -> Vec<u8> {
        vec![v; FRAME_LEN]
    }

    #[test]
    fn render_without_frame_is_noop() {
        let mut r = FrameRenderer::new(FakeSurface::new(320, 288));
        assert_eq!(r.render(), Ok(false));
        assert!(r.surface().calls.is_empty());
    }

    #[test]
    fn latest_frame_wins() {
        let mut r = FrameRenderer::new(FakeSurface::new(320, 288));
        r.submit(filled(1)).unwrap();
        r.submit(filled(2)).unwrap();
        assert_eq!(r.render(), Ok(true));
        assert_eq!(
            r.surface().calls,
            vec![Call::Viewport(320, 288), Call::Upload(2), Call::Draw]
        );
    }

    #[test]
    fn wrong_size_keeps_current_frame() {
        let mut r = FrameRenderer::new(FakeSurface::new(160, 144));
        r.submit(filled(9)).unwrap();
        assert_eq!(
            r.submit(vec![0; 100]),
            Err(FrameError::WrongSize {
                actual: 100,
                expected: FRAME_LEN
            })
        );
        r.render().unwrap();
        assert!(r.surface().calls.contains(&Call::Upload(9)));
    }

    #[test]
    fn viewport_only_reset_on_resize() {
        let mut r = FrameRenderer::new(FakeSurface::new(160, 144));
        r.submit(filled(0)).unwrap();
        r.render().unwrap();
        r.render().unwrap();
        r.surface.size = (480, 432);
        r.render().unwrap();

        let viewports: Vec<_> = r
            .surface()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Viewport(..)))
            .collect();
        assert_eq!(viewports, vec![&Call::Viewport(160, 144), &Call::Viewport(480, 432)]);
    }

    #[test]
    fn upload_failure_skips_draw() {
        let mut surface = FakeSurface::new(160, 144);
        surface.fail_upload = true;
        let mut r = FrameRenderer::new(surface);
        r.submit(filled(0)).unwrap();
        assert!(matches!(r.render(), Err(RendererError::Upload(_))));
        assert!(!r.surface().calls.contains(&Call::Draw));
    }

    #[test]
    fn frame_rate_counts_per_window() {
        let mut m = FrameRateMeter::new();
        let t0 = Instant::now();
        for i in 0..60u64 {
            assert_eq!(m.record(t0 + Duration::from_millis(i * 16)), None);
        }
        assert_eq!(m.fps(), None);
        assert_eq!(m.record(t0 + Duration::from_millis(1000)), Some(60));
        assert_eq!(m.fps(), Some(60));
        assert_eq!(m.record(t0 + Duration::from_millis(2500)), Some(1));
    }
}
