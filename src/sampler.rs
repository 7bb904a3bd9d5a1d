//! Frame index selection and the per-index conversion driver.

use crate::error::SampleError;
use crate::pipeline::FrameConverter;
use crate::render::AsciiFrame;
use crate::source::FrameSource;
use crate::transform::IntensityTransform;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// How the upper end of the sampling window is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastFrame {
    /// Stop strictly before `min(N - 1, offset + length)`. The final frame of
    /// the video is never emitted. This is the historical behaviour.
    #[default]
    Exclude,
    /// Sample the half-open window `[offset, offset + length)` clipped to the
    /// video, or every frame from `offset` to the end when `length` is 0.
    Include,
}

/// Which frames to convert: `offset`, `offset + step`, ... up to the window end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow {
    offset: usize,
    step: usize,
    length: usize,
    last_frame: LastFrame,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self {
            offset: 0,
            step: 1,
            length: 0,
            last_frame: LastFrame::Exclude,
        }
    }
}

impl SampleWindow {
    /// `length` 0 means "until the end of the video".
    pub fn new(offset: usize, step: usize, length: usize) -> Result<Self, SampleError> {
        if step == 0 {
            return Err(SampleError::ZeroStep);
        }
        Ok(Self {
            offset,
            step,
            length,
            last_frame: LastFrame::Exclude,
        })
    }

    pub fn with_last_frame(mut self, last_frame: LastFrame) -> Self {
        self.last_frame = last_frame;
        self
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn last_frame(&self) -> LastFrame {
        self.last_frame
    }

    /// Exclusive end of the index range for a video of `frame_count` frames.
    pub fn end(&self, frame_count: usize) -> usize {
        match self.last_frame {
            LastFrame::Exclude => {
                let last = frame_count.saturating_sub(1);
                if self.length == 0 {
                    last
                } else {
                    last.min(self.offset.saturating_add(self.length))
                }
            }
            LastFrame::Include => {
                if self.length == 0 {
                    frame_count
                } else {
                    frame_count.min(self.offset.saturating_add(self.length))
                }
            }
        }
    }

    /// Ordered frame indices for a video of `frame_count` frames.
    pub fn indices(&self, frame_count: usize) -> Vec<usize> {
        (self.offset..self.end(frame_count)).step_by(self.step).collect()
    }
}

/// A converted frame tagged with the source index it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledFrame {
    pub index: usize,
    pub frame: AsciiFrame,
}

/// Drives conversion of a list of frame indices against one source.
pub struct FrameSampler<'a, S: ?Sized, T> {
    source: &'a S,
    converter: &'a FrameConverter<T>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a, S, T> FrameSampler<'a, S, T>
where
    S: FrameSource + ?Sized,
    T: IntensityTransform,
{
    pub fn new(source: &'a S, converter: &'a FrameConverter<T>) -> Self {
        Self {
            source,
            converter,
            cancel: None,
        }
    }

    /// Stop picking up new frames once `flag` is set.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.load(Ordering::SeqCst))
    }

    fn convert_index(&self, index: usize, end: usize) -> Option<SampledFrame> {
        if self.cancelled() {
            return None;
        }
        log::debug!("processing frame #{} / {}", index, end);
        match self.source.read_frame(index) {
            Ok(raw) => Some(SampledFrame {
                index,
                frame: self.converter.convert(&raw),
            }),
            Err(e) => {
                log::warn!("skipping frame #{}: {}", index, e);
                None
            }
        }
    }

    /// Convert every index of `window`, in parallel on the current rayon pool.
    ///
    /// Frames that fail to decode are skipped. After cancellation the frames
    /// finished so far are returned. The result is ordered by frame index.
    pub fn run<F>(&self, window: &SampleWindow, on_progress: F) -> Vec<SampledFrame>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let frame_count = self.source.info().frame_count;
        let indices = window.indices(frame_count);
        let end = window.end(frame_count);
        let total = indices.len();
        let completed = AtomicUsize::new(0);

        // One slot per index keeps sampling order independent of scheduling.
        let slots: Vec<Option<SampledFrame>> = indices
            .par_iter()
            .map(|&index| {
                let result = self.convert_index(index, end);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                on_progress(done, total);
                result
            })
            .collect();

        let frames: Vec<SampledFrame> = slots.into_iter().flatten().collect();
        if self.cancelled() {
            log::warn!("cancelled after {} of {} frames", frames.len(), total);
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::ramp::GlyphRamp;
    use crate::source::VideoInfo;
    use image::{Rgb, RgbImage};

    #[test]
    fn bounded_window() {
        let w = SampleWindow::new(2, 1, 3).unwrap();
        assert_eq!(w.end(10), 5);
        assert_eq!(w.indices(10), vec![2, 3, 4]);
    }

    #[test]
    fn unbounded_window_excludes_final_frame() {
        let w = SampleWindow::new(0, 1, 0).unwrap();
        assert_eq!(w.indices(10), (0..=8).collect::<Vec<_>>());
    }

    #[test]
    fn include_mode_reaches_final_frame() {
        let w = SampleWindow::new(0, 1, 0).unwrap().with_last_frame(LastFrame::Include);
        assert_eq!(w.indices(10), (0..=9).collect::<Vec<_>>());
        let bounded = SampleWindow::new(2, 1, 3).unwrap().with_last_frame(LastFrame::Include);
        assert_eq!(bounded.indices(10), vec![2, 3, 4]);
        let clipped = SampleWindow::new(8, 1, 5).unwrap().with_last_frame(LastFrame::Include);
        assert_eq!(clipped.indices(10), vec![8, 9]);
    }

    #[test]
    fn step_skips_frames() {
        let w = SampleWindow::new(1, 3, 0).unwrap();
        assert_eq!(w.indices(12), vec![1, 4, 7, 10]);
    }

    #[test]
    fn empty_and_degenerate_windows() {
        let w = SampleWindow::default();
        assert!(w.indices(0).is_empty());
        assert!(w.indices(1).is_empty());
        assert!(SampleWindow::new(20, 1, 0).unwrap().indices(10).is_empty());
        assert_eq!(SampleWindow::new(0, 0, 0), Err(SampleError::ZeroStep));
    }

    /// Frames whose shade encodes their index; a chosen set of indices fails.
    struct FakeSource {
        count: usize,
        broken: Vec<usize>,
    }

    impl FrameSource for FakeSource {
        fn info(&self) -> VideoInfo {
            VideoInfo {
                width: 8,
                height: 4,
                fps: 30.0,
                frame_count: self.count,
            }
        }

        fn read_frame(&self, index: usize) -> Result<RgbImage, SourceError> {
            if self.broken.contains(&index) {
                return Err(SourceError::Decode {
                    index,
                    message: "broken".to_string(),
                });
            }
            // Left column black, the rest a shade that depends on the index.
            Ok(RgbImage::from_fn(8, 4, |x, _| {
                if x == 0 {
                    Rgb([0, 0, 0])
                } else {
                    Rgb([(20 + index * 10) as u8; 3])
                }
            }))
        }
    }

    #[test]
    fn results_are_ordered_and_failures_skipped() {
        let source = FakeSource {
            count: 12,
            broken: vec![3, 7],
        };
        let converter = FrameConverter::new(GlyphRamp::plain(), 8, 4);
        let window = SampleWindow::new(0, 1, 0).unwrap();
        let frames = FrameSampler::new(&source, &converter).run(&window, |_, _| {});
        let indices: Vec<usize> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 4, 5, 6, 8, 9, 10]);
    }

    #[test]
    fn progress_reaches_total() {
        let source = FakeSource {
            count: 6,
            broken: vec![],
        };
        let converter = FrameConverter::new(GlyphRamp::plain(), 8, 4);
        let window = SampleWindow::new(0, 2, 0).unwrap();
        let max_seen = AtomicUsize::new(0);
        FrameSampler::new(&source, &converter).run(&window, |done, total| {
            assert_eq!(total, 3);
            max_seen.fetch_max(done, Ordering::SeqCst);
        });
        assert_eq!(max_seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn cancelled_run_returns_nothing_new() {
        let source = FakeSource {
            count: 50,
            broken: vec![],
        };
        let converter = FrameConverter::new(GlyphRamp::plain(), 8, 4);
        let cancel = AtomicBool::new(true);
        let frames = FrameSampler::new(&source, &converter)
            .with_cancel(&cancel)
            .run(&SampleWindow::default(), |_, _| {});
        assert!(frames.is_empty());
    }

    /// Raises the cancel flag while reading frame `at`.
    struct CancelAt<'a> {
        at: usize,
        flag: &'a AtomicBool,
    }

    impl FrameSource for CancelAt<'_> {
        fn info(&self) -> VideoInfo {
            VideoInfo {
                width: 8,
                height: 4,
                fps: 30.0,
                frame_count: 20,
            }
        }

        fn read_frame(&self, index: usize) -> Result<RgbImage, SourceError> {
            if index == self.at {
                self.flag.store(true, Ordering::SeqCst);
            }
            Ok(RgbImage::from_pixel(8, 4, Rgb([(index * 10) as u8; 3])))
        }
    }

    #[test]
    fn frames_finished_before_cancel_are_kept() {
        let cancel = AtomicBool::new(false);
        let source = CancelAt { at: 3, flag: &cancel };
        let converter = FrameConverter::new(GlyphRamp::plain(), 8, 4);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let frames = pool.install(|| {
            FrameSampler::new(&source, &converter)
                .with_cancel(&cancel)
                .run(&SampleWindow::default(), |_, _| {})
        });
        let indices: Vec<usize> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn same_input_same_output() {
        let source = FakeSource {
            count: 5,
            broken: vec![],
        };
        let converter = FrameConverter::new(GlyphRamp::block(), 8, 4);
        let sampler = FrameSampler::new(&source, &converter);
        let window = SampleWindow::default();
        assert_eq!(sampler.run(&window, |_, _| {}), sampler.run(&window, |_, _| {}));
    }
}
