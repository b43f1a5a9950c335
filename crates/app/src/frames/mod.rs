//! Frame selection over a video's sampled frame sequence.

pub mod view;

use snafu::Snafu;

pub use view::{EmotionPanel, FrameViewer, FrameViews, THUMBNAIL_LIMIT, Thumbnail, ThumbnailStrip};

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CursorError {
    #[snafu(display("frame index {index} is outside 0..{frame_count} on `{stage}`"))]
    OutOfRange {
        stage: &'static str,
        index: usize,
        frame_count: usize,
    },
}

/// Index into an externally owned frame sequence.
///
/// While `frame_count > 0` the index always satisfies `index < frame_count`.
/// With no frames the cursor is inactive and every movement is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameCursor {
    frame_count: usize,
    index: usize,
}

impl FrameCursor {
    pub fn new(frame_count: usize) -> Self {
        let mut cursor = Self::default();
        cursor.init(frame_count);
        cursor
    }

    pub fn init(&mut self, frame_count: usize) {
        self.frame_count = frame_count;
        self.index = 0;
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn is_active(&self) -> bool {
        self.frame_count > 0
    }

    /// Selected position, `None` while inactive.
    pub fn index(&self) -> Option<usize> {
        self.is_active().then_some(self.index)
    }

    /// Moves one frame forward, saturating at the last frame. Returns whether the index changed.
    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Moves one frame back, saturating at the first frame. Returns whether the index changed.
    pub fn prev(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn jump_to(&mut self, index: usize) -> Result<(), CursorError> {
        snafu::ensure!(
            index < self.frame_count,
            OutOfRangeSnafu {
                stage: "jump-to-frame",
                index,
                frame_count: self.frame_count,
            }
        );
        self.index = index;
        Ok(())
    }

    pub fn can_prev(&self) -> bool {
        self.is_active() && self.index > 0
    }

    pub fn can_next(&self) -> bool {
        self.is_active() && self.index + 1 < self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_saturates_at_last_frame() {
        let mut cursor = FrameCursor::new(8);
        for _ in 0..8 {
            cursor.next();
        }
        assert_eq!(cursor.index(), Some(7));
        assert!(!cursor.can_next());
        assert!(!cursor.next());
    }

    #[test]
    fn prev_saturates_at_first_frame() {
        let mut cursor = FrameCursor::new(3);
        assert!(!cursor.prev());
        assert_eq!(cursor.index(), Some(0));
        assert!(!cursor.can_prev());
    }

    #[test]
    fn mixed_moves_stay_in_bounds() {
        for frame_count in 1..6 {
            let mut cursor = FrameCursor::new(frame_count);
            let moves = [true, true, false, true, true, true, true, false, false, false, false, false, true];
            for forward in moves {
                if forward {
                    cursor.next();
                } else {
                    cursor.prev();
                }
                let index = cursor.index().unwrap();
                assert!(index < frame_count);
            }
        }
    }

    #[test]
    fn jump_out_of_range_leaves_index_unchanged() {
        let mut cursor = FrameCursor::new(5);
        cursor.jump_to(3).unwrap();

        let error = cursor.jump_to(5).unwrap_err();
        assert_eq!(
            error,
            CursorError::OutOfRange {
                stage: "jump-to-frame",
                index: 5,
                frame_count: 5,
            }
        );
        assert_eq!(cursor.index(), Some(3));
    }

    #[test]
    fn init_resets_to_first_frame() {
        let mut cursor = FrameCursor::new(4);
        cursor.jump_to(2).unwrap();
        cursor.init(10);
        assert_eq!(cursor.index(), Some(0));
        assert_eq!(cursor.frame_count(), 10);
    }

    #[test]
    fn zero_frames_is_inactive() {
        let mut cursor = FrameCursor::new(0);
        assert!(!cursor.is_active());
        assert_eq!(cursor.index(), None);
        assert!(!cursor.next());
        assert!(!cursor.prev());
        assert!(cursor.jump_to(0).is_err());
    }
}
