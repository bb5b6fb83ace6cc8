//! Collision-avoiding label placement.

use crate::geometry::BoundingBox;

/// Where a label ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Index into the candidate list.
    Candidate(usize),
    /// All candidates collided; placed at the shifted first candidate.
    Fallback,
}

/// Places label rectangles around shapes without overlapping earlier labels.
///
/// Lives for one redraw pass.
#[derive(Debug, Clone)]
pub struct LabelPlacer {
    placed: Vec<BoundingBox>,
    gap: f32,
    fallback_shift: f32,
    fallbacks: usize,
}

impl LabelPlacer {
    /// `gap` separates label and shape; `fallback_shift` moves the fallback
    /// position further up.
    pub fn new(gap: f32, fallback_shift: f32) -> Self {
        Self {
            placed: Vec::new(),
            gap,
            fallback_shift,
            fallbacks: 0,
        }
    }

    /// Candidate label rectangles in priority order: above-left, above-right,
    /// below-left, below-right, above-offset, below-offset.
    pub fn candidates(&self, shape: BoundingBox, width: f32, height: f32) -> [BoundingBox; 6] {
        let above = shape.ymin - height - self.gap;
        let below = shape.ymax + self.gap;
        let left = shape.xmin;
        let right = shape.xmax - width;
        let offset = shape.xmin + width / 2.0;

        [
            (left, above),
            (right, above),
            (left, below),
            (right, below),
            (offset, above),
            (offset, below),
        ]
        .map(|(x, y)| BoundingBox::from_origin_size(x, y, width, height))
    }

    /// Pick a rectangle for a `width`×`height` label next to `shape`.
    ///
    /// Always returns; when every candidate collides the fallback is taken
    /// without further checks.
    pub fn place(&mut self, shape: BoundingBox, width: f32, height: f32) -> (BoundingBox, Placement) {
        let candidates = self.candidates(shape, width, height);

        let found = candidates
            .iter()
            .enumerate()
            .find(|(_, c)| !self.placed.iter().any(|p| p.overlaps(c)));

        let (rect, placement) = match found {
            Some((i, rect)) => (*rect, Placement::Candidate(i)),
            None => {
                self.fallbacks += 1;
                (
                    candidates[0].translated(0.0, -self.fallback_shift),
                    Placement::Fallback,
                )
            }
        };
        self.placed.push(rect);
        (rect, placement)
    }

    pub fn placed(&self) -> &[BoundingBox] {
        &self.placed
    }

    /// Labels that had to use the fallback position.
    pub fn fallback_count(&self) -> usize {
        self.fallbacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order() {
        let placer = LabelPlacer::new(3.0, 10.0);
        let shape = BoundingBox::new(100.0, 100.0, 200.0, 150.0);
        let c = placer.candidates(shape, 40.0, 20.0);

        assert_eq!(c[0], BoundingBox::new(100.0, 77.0, 140.0, 97.0));
        assert_eq!(c[1].xmin, 160.0);
        assert_eq!(c[2].ymin, 153.0);
        assert_eq!(c[3], BoundingBox::new(160.0, 153.0, 200.0, 173.0));
        assert_eq!(c[4].xmin, 120.0);
        assert_eq!(c[5].ymin, 153.0);
    }

    #[test]
    fn test_first_free_candidate_wins() {
        let mut placer = LabelPlacer::new(3.0, 10.0);
        let shape = BoundingBox::new(100.0, 100.0, 300.0, 200.0);

        let (_, first) = placer.place(shape, 40.0, 20.0);
        let (_, second) = placer.place(shape, 40.0, 20.0);
        assert_eq!(first, Placement::Candidate(0));
        assert_eq!(second, Placement::Candidate(1));
    }

    #[test]
    fn test_spaced_labels_do_not_overlap() {
        let mut placer = LabelPlacer::new(3.0, 10.0);
        for i in 0..5 {
            let x = i as f32 * 1000.0;
            let (_, placement) = placer.place(BoundingBox::new(x, 500.0, x + 50.0, 550.0), 120.0, 28.0);
            assert_eq!(placement, Placement::Candidate(0));
        }

        let placed = placer.placed();
        assert_eq!(placed.len(), 5);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
        assert_eq!(placer.fallback_count(), 0);
    }

    #[test]
    fn test_dense_labels_terminate_with_fallback() {
        let mut placer = LabelPlacer::new(3.0, 10.0);
        let shape = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        for _ in 0..500 {
            placer.place(shape, 80.0, 28.0);
        }

        assert_eq!(placer.placed().len(), 500);
        assert!(placer.fallback_count() > 0);

        let fallback = placer.placed()[499];
        let first = placer.candidates(shape, 80.0, 28.0)[0];
        assert_eq!(fallback, first.translated(0.0, -10.0));
    }
}
