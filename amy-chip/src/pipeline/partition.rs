//! Static division of the oscillator pool between the two render stages.

use core::ops::Range;

/// Two disjoint index ranges covering `0..total`.
///
/// The remote stage owns `0..split`, the local stage owns `split..total`.
/// [`split()`](Self::split) hands out the two halves as separate `&mut`
/// slices, so the stages cannot overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OscPartition {
    total: usize,
    split: usize,
}

impl OscPartition {
    /// Split `total` oscillators in half (remote gets the lower half).
    pub const fn halves(total: usize) -> Self {
        OscPartition {
            total,
            split: total / 2,
        }
    }

    /// Split at an explicit index.
    ///
    /// # Panics
    ///
    /// If `split > total`.
    pub const fn at(total: usize, split: usize) -> Self {
        assert!(split <= total, "partition point beyond the oscillator pool");
        OscPartition { total, split }
    }

    pub const fn total(&self) -> usize {
        self.total
    }

    /// Indices rendered by Render Stage A.
    pub const fn remote(&self) -> Range<usize> {
        0..self.split
    }

    /// Indices rendered by Render Stage B.
    pub const fn local(&self) -> Range<usize> {
        self.split..self.total
    }

    /// Split the voice pool into `(remote, local)` slices.
    pub fn split<'v, V>(&self, voices: &'v mut [V]) -> (&'v mut [V], &'v mut [V]) {
        debug_assert_eq!(voices.len(), self.total);
        voices.split_at_mut(self.split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AMY_OSCS;

    #[test]
    fn halves_cover_pool_exactly_once() {
        let p = OscPartition::halves(AMY_OSCS);
        assert_eq!(p.remote(), 0..AMY_OSCS / 2);
        assert_eq!(p.local(), AMY_OSCS / 2..AMY_OSCS);

        let mut hits = [0u8; AMY_OSCS];
        for i in p.remote().chain(p.local()) {
            hits[i] += 1;
        }
        assert!(hits.iter().all(|&h| h == 1));
    }

    #[test]
    fn odd_pool_gives_extra_voice_to_local() {
        let p = OscPartition::halves(7);
        assert_eq!(p.remote().len(), 3);
        assert_eq!(p.local().len(), 4);
    }

    #[test]
    fn split_slices_match_ranges() {
        let p = OscPartition::halves(10);
        let mut voices: [usize; 10] = core::array::from_fn(|i| i);
        let (remote, local) = p.split(&mut voices);
        assert_eq!(remote, &[0, 1, 2, 3, 4]);
        assert_eq!(local, &[5, 6, 7, 8, 9]);
    }

    #[test]
    fn explicit_split_point() {
        let p = OscPartition::at(8, 2);
        assert_eq!(p.remote(), 0..2);
        assert_eq!(p.local(), 2..8);
        assert_eq!(p.total(), 8);
    }

    #[test]
    #[should_panic]
    fn split_point_beyond_pool_panics() {
        let _ = OscPartition::at(4, 5);
    }
}
