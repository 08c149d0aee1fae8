/// Periodic L×L square lattice geometry.
///
/// Sites are indexed in row-major order: site `row * side + col`. Dimension 0
/// runs along rows, dimension 1 along columns. Neighbors are computed on the
/// fly; the table would cost more cache than the arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lattice {
    /// Side length L.
    pub side: usize,
    /// Total number of sites (`side * side`).
    pub n_spins: usize,
}

impl Lattice {
    pub fn new(side: usize) -> Self {
        Self {
            side,
            n_spins: side * side,
        }
    }

    /// Flat index of `(row, col)`, wrapping signed coordinates periodically.
    #[inline]
    pub fn site(&self, row: isize, col: isize) -> usize {
        let l = self.side as isize;
        (row.rem_euclid(l) * l + col.rem_euclid(l)) as usize
    }

    #[inline]
    pub fn row(&self, site: usize) -> usize {
        site / self.side
    }

    #[inline]
    pub fn col(&self, site: usize) -> usize {
        site % self.side
    }

    /// Compute the flat index of the neighbor of `site` in dimension `dim`.
    /// `forward = true` means +1 direction, `forward = false` means -1 direction.
    #[inline]
    pub fn neighbor(&self, site: usize, dim: usize, forward: bool) -> usize {
        let stride = if dim == 0 { self.side } else { 1 };
        let size = self.side;

        let coord = (site / stride) % size;

        let new_coord = if forward {
            if coord + 1 == size {
                0
            } else {
                coord + 1
            }
        } else if coord == 0 {
            size - 1
        } else {
            coord - 1
        };

        // site - coord*stride strips this dimension's contribution (always >= 0),
        // then we add back new_coord*stride.
        site - coord * stride + new_coord * stride
    }

    /// The four periodic neighbors of `site`: up, down, left, right.
    #[inline]
    pub fn neighbors(&self, site: usize) -> [usize; 4] {
        [
            self.neighbor(site, 0, false),
            self.neighbor(site, 0, true),
            self.neighbor(site, 1, false),
            self.neighbor(site, 1, true),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_square_neighbors() {
        // 4x4 lattice
        let lat = Lattice::new(4);
        assert_eq!(lat.n_spins, 16);

        // Site 0 = (0,0): forward in dim 0 -> (1,0)=4, forward in dim 1 -> (0,1)=1
        assert_eq!(lat.neighbor(0, 0, true), 4);
        assert_eq!(lat.neighbor(0, 1, true), 1);

        // Site 0 = (0,0): backward in dim 0 -> (3,0)=12 (wrap), backward in dim 1 -> (0,3)=3 (wrap)
        assert_eq!(lat.neighbor(0, 0, false), 12);
        assert_eq!(lat.neighbor(0, 1, false), 3);

        // Site 15 = (3,3): forward in dim 0 -> (0,3)=3 (wrap), forward in dim 1 -> (3,0)=12 (wrap)
        assert_eq!(lat.neighbor(15, 0, true), 3);
        assert_eq!(lat.neighbor(15, 1, true), 12);

        assert_eq!(lat.neighbors(5), [1, 9, 4, 6]);
    }

    #[test]
    fn test_signed_site_wraps() {
        let lat = Lattice::new(3);
        assert_eq!(lat.site(-1, -1), 8);
        assert_eq!(lat.site(3, 4), 1);
        assert_eq!(lat.row(7), 2);
        assert_eq!(lat.col(7), 1);
    }

    #[test]
    fn test_side_two_neighbors_coincide() {
        let lat = Lattice::new(2);
        let [up, down, left, right] = lat.neighbors(0);
        assert_eq!(up, down);
        assert_eq!(left, right);
        assert_eq!((up, left), (2, 1));
    }

    proptest! {
        #[test]
        fn prop_neighbors_match_signed_site(side in 2usize..40, row in 0isize..40, col in 0isize..40) {
            let lat = Lattice::new(side);
            let site = lat.site(row, col);
            prop_assert_eq!(
                lat.neighbors(site),
                [
                    lat.site(row - 1, col),
                    lat.site(row + 1, col),
                    lat.site(row, col - 1),
                    lat.site(row, col + 1),
                ]
            );
        }
    }
}
