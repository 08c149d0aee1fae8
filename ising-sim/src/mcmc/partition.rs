use crate::error::IsingError;

/// Width A of each row block when `lattice_size` rows are split across
/// `n_workers` workers.
pub fn block_width(lattice_size: usize, n_workers: usize) -> Result<usize, IsingError> {
    if n_workers == 0 || lattice_size == 0 || lattice_size % n_workers != 0 {
        return Err(IsingError::Partition {
            lattice_size,
            n_workers,
        });
    }
    Ok(lattice_size / n_workers)
}

/// Contiguous range of lattice rows owned by one worker.
///
/// The first and last rows border another worker's block; every other row is
/// interior. When the width is 1 the single row is both first and last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub index: usize,
    pub first_row: usize,
    pub width: usize,
    pub side: usize,
}

impl Block {
    #[inline]
    pub fn last_row(&self) -> usize {
        self.first_row + self.width - 1
    }

    #[inline]
    pub fn start_site(&self) -> usize {
        self.first_row * self.side
    }

    #[inline]
    pub fn n_sites(&self) -> usize {
        self.width * self.side
    }

    /// Rows strictly between the first and the last.
    #[inline]
    pub fn interior_rows(&self) -> usize {
        self.width.saturating_sub(2)
    }

    #[inline]
    pub fn is_boundary_row(&self, row: usize) -> bool {
        row == self.first_row || row == self.last_row()
    }

    #[inline]
    pub fn contains_row(&self, row: usize) -> bool {
        (self.first_row..=self.last_row()).contains(&row)
    }
}

/// Split the lattice rows into `n_workers` equal contiguous blocks.
pub fn partition(lattice_size: usize, n_workers: usize) -> Result<Vec<Block>, IsingError> {
    let width = block_width(lattice_size, n_workers)?;
    Ok((0..n_workers)
        .map(|index| Block {
            index,
            first_row: index * width,
            width,
            side: lattice_size,
        })
        .collect())
}
