use crate::xoshiro::XoShiRo256PlusPlus;
use crypto_hashes::{Hash, HeavyHasher};

/// A 64x64 matrix of 4-bit values derived deterministically from the
/// pre-PoW hash. Regenerated until it has full rank, so the heavy-hash
/// transform never degenerates.
pub struct Matrix([[u16; 64]; 64]);

impl Matrix {
    pub fn generate(hash: Hash) -> Self {
        let mut generator = XoShiRo256PlusPlus::new(hash);
        loop {
            let matrix = Self::rand_matrix(&mut generator);
            if matrix.compute_rank() == 64 {
                return matrix;
            }
        }
    }

    fn rand_matrix(generator: &mut XoShiRo256PlusPlus) -> Self {
        let mut rows = [[0u16; 64]; 64];
        for row in rows.iter_mut() {
            // Each u64 word yields sixteen 4-bit cells
            for chunk in row.chunks_exact_mut(16) {
                let word = generator.u64();
                for (shift, cell) in chunk.iter_mut().enumerate() {
                    *cell = ((word >> (4 * shift)) & 0x0f) as u16;
                }
            }
        }
        Self(rows)
    }

    /// Rank via Gaussian elimination over f64; exact enough for 4-bit
    /// integer entries
    fn compute_rank(&self) -> usize {
        const EPS: f64 = 1e-9;
        let mut rows: Vec<[f64; 64]> = self.0.iter().map(|row| row.map(f64::from)).collect();
        let mut rank = 0;
        let mut row_selected = [false; 64];
        for i in 0..64 {
            let Some(pivot) = (0..64).find(|&j| !row_selected[j] && rows[j][i].abs() > EPS) else {
                continue;
            };
            rank += 1;
            row_selected[pivot] = true;
            for k in i + 1..64 {
                rows[pivot][k] /= rows[pivot][i];
            }
            let pivot_row = rows[pivot];
            for (other, row) in rows.iter_mut().enumerate() {
                let factor = row[i];
                if other != pivot && factor.abs() > EPS {
                    for k in i + 1..64 {
                        row[k] -= pivot_row[k] * factor;
                    }
                }
            }
        }
        rank
    }

    /// The heavy-hash transform: treat the input as 64 nibbles, multiply by
    /// the matrix over the integers, keep the top nibble of each component,
    /// fold it back into the input and hash once more.
    pub fn heavy_hash(&self, hash: Hash) -> Hash {
        let mut vector = [0u16; 64];
        for (i, &byte) in hash.as_bytes().iter().enumerate() {
            vector[2 * i] = (byte >> 4) as u16;
            vector[2 * i + 1] = (byte & 0x0f) as u16;
        }

        let mut product = [0u16; 64];
        for (cell, row) in product.iter_mut().zip(self.0.iter()) {
            // Max possible sum is 64 * 15 * 15, well inside u16
            let sum: u16 = row.iter().zip(vector.iter()).map(|(m, v)| m * v).sum();
            *cell = sum >> 10;
        }

        let mut folded = [0u8; 32];
        for (i, byte) in folded.iter_mut().enumerate() {
            *byte = hash.as_bytes()[i] ^ ((product[2 * i] << 4) as u8 | product[2 * i + 1] as u8);
        }
        HeavyHasher::hash(Hash::from_bytes(folded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_matrix_has_full_rank() {
        let matrix = Matrix::generate(Hash::from_le_u64([42, 0, 0, 0]));
        assert_eq!(matrix.compute_rank(), 64);
    }

    #[test]
    fn heavy_hash_is_deterministic_and_seed_sensitive() {
        let seed_a = Hash::from_le_u64([1, 0, 0, 0]);
        let seed_b = Hash::from_le_u64([2, 0, 0, 0]);
        let input = Hash::from_le_u64([7, 7, 7, 7]);

        let first = Matrix::generate(seed_a).heavy_hash(input);
        let again = Matrix::generate(seed_a).heavy_hash(input);
        let other_seed = Matrix::generate(seed_b).heavy_hash(input);

        assert_eq!(first, again);
        assert_ne!(first, other_seed);
    }

    #[test]
    fn heavy_hash_depends_on_input() {
        let matrix = Matrix::generate(Hash::from_le_u64([3, 0, 0, 0]));
        assert_ne!(
            matrix.heavy_hash(Hash::from_le_u64([1, 0, 0, 0])),
            matrix.heavy_hash(Hash::from_le_u64([2, 0, 0, 0])),
        );
    }
}
