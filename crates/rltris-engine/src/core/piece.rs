use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// A single cell of a rotation variant as `(row_offset, col_offset)` from the
/// piece origin.
///
/// Rows grow downward, so a negative row offset sits above the origin.
pub type CellOffset = (i8, i8);

/// One orientation of a piece: exactly four cells relative to the origin.
pub type RotationVariant = [CellOffset; 4];

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds in registry order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Returns the rotation variants of this piece, in rotation-index order.
    #[must_use]
    pub const fn variants(self) -> &'static [RotationVariant] {
        PIECE_VARIANTS[self as usize]
    }
}

/// The piece currently in play.
///
/// Holds the shape identifier and its rotation-variant list from the static
/// registry. A new `ActivePiece` replaces the old one after every successful
/// placement; it is never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    kind: PieceKind,
    variants: &'static [RotationVariant],
}

impl ActivePiece {
    /// Creates the active piece for `kind`, borrowing its registry variants.
    #[must_use]
    pub const fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            variants: kind.variants(),
        }
    }

    /// Returns the shape of this piece.
    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Returns the rotation variants; the index is the action's rotation.
    #[must_use]
    pub fn variants(&self) -> &'static [RotationVariant] {
        self.variants
    }
}

impl From<PieceKind> for ActivePiece {
    fn from(kind: PieceKind) -> Self {
        Self::new(kind)
    }
}

/// Rotation table indexed by `PieceKind as usize`.
///
/// Origins are chosen so that every variant spans at most two columns left and
/// right of the origin, which the column scan margin relies on.
const PIECE_VARIANTS: [&[RotationVariant]; PieceKind::LEN] = [
    // I-piece: horizontal, vertical
    &[
        [(0, -1), (0, 0), (0, 1), (0, 2)],
        [(-1, 0), (0, 0), (1, 0), (2, 0)],
    ],
    // O-piece
    &[[(0, 0), (0, 1), (1, 0), (1, 1)]],
    // T-piece: up, right, down, left
    &[
        [(0, -1), (0, 0), (0, 1), (-1, 0)],
        [(-1, 0), (0, 0), (1, 0), (0, 1)],
        [(0, -1), (0, 0), (0, 1), (1, 0)],
        [(-1, 0), (0, 0), (1, 0), (0, -1)],
    ],
    // S-piece
    &[
        [(0, -1), (0, 0), (-1, 0), (-1, 1)],
        [(-1, 0), (0, 0), (0, 1), (1, 1)],
    ],
    // Z-piece
    &[
        [(0, 1), (0, 0), (-1, 0), (-1, -1)],
        [(-1, 1), (0, 1), (0, 0), (1, 0)],
    ],
    // J-piece
    &[
        [(0, -1), (0, 0), (0, 1), (-1, -1)],
        [(-1, 0), (0, 0), (1, 0), (-1, 1)],
        [(0, -1), (0, 0), (0, 1), (1, 1)],
        [(1, -1), (-1, 0), (0, 0), (1, 0)],
    ],
    // L-piece
    &[
        [(0, -1), (0, 0), (0, 1), (-1, 1)],
        [(-1, 0), (0, 0), (1, 0), (1, 1)],
        [(0, -1), (0, 0), (0, 1), (1, -1)],
        [(-1, -1), (-1, 0), (0, 0), (1, 0)],
    ],
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_rotation_counts() {
        let counts: Vec<_> = PieceKind::ALL.iter().map(|k| k.variants().len()).collect();
        assert_eq!(counts, [2, 1, 4, 2, 2, 4, 4]);
    }

    #[test]
    fn test_variants_have_four_distinct_cells() {
        for kind in PieceKind::ALL {
            for (rotation, variant) in kind.variants().iter().enumerate() {
                let cells: HashSet<_> = variant.iter().copied().collect();
                assert_eq!(cells.len(), 4, "{kind:?} rotation {rotation} has duplicates");
            }
        }
    }

    #[test]
    fn test_variants_stay_within_column_margin() {
        for kind in PieceKind::ALL {
            for variant in kind.variants() {
                for &(_, dc) in variant {
                    assert!((-2..=2).contains(&dc), "{kind:?} exceeds margin: {dc}");
                }
            }
        }
    }

    #[test]
    fn test_variants_are_connected() {
        for kind in PieceKind::ALL {
            for variant in kind.variants() {
                let cells: HashSet<_> = variant.iter().copied().collect();
                let mut seen = HashSet::from([variant[0]]);
                let mut stack = vec![variant[0]];
                while let Some((r, c)) = stack.pop() {
                    for n in [(r - 1, c), (r + 1, c), (r, c - 1), (r, c + 1)] {
                        if cells.contains(&n) && seen.insert(n) {
                            stack.push(n);
                        }
                    }
                }
                assert_eq!(seen.len(), 4, "{kind:?} variant {variant:?} is disconnected");
            }
        }
    }

    #[test]
    fn test_active_piece_references_registry() {
        let piece = ActivePiece::new(PieceKind::T);
        assert_eq!(piece.kind(), PieceKind::T);
        assert_eq!(piece.variants(), PieceKind::T.variants());
    }

    #[test]
    fn test_random_kind_covers_all_shapes() {
        let mut rng = Pcg32::seed_from_u64(42);
        let drawn: HashSet<PieceKind> = (0..500).map(|_| rng.random()).collect();
        assert_eq!(drawn.len(), PieceKind::LEN);
    }
}
