// Seeded mine placement
// Draws mine positions from a java.util.Random compatible LCG so a board number always yields the same field

use rand::{Error as RandError, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::trace;

use crate::kbm_error::{KaboomError, Result};

const MULTIPLIER: u64 = 0x5_DEEC_E66D;
const ADDEND: u64 = 0xB;
const MASK: u64 = (1 << 48) - 1;

/// 48-bit linear congruential generator with the exact output sequence of `java.util.Random`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaRandom {
    state: u64,
}

impl JavaRandom {
    pub fn new(seed: i64) -> Self {
        JavaRandom {
            state: (seed as u64 ^ MULTIPLIER) & MASK,
        }
    }

    /// Advance the generator and return the top `bits` bits of the new state
    fn next(&mut self, bits: u32) -> i32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(ADDEND) & MASK;
        (self.state >> (48 - bits)) as u32 as i32
    }

    /// Uniform value in `[0, bound)`; `bound` must be positive
    pub fn next_int(&mut self, bound: i32) -> i32 {
        debug_assert!(bound > 0);
        // powers of two take the high bits directly
        if bound & bound.wrapping_neg() == bound {
            return ((bound as i64 * self.next(31) as i64) >> 31) as i32;
        }
        loop {
            let bits = self.next(31);
            let val = bits % bound;
            // reject the incomplete last bucket (the sum overflows into the sign bit)
            if bits.wrapping_sub(val).wrapping_add(bound - 1) >= 0 {
                return val;
            }
        }
    }
}

impl RngCore for JavaRandom {
    fn next_u32(&mut self) -> u32 {
        self.next(32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next(32) as i64;
        let lo = self.next(32) as i64;
        (hi << 32).wrapping_add(lo) as u64
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let mut rnd = self.next(32);
            for byte in chunk {
                *byte = rnd as u8;
                rnd >>= 8;
            }
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), RandError> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for JavaRandom {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        JavaRandom::new(i64::from_le_bytes(seed))
    }

    // raw seed, same sequence as JavaRandom::new
    fn seed_from_u64(state: u64) -> Self {
        JavaRandom::new(state as i64)
    }
}

/// A tile coordinate, 0-indexed from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Unique mine positions produced by one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MineSet {
    positions: BTreeSet<Position>,
}

impl MineSet {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }

    /// Positions in row-major order
    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions.iter().copied()
    }
}

impl FromIterator<Position> for MineSet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        MineSet {
            positions: iter.into_iter().collect(),
        }
    }
}

/// How the requested mine count is turned into draws
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Exactly `mine_count` draws; a repeated position is dropped, so fewer mines may land
    #[default]
    FixedDraws,
    /// Keep drawing until `mine_count` distinct positions are placed
    Exact,
}

/// Place mines with the classic fixed-draw behaviour
pub fn generate(height: usize, width: usize, mine_count: usize, seed: i64) -> Result<MineSet> {
    generate_with(height, width, mine_count, seed, Placement::FixedDraws)
}

/// Place mines on a `height` x `width` board
/// Each draw takes the row first, then the column, from the same seeded sequence
pub fn generate_with(
    height: usize,
    width: usize,
    mine_count: usize,
    seed: i64,
    placement: Placement,
) -> Result<MineSet> {
    let (rows, cols) = match (i32::try_from(height), i32::try_from(width)) {
        (Ok(r), Ok(c)) if r > 0 && c > 0 => (r, c),
        _ => return Err(KaboomError::InvalidDimension { height, width }),
    };
    let cells = height.saturating_mul(width);
    if mine_count > cells {
        return Err(KaboomError::InvalidMineCount {
            mines: mine_count,
            cells,
        });
    }

    let mut rng = JavaRandom::new(seed);
    let mut positions = BTreeSet::new();
    let draw = |rng: &mut JavaRandom| {
        let row = rng.next_int(rows) as usize;
        let col = rng.next_int(cols) as usize;
        Position { row, col }
    };
    match placement {
        Placement::FixedDraws => {
            for _ in 0..mine_count {
                positions.insert(draw(&mut rng));
            }
        }
        Placement::Exact => {
            while positions.len() < mine_count {
                positions.insert(draw(&mut rng));
            }
        }
    }

    trace!(
        height,
        width,
        mine_count,
        seed,
        placed = positions.len(),
        "generated mine field"
    );
    Ok(MineSet { positions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn java_random_matches_reference_sequence() {
        let mut rng = JavaRandom::new(42);
        assert_eq!(rng.next_u32() as i32, -1170105035);

        let mut rng = JavaRandom::new(0);
        let draws: Vec<i32> = (0..5).map(|_| rng.next_int(7)).collect();
        assert_eq!(draws, vec![5, 2, 4, 2, 4]);

        let mut rng = JavaRandom::new(7);
        let draws: Vec<i32> = (0..6).map(|_| rng.next_int(5)).collect();
        assert_eq!(draws, vec![1, 4, 0, 4, 0, 4]);
    }

    #[test]
    fn seed_from_u64_keeps_the_raw_seed() {
        let mut a = JavaRandom::seed_from_u64(42);
        let mut b = JavaRandom::new(42);
        assert_eq!(a.next_u64(), b.next_u64());

        let mut c = JavaRandom::from_seed(42i64.to_le_bytes());
        assert_eq!(c.next_u32() as i32, -1170105035);
    }

    #[test]
    fn works_as_a_rand_source() {
        let mut rng = JavaRandom::new(3);
        for _ in 0..100 {
            let v: u32 = rng.gen_range(0..10);
            assert!(v < 10);
        }
    }

    #[test]
    fn same_seed_same_field() {
        for seed in [1, 2, 99] {
            let first = generate(10, 10, 9, seed).unwrap();
            for _ in 0..3 {
                assert_eq!(generate(10, 10, 9, seed).unwrap(), first);
            }
        }
    }

    #[test]
    fn different_seeds_give_known_fields() {
        let one = generate(10, 10, 9, 1).unwrap();
        let expected: MineSet = [
            pos(2, 2),
            pos(2, 4),
            pos(4, 4),
            pos(4, 6),
            pos(5, 8),
            pos(7, 3),
            pos(8, 8),
            pos(9, 3),
        ]
        .into_iter()
        .collect();
        assert_eq!(one, expected);

        let two = generate(10, 10, 9, 2).unwrap();
        assert_eq!(two.len(), 8);
        assert!(two.contains(pos(0, 7)));
        assert_ne!(one, two);
    }

    #[test]
    fn collisions_reduce_the_count() {
        // seed 1 repeats (7, 3) within its nine draws
        let field = generate(10, 10, 9, 1).unwrap();
        assert_eq!(field.len(), 8);
    }

    #[test]
    fn exact_placement_fills_the_request() {
        let field = generate_with(10, 10, 9, 1, Placement::Exact).unwrap();
        assert_eq!(field.len(), 9);
        assert!(field.contains(pos(6, 9)));

        let full = generate_with(3, 4, 12, 5, Placement::Exact).unwrap();
        assert_eq!(full.len(), 12);
    }

    #[test]
    fn positions_stay_on_the_board() {
        for seed in 0..50 {
            let field = generate(7, 13, 20, seed).unwrap();
            assert!(field.len() <= 20);
            assert!(!field.is_empty());
            for p in field.iter() {
                assert!(p.row < 7 && p.col < 13, "{p} off the board");
            }
        }
    }

    #[test]
    fn single_row_board() {
        assert_eq!(generate(1, 2, 1, 1).unwrap().iter().collect::<Vec<_>>(), vec![pos(0, 0)]);
        assert_eq!(generate(1, 2, 1, 3).unwrap().iter().collect::<Vec<_>>(), vec![pos(0, 1)]);
    }

    #[test]
    fn zero_mines_is_empty() {
        assert!(generate(5, 5, 0, 1).unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            generate(0, 10, 1, 1),
            Err(KaboomError::InvalidDimension { height: 0, width: 10 })
        ));
        assert!(matches!(
            generate(10, 0, 1, 1),
            Err(KaboomError::InvalidDimension { .. })
        ));
        assert!(matches!(
            generate(3, 3, 10, 1),
            Err(KaboomError::InvalidMineCount { mines: 10, cells: 9 })
        ));
    }
}
