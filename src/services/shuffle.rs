/// Seeded shuffling for reproducible "refresh" results.
///
/// The generator is mulberry32: a single 32-bit state word advanced by a fixed
/// odd increment, with two xorshift-multiply rounds per draw.
const INCREMENT: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    /// Returns a value in `[0, 1)` together with the advanced generator
    pub fn next(self) -> (f64, Self) {
        let state = self.state.wrapping_add(INCREMENT);

        let mut t = state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let value = (t ^ (t >> 14)) as f64 / TWO_POW_32;

        (value, Self { state })
    }
}

/// Fisher-Yates shuffle of a copy of `items`, driven by mulberry32
pub fn seeded_shuffle<T: Clone>(items: &[T], seed: u32) -> Vec<T> {
    let mut out = items.to_vec();
    let mut rng = Mulberry32::new(seed);

    for i in (1..out.len()).rev() {
        let (r, next) = rng.next();
        rng = next;
        let j = (r * (i + 1) as f64).floor() as usize;
        out.swap(i, j.min(i));
    }

    out
}
