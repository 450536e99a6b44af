//! 32-bit Mersenne Twister (MT19937).
//!
//! Seeding follows the reference `init_genrand` / `init_by_array` routines, so
//! a given seed always yields the same stream on every platform. Instances
//! generated from it are stable across releases, which the regression fixtures
//! in [`crate::Generator`] rely on.

use std::num::Wrapping;

use rand::{Error, RngCore, SeedableRng};

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

#[derive(Clone)]
pub struct Mt19937 {
    idx: usize,
    state: [Wrapping<u32>; N],
}

impl Mt19937 {
    pub const DEFAULT_SEED: u32 = 5489;

    /// Seed with a single word (`init_genrand`).
    #[must_use]
    pub fn new(seed: u32) -> Self {
        let mut mt = Self {
            idx: N,
            state: [Wrapping(0); N],
        };
        mt.reseed(seed);
        mt
    }

    /// Seed with an array of words (`init_by_array`). An empty key is treated as `[0]`.
    #[must_use]
    pub fn with_key(key: &[u32]) -> Self {
        let mut mt = Self {
            idx: N,
            state: [Wrapping(0); N],
        };
        mt.reseed_with_key(if key.is_empty() { &[0] } else { key });
        mt
    }

    /// Seed from an integer split into 32-bit words, least significant first.
    ///
    /// Zero seeds as the key `[0]`; larger values use as many words as they need.
    #[must_use]
    pub fn from_int_seed(seed: u64) -> Self {
        let low = seed as u32;
        let high = (seed >> 32) as u32;
        if high == 0 {
            Self::with_key(&[low])
        } else {
            Self::with_key(&[low, high])
        }
    }

    fn reseed(&mut self, seed: u32) {
        self.idx = N;
        self.state[0] = Wrapping(seed);
        for i in 1..N {
            let prev = self.state[i - 1];
            self.state[i] = Wrapping(1_812_433_253) * (prev ^ (prev >> 30)) + Wrapping(i as u32);
        }
    }

    fn reseed_with_key(&mut self, key: &[u32]) {
        self.reseed(19_650_218);

        let mut i = 1;
        let mut j = 0;
        for _ in 0..N.max(key.len()) {
            let prev = self.state[i - 1];
            self.state[i] = (self.state[i] ^ ((prev ^ (prev >> 30)) * Wrapping(1_664_525)))
                + Wrapping(key[j])
                + Wrapping(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                self.state[0] = self.state[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            let prev = self.state[i - 1];
            self.state[i] = (self.state[i] ^ ((prev ^ (prev >> 30)) * Wrapping(1_566_083_941)))
                - Wrapping(i as u32);
            i += 1;
            if i >= N {
                self.state[0] = self.state[N - 1];
                i = 1;
            }
        }
        self.state[0] = Wrapping(UPPER_MASK);
        self.idx = N;
    }

    fn fill_next_state(&mut self) {
        for k in 0..N {
            let Wrapping(y) = (self.state[k] & Wrapping(UPPER_MASK))
                | (self.state[(k + 1) % N] & Wrapping(LOWER_MASK));
            let mut next = self.state[(k + M) % N] ^ Wrapping(y >> 1);
            if y & 1 != 0 {
                next ^= Wrapping(MATRIX_A);
            }
            self.state[k] = next;
        }
        self.idx = 0;
    }
}

impl Default for Mt19937 {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

impl std::fmt::Debug for Mt19937 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mt19937").field("idx", &self.idx).finish_non_exhaustive()
    }
}

impl RngCore for Mt19937 {
    fn next_u32(&mut self) -> u32 {
        if self.idx >= N {
            self.fill_next_state();
        }
        let Wrapping(x) = self.state[self.idx];
        self.idx += 1;
        temper(x)
    }

    /// Low word first
    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.next_u32());
        let high = u64::from(self.next_u32());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut chunks = dest.chunks_exact_mut(4);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.next_u32().to_le_bytes());
        }
        let remainder = chunks.into_remainder();
        if !remainder.is_empty() {
            let bytes = self.next_u32().to_le_bytes();
            remainder.copy_from_slice(&bytes[..remainder.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mt19937 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::with_key(&[u32::from_le_bytes(seed)])
    }

    /// Same stream as [`Mt19937::from_int_seed`].
    fn seed_from_u64(state: u64) -> Self {
        Self::from_int_seed(state)
    }
}

fn temper(mut x: u32) -> u32 {
    x ^= x >> 11;
    x ^= (x << 7) & 0x9d2c_5680;
    x ^= (x << 15) & 0xefc6_0000;
    x ^= x >> 18;
    x
}
