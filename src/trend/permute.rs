use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Source of sample-order permutations for the null distribution.
pub trait Permuter {
    fn permute(&mut self, order: &mut [usize]);
}

pub struct SeededPermuter {
    rng: ChaCha8Rng,
}

impl SeededPermuter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Independent stream per event so results do not depend on scheduling.
    pub fn for_event(seed: u64, event_index: usize) -> Self {
        Self::new(mix(seed, event_index as u64))
    }
}

impl Permuter for SeededPermuter {
    fn permute(&mut self, order: &mut [usize]) {
        order.shuffle(&mut self.rng);
    }
}

/// `nshuffles + 1` orders over `n` positions. Order 0 is the identity
/// (observed data); orders 1..=nshuffles are fresh permutations.
pub fn replicate_orders<P: Permuter + ?Sized>(
    n: usize,
    nshuffles: usize,
    permuter: &mut P,
) -> Vec<Vec<usize>> {
    let identity: Vec<usize> = (0..n).collect();
    let mut orders = Vec::with_capacity(nshuffles + 1);
    orders.push(identity.clone());
    for _ in 0..nshuffles {
        let mut order = identity.clone();
        permuter.permute(&mut order);
        orders.push(order);
    }
    orders
}

// splitmix64 finalizer
fn mix(seed: u64, index: u64) -> u64 {
    let mut z = seed ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
