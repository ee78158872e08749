use kira_splicetrend::trend::permute::{Permuter, SeededPermuter, replicate_orders};

struct Reverse;

impl Permuter for Reverse {
    fn permute(&mut self, order: &mut [usize]) {
        order.reverse();
    }
}

#[test]
fn replicate_zero_is_identity() {
    let mut p = SeededPermuter::new(7);
    let orders = replicate_orders(6, 50, &mut p);
    assert_eq!(orders.len(), 51);
    assert_eq!(orders[0], vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn every_replicate_is_a_permutation() {
    let mut p = SeededPermuter::new(11);
    for order in replicate_orders(8, 100, &mut p) {
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..8).collect::<Vec<_>>());
    }
}

#[test]
fn seeded_streams_are_reproducible() {
    let a = replicate_orders(10, 20, &mut SeededPermuter::for_event(42, 3));
    let b = replicate_orders(10, 20, &mut SeededPermuter::for_event(42, 3));
    let c = replicate_orders(10, 20, &mut SeededPermuter::for_event(42, 4));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn injected_permuter_only_touches_replicates() {
    let orders = replicate_orders(3, 2, &mut Reverse);
    assert_eq!(orders, vec![vec![0, 1, 2], vec![2, 1, 0], vec![2, 1, 0]]);
}

#[test]
fn zero_shuffles_yields_observed_only() {
    let orders = replicate_orders(4, 0, &mut SeededPermuter::new(1));
    assert_eq!(orders, vec![vec![0, 1, 2, 3]]);
}
