/// Between-group position pairs `(k, l)` for samples laid out as contiguous
/// blocks of the given sizes: `k` lies in an earlier block than `l`.
/// Within-block pairs are never included.
pub fn comparison_pairs(block_sizes: &[usize]) -> Vec<(usize, usize)> {
    let mut bounds = Vec::with_capacity(block_sizes.len());
    let mut lo = 0usize;
    for &n in block_sizes {
        bounds.push((lo, lo + n));
        lo += n;
    }

    let mut pairs = Vec::new();
    for (i, &(lo_i, hi_i)) in bounds.iter().enumerate() {
        for &(lo_j, hi_j) in &bounds[i + 1..] {
            for k in lo_i..hi_i {
                for l in lo_j..hi_j {
                    pairs.push((k, l));
                }
            }
        }
    }
    pairs
}
