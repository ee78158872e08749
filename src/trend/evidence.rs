/// PSI estimates and pairwise Bayes factors for one event, indexed by
/// sample position in block order.
#[derive(Debug, Clone)]
pub struct PairwiseEvidence {
    n: usize,
    isoforms: usize,
    psi: Vec<Vec<f64>>,
    // n x n, symmetric; None when no comparison was recorded for the pair.
    bf: Vec<Option<Vec<f64>>>,
}

impl PairwiseEvidence {
    pub fn new(psi: Vec<Vec<f64>>, isoforms: usize) -> Self {
        let n = psi.len();
        Self {
            n,
            isoforms,
            psi,
            bf: vec![None; n * n],
        }
    }

    pub fn n_samples(&self) -> usize {
        self.n
    }

    pub fn isoforms(&self) -> usize {
        self.isoforms
    }

    pub fn psi(&self, sample: usize, iso: usize) -> f64 {
        self.psi[sample][iso]
    }

    pub fn set_bf(&mut self, a: usize, b: usize, values: Vec<f64>) {
        self.bf[a * self.n + b] = Some(values.clone());
        self.bf[b * self.n + a] = Some(values);
    }

    pub fn bf(&self, a: usize, b: usize, iso: usize) -> Option<f64> {
        self.bf[a * self.n + b]
            .as_ref()
            .and_then(|v| v.get(iso).copied())
    }

    /// sign(psi_b - psi_a) when the pair's Bayes factor reaches `min_bf`, else 0.
    pub fn sign(&self, a: usize, b: usize, iso: usize, min_bf: f64) -> i64 {
        match self.bf(a, b, iso) {
            Some(bf) if bf >= min_bf => {
                let d = self.psi[b][iso] - self.psi[a][iso];
                if d > 0.0 {
                    1
                } else if d < 0.0 {
                    -1
                } else {
                    0
                }
            }
            _ => 0,
        }
    }

    /// Sign sum over the comparison positions after placing sample
    /// `order[p]` at position `p`.
    pub fn sign_sum(
        &self,
        order: &[usize],
        pairs: &[(usize, usize)],
        iso: usize,
        min_bf: f64,
    ) -> i64 {
        pairs
            .iter()
            .map(|&(k, l)| self.sign(order[k], order[l], iso, min_bf))
            .sum()
    }
}
