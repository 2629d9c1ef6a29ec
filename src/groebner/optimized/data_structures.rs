use crate::poly::Monomial;

/// A pending S-polynomial `S(g_i, g_j)`, `i < j`, keyed by the lcm of the
/// two leading monomials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CriticalPair {
    pub(crate) i: usize,
    pub(crate) j: usize,
    pub(crate) lcm: Monomial,
    pub(crate) degree: u32,
}

impl CriticalPair {
    pub fn new(i: usize, j: usize, lcm: Monomial) -> Self {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        let degree = lcm.degree();
        CriticalPair { i, j, lcm, degree }
    }

    pub fn involves(&self, k: usize) -> bool {
        self.i == k || self.j == k
    }
}

/// Basis under construction together with its pending pairs.
///
/// Elements are never removed from `leads`; an element whose leading
/// monomial became divisible by a newer one is only marked inactive, so
/// pair indices stay valid.
#[derive(Clone, Debug, Default)]
pub struct PairSet {
    pub(crate) leads: Vec<Monomial>,
    pub(crate) active: Vec<bool>,
    pub(crate) pairs: Vec<CriticalPair>,
}

impl PairSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn active_indices(&self) -> Vec<usize> {
        (0..self.leads.len()).filter(|&k| self.active[k]).collect()
    }

    /// Registers a new basis element with leading monomial `lm` and
    /// updates the pair set with the Gebauer-Moller criteria. Returns the
    /// number of basis elements that were deactivated.
    pub fn update(&mut self, lm: Monomial) -> usize {
        let h = self.leads.len();

        // pairs (g, h) for every active g
        let mut candidates: Vec<CriticalPair> = self
            .active_indices()
            .into_iter()
            .map(|g| CriticalPair::new(g, h, self.leads[g].lcm(&lm)))
            .collect();

        // drop a pair whose lcm is a multiple of another new pair's lcm,
        // unless its leading monomials are coprime
        let mut kept: Vec<CriticalPair> = Vec::with_capacity(candidates.len());
        while let Some(p) = candidates.pop() {
            let g = if p.i == h { p.j } else { p.i };
            let coprime = self.leads[g].is_coprime(&lm);
            let dominated = candidates
                .iter()
                .chain(kept.iter())
                .any(|q| q.lcm.divides(&p.lcm));
            if coprime || !dominated {
                kept.push(p);
            }
        }

        // coprime leading monomials: the S-polynomial reduces to zero
        kept.retain(|p| {
            let g = if p.i == h { p.j } else { p.i };
            !self.leads[g].is_coprime(&lm)
        });

        // old pairs made redundant by h
        let leads = &self.leads;
        self.pairs.retain(|p| {
            if !lm.divides(&p.lcm) {
                return true;
            }
            let lcm_ih = leads[p.i].lcm(&lm);
            let lcm_jh = leads[p.j].lcm(&lm);
            lcm_ih == p.lcm || lcm_jh == p.lcm
        });
        self.pairs.extend(kept);

        let mut removed = 0;
        for g in 0..h {
            if self.active[g] && lm.divides(&self.leads[g]) {
                self.active[g] = false;
                removed += 1;
            }
        }

        self.leads.push(lm);
        self.active.push(true);
        removed
    }

    /// Removes and returns every pair of minimal lcm degree.
    pub fn select_batch(&mut self) -> Vec<CriticalPair> {
        let Some(min) = self.pairs.iter().map(|p| p.degree).min() else {
            return Vec::new();
        };
        let (batch, rest): (Vec<_>, Vec<_>) = self.pairs.drain(..).partition(|p| p.degree == min);
        self.pairs = rest;
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coprime_pairs_are_skipped() {
        let mut set = PairSet::new();
        set.update(Monomial::var(0, 2));
        set.update(Monomial::var(1, 3));
        assert!(set.is_empty());
        set.update(Monomial::new(vec![1, 1]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_divisible_leads_are_deactivated() {
        let mut set = PairSet::new();
        set.update(Monomial::new(vec![2, 1]));
        let removed = set.update(Monomial::var(0, 1));
        assert_eq!(removed, 1);
        assert_eq!(set.active_indices(), vec![1]);
    }

    #[test]
    fn test_batch_takes_minimal_degree() {
        let mut set = PairSet::new();
        set.update(Monomial::new(vec![1, 1]));
        set.update(Monomial::new(vec![0, 2]));
        set.update(Monomial::new(vec![3, 0, 1]));
        let batch = set.select_batch();
        assert!(!batch.is_empty());
        let d = batch[0].degree;
        assert!(batch.iter().all(|p| p.degree == d));
        assert!(set.pairs.iter().all(|p| p.degree > d));
    }
}
