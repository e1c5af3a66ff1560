//! Sampler
//!
//! Strategies for choosing which features are split candidates at a node.
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;

// A sampler picks the candidate features for one node.
pub trait Sampler {
    /// Sample from `features`, which are in ascending order, returning the
    /// chosen features in ascending order.
    fn sample(&self, rng: &mut StdRng, features: &[usize]) -> Vec<usize>;
}

/// Every feature is a candidate at every node.
pub struct AllFeatures;

impl Sampler for AllFeatures {
    fn sample(&self, _rng: &mut StdRng, features: &[usize]) -> Vec<usize> {
        features.to_vec()
    }
}

/// `mtry` features drawn uniformly without replacement at each node.
pub struct RandomFeatures {
    mtry: usize,
}

impl RandomFeatures {
    pub fn new(mtry: usize) -> Self {
        RandomFeatures { mtry }
    }
}

impl Sampler for RandomFeatures {
    fn sample(&self, rng: &mut StdRng, features: &[usize]) -> Vec<usize> {
        let mut v: Vec<usize> = features.iter().copied().choose_multiple(rng, self.mtry);
        v.sort_unstable();
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_random_features() {
        let mut rng = StdRng::seed_from_u64(42);
        let features = vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let sampler = RandomFeatures::new(3);
        let chosen = sampler.sample(&mut rng, &features);
        assert_eq!(chosen.len(), 3);
        assert!(chosen.windows(2).all(|w| w[0] < w[1]));
        assert!(chosen.iter().all(|f| features.contains(f)));

        // More than available returns everything.
        let sampler_all = RandomFeatures::new(20);
        assert_eq!(sampler_all.sample(&mut rng, &features), features);
    }

    #[test]
    fn test_random_features_reproducible() {
        let features: Vec<usize> = (0..30).collect();
        let sampler = RandomFeatures::new(5);
        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(sampler.sample(&mut rng1, &features), sampler.sample(&mut rng2, &features));
        }
    }

    #[test]
    fn test_all_features() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(AllFeatures.sample(&mut rng, &[1, 2, 4]), vec![1, 2, 4]);
    }
}
