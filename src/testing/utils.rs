use crate::cache::DistributedCache;
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashSet};

/// Key -> owner name, for comparing resolution before and after a change.
pub(crate) type Placement = BTreeMap<String, String>;

pub(crate) fn placement<'a, V: Clone>(
    cache: &DistributedCache<V>,
    keys: impl IntoIterator<Item = &'a String>,
) -> Placement {
    keys.into_iter()
        .filter_map(|key| cache.owner_of(key).map(|owner| (key.clone(), owner)))
        .collect()
}

/// `prefix0`, `prefix1`, ... up to `count` keys.
pub(crate) fn sequential_keys(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}{}", prefix, i)).collect()
}

/// `count` distinct random keys from a seeded generator.
pub(crate) fn random_keys(seed: u64, count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::with_capacity(count);
    let mut keys = Vec::with_capacity(count);

    while keys.len() < count {
        let len = rng.random_range(1..24);
        let key: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_keys_are_seeded_and_distinct() {
        let a = random_keys(7, 200);
        let b = random_keys(7, 200);
        assert_eq!(a, b);
        assert_eq!(a.iter().collect::<HashSet<_>>().len(), 200);
        assert_ne!(a, random_keys(8, 200));
    }

    #[test]
    fn test_sequential_keys() {
        assert_eq!(sequential_keys("key", 3), vec!["key0", "key1", "key2"]);
    }
}
