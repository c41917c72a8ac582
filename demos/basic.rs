//! Basic example of using the ring cache.

use ringcache::{CacheConfig, DistributedCache, Owner};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("ringcache=debug,info")
        .init();

    let owners = ["node1", "node2", "node3"]
        .into_iter()
        .map(Owner::new)
        .collect::<ringcache::Result<Vec<_>>>()?;
    let cache: DistributedCache<String> = DistributedCache::with_owners(CacheConfig::new(), owners)?;

    let keys = ["key1", "key2", "key3"];
    for (i, key) in keys.iter().enumerate() {
        cache.set(*key, format!("value{}", i + 1))?;
    }

    for key in keys {
        println!("{}: {:?}", key, cache.get(key));
    }

    let outcome = cache.add_owner(Owner::new("node4")?);
    println!("\nAdded node4: {:?}", outcome);
    print_placement(&cache, &keys);

    let outcome = cache.remove_owner("node1");
    println!("\nRemoved node1: {:?}", outcome);
    print_placement(&cache, &keys);

    println!("\nOwners: {:?}", cache.owners());
    println!("Distribution: {:?}", cache.distribution());

    Ok(())
}

fn print_placement(cache: &DistributedCache<String>, keys: &[&str]) {
    for key in keys {
        println!(
            "{} is now on node: {}",
            key,
            cache.owner_of(key).unwrap_or_default()
        );
    }
}
