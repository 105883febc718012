use lrukit::{LruCache, LruOptions};

fn main() {
    let mut cache: LruCache<String> = LruCache::new(LruOptions::new().max(2)).unwrap();

    cache.set("alpha", "first".to_string()).unwrap();
    cache.set("beta", "second".to_string()).unwrap();

    if let Some(value) = cache.get("alpha") {
        println!("hit alpha: {}", value);
    }

    cache.set("gamma", "third".to_string()).unwrap();

    println!("has beta? {}", cache.has("beta"));
    cache.for_each(|key, value| println!("{} => {}", key, value));
}

// Expected output:
// hit alpha: first
// has beta? false
// gamma => third
// alpha => first
//
// Explanation: capacity=2; after get("alpha"), alpha is MRU and beta is LRU.
// Setting gamma evicts beta. for_each walks most recently used first.
