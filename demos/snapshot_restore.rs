use lrukit::{DumpEntry, LruCache, LruOptions};

fn main() {
    let mut cache = LruCache::new(LruOptions::new().max(3)).unwrap();
    for (key, value) in [("A", 1), ("B", 2), ("C", 3)] {
        cache.set(key, value).unwrap();
    }
    cache.get("A");
    cache.set("D", 4).unwrap();

    let json = serde_json::to_string_pretty(&cache.dump()).unwrap();
    println!("{}", json);

    let records: Vec<DumpEntry<i32>> = serde_json::from_str(&json).unwrap();
    let mut restored = LruCache::new(LruOptions::new().max(2)).unwrap();
    restored.load(records).unwrap();

    let keys: Vec<_> = restored.keys().collect();
    println!("restored into max=2: {:?}", keys);
}

// Expected output (JSON abbreviated):
// [ {"key": "D", "value": 4}, {"key": "A", "value": 1}, {"key": "C", "value": 3} ]
// restored into max=2: ["D", "A"]
//
// Explanation: the dump is most recently used first. Loading replays it
// oldest first, so the smaller cache keeps the two most recent entries.
