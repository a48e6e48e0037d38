use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

const PREFIX: &str = "studio"; // Must NOT contain "/" or "-"

/// Unique DOM id for pairing labels with form controls.
pub fn use_random_id_for(element: &str) -> String {
    format!("{element}_{PREFIX}_{}", next_hash())
}

static COUNTER: AtomicUsize = AtomicUsize::new(1);

fn next_hash() -> u64 {
    let mut hasher = DefaultHasher::new();
    COUNTER.fetch_add(1, Ordering::SeqCst).hash(&mut hasher);
    hasher.finish()
}
