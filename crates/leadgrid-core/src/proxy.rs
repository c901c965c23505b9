use std::sync::atomic::{AtomicUsize, Ordering};

/// Round-robin selector over a fixed proxy pool.
///
/// One rotator is shared by every request served by a [`crate::ScrapeService`];
/// the cursor advances on each selection no matter which request asked.
#[derive(Debug, Default)]
pub struct ProxyRotator {
    pool: Vec<String>,
    cursor: AtomicUsize,
}

impl ProxyRotator {
    pub fn new(pool: Vec<String>) -> Self {
        Self {
            pool,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Next proxy in rotation, or `None` for an empty pool.
    pub fn next(&self) -> Option<&str> {
        if self.pool.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.pool.len();
        Some(&self.pool[index])
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

/// Parse a comma-separated proxy list, ignoring blank entries.
pub fn parse_pool(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}
