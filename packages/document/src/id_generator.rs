use crc32fast::Hasher;

/// Seed derived from a document key using CRC32
pub fn document_seed(key: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for structural nodes
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(key: &str) -> Self {
        Self {
            seed: document_seed(key),
            count: 0,
        }
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Highest sequence number issued or reserved so far
    pub fn issued(&self) -> u64 {
        self.count
    }

    /// Never issue `id` again.
    ///
    /// Ids from another seed can never collide with ours and are ignored.
    /// For one of ours, the counter moves past its sequence number.
    pub fn reserve(&mut self, id: &str) {
        if let Some(n) = self.sequence_of(id) {
            self.count = self.count.max(n);
        }
    }

    fn sequence_of(&self, id: &str) -> Option<u64> {
        id.strip_prefix(self.seed.as_str())?
            .strip_prefix('-')?
            .parse()
            .ok()
    }
}
