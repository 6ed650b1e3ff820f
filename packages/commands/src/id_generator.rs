use crc32fast::Hasher;

/// Stable short seed for a piece of source text (CRC32, lowercase hex)
pub fn content_seed(content: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content.as_bytes());
    format!("{:08x}", hasher.finalize())
}

/// Sequential ID generator for commands and client-side blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Seed derived from `prefix` and a checksum of `content`
    pub fn from_content(prefix: &str, content: &str) -> Self {
        Self::new(format!("{}-{}", prefix, content_seed(content)))
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u32 {
        self.count
    }
}
