use std::fmt;

/// Registry key for an ad-hoc link: the unordered pair of endpoint names.
///
/// `LinkKey::new("a", "b") == LinkKey::new("b", "a")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey {
    low: String,
    high: String,
}

impl LinkKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low: low.to_string(),
            high: high.to_string(),
        }
    }

    pub fn names(&self) -> (&str, &str) {
        (&self.low, &self.high)
    }

    pub fn touches(&self, name: &str) -> bool {
        self.low == name || self.high == name
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.low, self.high)
    }
}
