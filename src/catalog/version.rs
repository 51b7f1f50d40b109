use std::cmp::Ordering;

/// A `CFBundleShortVersionString` parsed for ordering checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleVersion {
    pub parsed: VersionType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionType {
    Semantic(semver::Version),
    Numeric(Vec<u64>),
    Unknown,
}

impl BundleVersion {
    pub fn parse(version: &str) -> Self {
        let trimmed = version.trim();
        let parsed = if let Ok(v) = semver::Version::parse(trimmed) {
            VersionType::Semantic(v)
        } else if let Some(numeric) = Self::parse_numeric(trimmed) {
            VersionType::Numeric(numeric)
        } else {
            VersionType::Unknown
        };

        BundleVersion { parsed }
    }

    fn parse_numeric(version: &str) -> Option<Vec<u64>> {
        if version.is_empty() {
            return None;
        }

        version
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect()
    }

    /// Ordering against `other`, or `None` when either label is not a recognisable version.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (&self.parsed, &other.parsed) {
            (VersionType::Semantic(a), VersionType::Semantic(b)) => Some(a.cmp(b)),
            (VersionType::Unknown, _) | (_, VersionType::Unknown) => None,
            _ => Some(compare_segments(&self.segments(), &other.segments())),
        }
    }

    fn segments(&self) -> Vec<u64> {
        match &self.parsed {
            VersionType::Semantic(v) => vec![v.major, v.minor, v.patch],
            VersionType::Numeric(parts) => parts.clone(),
            VersionType::Unknown => Vec::new(),
        }
    }
}

// "1.2" and "1.2.0" compare equal.
fn compare_segments(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        match av.cmp(&bv) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Check if version `candidate` is older than `reference`; unparseable labels are never older.
pub fn is_older(candidate: &str, reference: &str) -> bool {
    BundleVersion::parse(candidate).compare(&BundleVersion::parse(reference)) == Some(Ordering::Less)
}
