use crate::models::Candidate;

/// Name prefixes that mark a street segment rather than a business
pub const NOISE_PREFIXES: [&str; 5] = ["Street", "Road", "Avenue", "Boulevard", "Highway"];

/// Default duplicate threshold in decimal degrees (about 11 m)
pub const DEFAULT_PROXIMITY_TOLERANCE: f64 = 0.0001;

/// Per-axis proximity check
///
/// Two coordinates are duplicates only when both the latitude delta and the
/// longitude delta are strictly below `tolerance`. This is intentionally not a
/// Euclidean distance.
#[inline]
pub fn is_duplicate(a: &Candidate, b: &Candidate, tolerance: f64) -> bool {
    (a.coordinate.latitude - b.coordinate.latitude).abs() < tolerance
        && (a.coordinate.longitude - b.coordinate.longitude).abs() < tolerance
}

/// Whether a name looks like a roadway rather than a business
///
/// A deny-listed prefix must start a whitespace-separated word, compared
/// case-insensitively. "5th Avenue Software House" is therefore noise too,
/// a false positive the filter accepts.
pub fn is_noise(name: &str) -> bool {
    name.split_whitespace().any(|word| {
        NOISE_PREFIXES.iter().any(|prefix| {
            word.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
    })
}

/// Insertion-ordered candidate collection without near-duplicates
#[derive(Debug, Clone)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
    tolerance: f64,
}

impl CandidateSet {
    pub fn new(tolerance: f64) -> Self {
        Self {
            candidates: Vec::new(),
            tolerance,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.candidates
    }

    /// Merge incoming candidates, skipping any that duplicate a member
    ///
    /// Incoming candidates are evaluated in order, so a duplicate pair inside
    /// `incoming` keeps the first one. Existing members never move.
    /// Returns how many candidates were appended.
    pub fn merge<I>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = Candidate>,
    {
        let before = self.candidates.len();
        for candidate in incoming {
            let duplicate = self
                .candidates
                .iter()
                .any(|existing| is_duplicate(existing, &candidate, self.tolerance));
            if !duplicate {
                self.candidates.push(candidate);
            }
        }
        self.candidates.len() - before
    }

    /// Drop candidates whose name is roadway noise
    pub fn apply_noise_filter(mut self) -> Self {
        self.candidates.retain(|c| !is_noise(&c.name));
        self
    }

    #[inline]
    pub fn is_saturated(&self, cap: usize) -> bool {
        self.candidates.len() >= cap
    }
}

impl Default for CandidateSet {
    fn default() -> Self {
        Self::new(DEFAULT_PROXIMITY_TOLERANCE)
    }
}
