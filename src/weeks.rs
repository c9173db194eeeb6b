
//! Compact representation of a subset of the semester's weeks.
//!
//! Week numbers are 1-based and bounded by the semester length
//! (`weeks_total`). The canonical runtime shape is a fixed-size bitmask, so
//! the disjointness test between two events costs a handful of word
//! operations regardless of semester length. Disjointness and intersection
//! are the only operations the conflict checker needs; everything else here
//! exists for validation and for the solution document.

const WORD_BITS: u32 = 64;

/// Bitmask over the weeks `1..=weeks_total` of one semester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekSet {
    weeks_total: u32,
    words: Vec<u64>,
}

impl WeekSet {
    /// An empty set over a semester of `weeks_total` weeks.
    pub fn empty(weeks_total: u32) -> WeekSet {
        let num_words = ((weeks_total + WORD_BITS - 1) / WORD_BITS) as usize;
        WeekSet {
            weeks_total,
            words: vec![0; num_words.max(1)],
        }
    }

    /// The full range `1..=weeks_total`.
    pub fn all(weeks_total: u32) -> WeekSet {
        let mut set = WeekSet::empty(weeks_total);
        for week in 1..=weeks_total {
            set.insert(week);
        }
        set
    }

    /// Build a set from an explicit week enumeration. Returns the first week
    /// outside `1..=weeks_total` as the error value.
    pub fn from_list(weeks_total: u32, weeks: &[u32]) -> Result<WeekSet, u32> {
        let mut set = WeekSet::empty(weeks_total);
        for &week in weeks {
            if !set.insert(week) {
                return Err(week);
            }
        }
        Ok(set)
    }

    pub fn weeks_total(&self) -> u32 {
        self.weeks_total
    }

    /// Add a week to the set. Returns false (and leaves the set unchanged) if
    /// the week is outside `1..=weeks_total`.
    pub fn insert(&mut self, week: u32) -> bool {
        if week < 1 || week > self.weeks_total {
            return false;
        }
        let bit = week - 1;
        self.words[(bit / WORD_BITS) as usize] |= 1u64 << (bit % WORD_BITS);
        true
    }

    pub fn contains(&self, week: u32) -> bool {
        if week < 1 || week > self.weeks_total {
            return false;
        }
        let bit = week - 1;
        self.words[(bit / WORD_BITS) as usize] & (1u64 << (bit % WORD_BITS)) != 0
    }

    /// True iff the two sets share at least one week. Two events may share a
    /// (timeslot, room) pair iff this returns false for their week sets.
    pub fn intersects(&self, other: &WeekSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    pub fn union(&self, other: &WeekSet) -> WeekSet {
        debug_assert_eq!(self.weeks_total, other.weeks_total);
        let mut result = self.clone();
        for (word, other_word) in result.words.iter_mut().zip(other.words.iter()) {
            *word |= other_word;
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Number of weeks in the set.
    pub fn len(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// The contained weeks in ascending order.
    pub fn to_sorted_list(&self) -> Vec<u32> {
        (1..=self.weeks_total)
            .filter(|week| self.contains(*week))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::WeekSet;

    #[test]
    fn test_all_and_empty() {
        let all = WeekSet::all(16);
        assert_eq!(all.len(), 16);
        assert!(all.contains(1));
        assert!(all.contains(16));
        assert!(!all.contains(0));
        assert!(!all.contains(17));

        let empty = WeekSet::empty(16);
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
        assert!(!empty.contains(1));
    }

    #[test]
    fn test_from_list_roundtrip() {
        let set = WeekSet::from_list(16, &[3, 1, 9, 3]).unwrap();
        assert_eq!(set.to_sorted_list(), vec![1, 3, 9]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_from_list_out_of_range() {
        assert_eq!(WeekSet::from_list(16, &[1, 17]), Err(17));
        assert_eq!(WeekSet::from_list(16, &[0]), Err(0));
    }

    #[test]
    fn test_intersects() {
        let first_half = WeekSet::from_list(16, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let second_half = WeekSet::from_list(16, &[9, 10, 11, 12, 13, 14, 15, 16]).unwrap();
        let overlapping = WeekSet::from_list(16, &[8, 9]).unwrap();

        assert!(!first_half.intersects(&second_half));
        assert!(!second_half.intersects(&first_half));
        assert!(first_half.intersects(&overlapping));
        assert!(second_half.intersects(&overlapping));
        assert!(!WeekSet::empty(16).intersects(&first_half));
    }

    #[test]
    fn test_union() {
        let a = WeekSet::from_list(16, &[1, 2]).unwrap();
        let b = WeekSet::from_list(16, &[2, 5]).unwrap();
        assert_eq!(a.union(&b).to_sorted_list(), vec![1, 2, 5]);
    }

    #[test]
    fn test_single_week_semester() {
        // With weeks_total = 1 every "all" set is {1}, so any two such sets
        // intersect and conflicts degenerate to plain same-slot collisions.
        let a = WeekSet::all(1);
        let b = WeekSet::all(1);
        assert_eq!(a.to_sorted_list(), vec![1]);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_long_semester_spans_multiple_words() {
        let set = WeekSet::from_list(130, &[1, 64, 65, 128, 130]).unwrap();
        assert_eq!(set.to_sorted_list(), vec![1, 64, 65, 128, 130]);
        let other = WeekSet::from_list(130, &[129]).unwrap();
        assert!(!set.intersects(&other));
        assert!(set.intersects(&WeekSet::from_list(130, &[128]).unwrap()));
    }
}
