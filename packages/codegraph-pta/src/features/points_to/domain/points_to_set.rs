//! Points-to set representation
//!
//! Sorted `Vec<u32>` of heap-object PAG node ids. Object ids already encode
//! `(allocation site, allocation context)`, so the set needs nothing else.
//! Union reports the newly added elements, which is exactly the difference
//! the solver propagates next.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointsToSet {
    elements: Vec<u32>,
}

impl PointsToSet {
    #[inline]
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    #[inline]
    pub fn singleton(element: u32) -> Self {
        Self {
            elements: vec![element],
        }
    }

    /// Insert one element; returns true if it was absent
    pub fn insert(&mut self, element: u32) -> bool {
        match self.elements.binary_search(&element) {
            Ok(_) => false,
            Err(pos) => {
                self.elements.insert(pos, element);
                true
            }
        }
    }

    #[inline]
    pub fn contains(&self, element: u32) -> bool {
        self.elements.binary_search(&element).is_ok()
    }

    /// Merge `other` into `self`; returns the elements that were new
    pub fn union_diff(&mut self, other: &PointsToSet) -> PointsToSet {
        if other.is_empty() {
            return PointsToSet::new();
        }

        let mut added = Vec::new();
        let mut merged = Vec::with_capacity(self.elements.len() + other.elements.len());
        let (mut i, mut j) = (0, 0);
        let (a, b) = (&self.elements, &other.elements);

        while i < a.len() && j < b.len() {
            if a[i] < b[j] {
                merged.push(a[i]);
                i += 1;
            } else if a[i] > b[j] {
                merged.push(b[j]);
                added.push(b[j]);
                j += 1;
            } else {
                merged.push(a[i]);
                i += 1;
                j += 1;
            }
        }
        merged.extend_from_slice(&a[i..]);
        added.extend_from_slice(&b[j..]);
        merged.extend_from_slice(&b[j..]);

        if !added.is_empty() {
            self.elements = merged;
        }
        PointsToSet { elements: added }
    }

    /// Whether the two sets share an element
    pub fn intersects(&self, other: &PointsToSet) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.elements.len() && j < other.elements.len() {
            match self.elements[i].cmp(&other.elements[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }

    /// Every element of `self` is in `other`
    pub fn is_subset(&self, other: &PointsToSet) -> bool {
        self.elements.iter().all(|e| other.contains(*e))
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.elements.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.elements
    }
}

impl FromIterator<u32> for PointsToSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut elements: Vec<u32> = iter.into_iter().collect();
        elements.sort_unstable();
        elements.dedup();
        Self { elements }
    }
}
