use crate::model::{GuestId, Wish};
use std::collections::HashMap;

/// Sparse symmetric co-occurrence counts between guests.
///
/// `get(i, j)` is the number of wishes in which `i` and `j` both appear.
/// Pairs are stored once under `(min, max)`; the diagonal is always zero.
#[derive(Clone, Debug, Default)]
pub struct RelationMatrix {
    entries: HashMap<(GuestId, GuestId), u32>,
    // partners[g] = (other guest, weight), for the move proposal and delta sums
    partners: Vec<Vec<(GuestId, u32)>>,
}

#[inline]
fn key(a: GuestId, b: GuestId) -> (GuestId, GuestId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl RelationMatrix {
    /// Every unordered pair of distinct members of every wish gets +1.
    /// Callers must have checked that wish members are `< n_guests`.
    pub fn from_wishes(wishes: &[Wish], n_guests: usize) -> Self {
        let mut entries: HashMap<(GuestId, GuestId), u32> = HashMap::new();
        for wish in wishes {
            let ids = &wish.guest_ids;
            for (x, &a) in ids.iter().enumerate() {
                for &b in &ids[x + 1..] {
                    if a == b {
                        continue;
                    }
                    *entries.entry(key(a, b)).or_insert(0) += 1;
                }
            }
        }

        let mut partners = vec![Vec::new(); n_guests];
        for (&(a, b), &w) in &entries {
            partners[a].push((b, w));
            partners[b].push((a, w));
        }
        // HashMap iteration order is random; keep proposals reproducible.
        for list in &mut partners {
            list.sort_unstable();
        }

        Self { entries, partners }
    }

    #[inline]
    pub fn get(&self, a: GuestId, b: GuestId) -> u32 {
        if a == b {
            return 0;
        }
        self.entries.get(&key(a, b)).copied().unwrap_or(0)
    }

    /// Number of unordered guest pairs with a non-zero weight.
    pub fn n_pairs(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all pair weights, each unordered pair counted once.
    pub fn total_weight(&self) -> u64 {
        self.entries.values().map(|&w| w as u64).sum()
    }

    pub fn partners(&self, g: GuestId) -> &[(GuestId, u32)] {
        &self.partners[g]
    }

    /// Sum of `get(g, k)` over `others`, skipping `g` itself.
    pub fn affinity(&self, g: GuestId, others: &[GuestId]) -> i64 {
        if self.partners[g].is_empty() {
            return 0;
        }
        others
            .iter()
            .filter(|&&k| k != g)
            .map(|&k| self.get(g, k) as i64)
            .sum()
    }
}
