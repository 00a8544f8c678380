// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeSet;

/// What a reconciliation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDelta<T: Ord> {
    /// Entries that were missing and got added.
    pub added: BTreeSet<T>,
    /// Entries that were absent from the target and got removed.
    pub removed: BTreeSet<T>,
}

impl<T: Ord> SetDelta<T> {
    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Brings `current` to `target`: adds what is missing, removes what is absent.
///
/// Entries present on both sides are left untouched.
pub fn reconcile<T: Ord + Clone>(current: &mut BTreeSet<T>, target: &BTreeSet<T>) -> SetDelta<T> {
    let removed: BTreeSet<T> = current.difference(target).cloned().collect();
    let added: BTreeSet<T> = target.difference(current).cloned().collect();

    current.retain(|entry| !removed.contains(entry));
    current.extend(added.iter().cloned());

    SetDelta { added, removed }
}
