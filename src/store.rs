use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::metadata::Marker;

/// What `add` does when the candidate duplicates an existing marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    Skip,
    Overwrite,
    /// Leave the collection untouched and hand the decision back.
    DeferToCaller,
}

/// Caller decision for a deferred duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Overwrite,
    Skip,
}

/// A duplicate awaiting a caller decision; resolve it with [`MarkerStore::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDuplicate {
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added,
    Overwritten,
    SkippedDuplicate,
    Pending(PendingDuplicate),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub added: usize,
    pub overwritten: usize,
    pub skipped: Vec<String>,
    pub pending: Vec<PendingDuplicate>,
}

impl BatchOutcome {
    fn record(&mut self, label: &str, outcome: AddOutcome) {
        match outcome {
            AddOutcome::Added => self.added += 1,
            AddOutcome::Overwritten => self.overwritten += 1,
            AddOutcome::SkippedDuplicate => self.skipped.push(label.to_string()),
            AddOutcome::Pending(pending) => self.pending.push(pending),
        }
    }

    pub fn changed(&self) -> bool {
        self.added + self.overwritten > 0
    }
}

/// Ordered marker collection with linear undo/redo.
///
/// Every operation that changes the sequence first pushes a full copy of
/// the previous sequence onto the undo stack and clears the redo stack.
/// Operations that turn out to be no-ops leave the history alone.
/// Label lookups always hit the first matching entry.
#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    markers: Vec<Marker>,
    undo_stack: Vec<Vec<Marker>>,
    redo_stack: Vec<Vec<Marker>>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `markers` and an empty history.
    pub fn from_markers(markers: Vec<Marker>) -> Self {
        Self {
            markers,
            ..Self::default()
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn find(&self, label: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.label == label)
    }

    pub fn is_duplicate(&self, candidate: &Marker) -> bool {
        self.markers.iter().any(|m| m.is_duplicate_of(candidate))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn checkpoint(&mut self) {
        self.undo_stack.push(self.markers.clone());
        self.redo_stack.clear();
    }

    /// Add a marker, applying `policy` if it duplicates an existing one.
    pub fn add(&mut self, marker: Marker, policy: DuplicatePolicy) -> AddOutcome {
        if !self.is_duplicate(&marker) {
            self.checkpoint();
            self.push(marker)
        } else {
            match policy {
                DuplicatePolicy::Overwrite => self.overwrite(marker),
                policy => Self::decline(marker, policy),
            }
        }
    }

    /// Remove the first marker carrying the candidate's label, then append the candidate.
    pub fn overwrite(&mut self, marker: Marker) -> AddOutcome {
        self.checkpoint();
        self.replace(marker)
    }

    pub fn resolve(&mut self, pending: PendingDuplicate, resolution: Resolution) -> AddOutcome {
        match resolution {
            Resolution::Overwrite => self.overwrite(pending.marker),
            Resolution::Skip => {
                log::debug!("Skipping duplicate marker: {}", pending.marker.label);
                AddOutcome::SkippedDuplicate
            }
        }
    }

    /// Add many markers as one undoable step.
    pub fn add_batch<I>(&mut self, markers: I, policy: DuplicatePolicy) -> BatchOutcome
    where
        I: IntoIterator<Item = Marker>,
    {
        let before = self.markers.clone();
        let mut outcome = BatchOutcome::default();

        for marker in markers {
            let label = marker.label.clone();
            let result = if !self.is_duplicate(&marker) {
                self.push(marker)
            } else if policy == DuplicatePolicy::Overwrite {
                self.replace(marker)
            } else {
                Self::decline(marker, policy)
            };
            outcome.record(&label, result);
        }

        if outcome.changed() {
            self.undo_stack.push(before);
            self.redo_stack.clear();
        }
        log::debug!(
            "Batch add: {} added, {} overwritten, {} skipped, {} pending",
            outcome.added,
            outcome.overwritten,
            outcome.skipped.len(),
            outcome.pending.len()
        );
        outcome
    }

    fn push(&mut self, marker: Marker) -> AddOutcome {
        log::debug!("Adding marker: {}", marker.label);
        self.markers.push(marker);
        AddOutcome::Added
    }

    fn replace(&mut self, marker: Marker) -> AddOutcome {
        log::debug!("Overwriting marker: {}", marker.label);
        if let Some(index) = self.position(&marker.label) {
            self.markers.remove(index);
        }
        self.markers.push(marker);
        AddOutcome::Overwritten
    }

    fn decline(marker: Marker, policy: DuplicatePolicy) -> AddOutcome {
        log::debug!("Duplicate marker detected: {}", marker.label);
        match policy {
            DuplicatePolicy::DeferToCaller => AddOutcome::Pending(PendingDuplicate { marker }),
            _ => AddOutcome::SkippedDuplicate,
        }
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.markers.iter().position(|m| m.label == label)
    }

    /// Remove the first marker with `label`. `None` when there is none.
    pub fn remove(&mut self, label: &str) -> Option<Marker> {
        let index = self.position(label)?;
        self.checkpoint();
        log::debug!("Removing marker: {}", label);
        Some(self.markers.remove(index))
    }

    /// Relabel the first marker with `old_label`, keeping every other field.
    pub fn rename(&mut self, old_label: &str, new_label: &str) -> bool {
        match self.position(old_label) {
            Some(index) => {
                self.checkpoint();
                log::debug!("Renaming marker '{}' to '{}'", old_label, new_label);
                self.markers[index].label = new_label.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove everything. Returns how many markers were dropped.
    pub fn clear(&mut self) -> usize {
        if self.markers.is_empty() {
            return 0;
        }
        self.checkpoint();
        let count = self.markers.len();
        self.markers.clear();
        count
    }

    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.markers, previous);
                self.redo_stack.push(current);
                true
            }
            None => false,
        }
    }

    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.markers, next);
                self.undo_stack.push(current);
                true
            }
            None => false,
        }
    }
}

/// Shared access to one store. The lock makes snapshot-then-mutate a
/// single step and gives readers a consistent sequence.
#[derive(Debug, Clone, Default)]
pub struct StoreHandle {
    inner: Arc<Mutex<MarkerStore>>,
}

impl StoreHandle {
    pub fn new(store: MarkerStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MarkerStore) -> R) -> Result<R, AppError> {
        let mut store = self
            .inner
            .lock()
            .map_err(|e| AppError::Generic(format!("marker store lock poisoned: {}", e)))?;
        Ok(f(&mut store))
    }

    /// Copy of the current sequence.
    pub fn snapshot(&self) -> Result<Vec<Marker>, AppError> {
        self.with(|store| store.markers().to_vec())
    }
}
