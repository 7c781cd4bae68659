use std::sync::Arc;

/// Ordered, read-only list of strategy candidates.
///
/// Candidates are evaluated in registration order, so when two match the
/// same key the one registered first wins.
pub struct StrategyRegistry<S: ?Sized> {
    candidates: Vec<Arc<S>>,
}

impl<S: ?Sized> StrategyRegistry<S> {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    pub fn register(mut self, candidate: Arc<S>) -> Self {
        self.candidates.push(candidate);
        self
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<S>> {
        self.candidates.iter()
    }

    /// First candidate accepted by `predicate`.
    pub fn find<P>(&self, predicate: P) -> Option<&Arc<S>>
    where
        P: Fn(&S) -> bool,
    {
        self.candidates.iter().find(|c| predicate(c.as_ref()))
    }
}

impl<S: ?Sized> Default for StrategyRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> Clone for StrategyRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            candidates: self.candidates.clone(),
        }
    }
}

impl<S: ?Sized> FromIterator<Arc<S>> for StrategyRegistry<S> {
    fn from_iter<I: IntoIterator<Item = Arc<S>>>(iter: I) -> Self {
        Self {
            candidates: iter.into_iter().collect(),
        }
    }
}
