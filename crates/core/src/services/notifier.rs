use uuid::Uuid;

/// Handle returned by `Notifier::subscribe`; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

type Observer<T> = Box<dyn FnMut(T) + Send>;

/// Synchronous publish/subscribe over values of type `T`.
///
/// `publish` hands every observer its own clone of the value, in
/// subscription order, before returning. Unsubscribing drops the observer
/// closure, so nothing it captured outlives the subscription.
pub struct Notifier<T: Clone> {
    observers: Vec<(SubscriptionId, Observer<T>)>,
}

impl<T: Clone> Notifier<T> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(T) + Send + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.observers.push((id, Box::new(observer)));
        tracing::debug!(subscription = %id, observers = self.observers.len(), "observer subscribed");
        id
    }

    /// Remove an observer. Returns `false` if `id` was not (or no longer) subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        let removed = self.observers.len() != before;
        if removed {
            tracing::debug!(subscription = %id, observers = self.observers.len(), "observer unsubscribed");
        }
        removed
    }

    pub fn publish(&mut self, value: &T) {
        for (_, observer) in &mut self.observers {
            observer(value.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<T: Clone> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> std::fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .finish()
    }
}
