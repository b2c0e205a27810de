//! Value holders with synchronous change notification.

use std::fmt;

/// Handle returned by [`Observable::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Callback<T> = Box<dyn FnMut(&T)>;

/// A value that calls its subscribers on every [`set`](Self::set).
///
/// Callbacks run on the setter's stack, in subscription order.
pub struct Observable<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(Subscription, Callback<T>)>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        for (_, cb) in self.subscribers.iter_mut() {
            cb(&self.value);
        }
    }

    /// Set only if the value changed.
    pub fn set_if_changed(&mut self, value: T) -> bool
    where
        T: PartialEq,
    {
        if self.value == value {
            return false;
        }
        self.set(value);
        true
    }

    pub fn subscribe(&mut self, f: impl FnMut(&T) + 'static) -> Subscription {
        let id = Subscription(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn notifies_in_order_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut obs = Observable::new(0);

        let s = Rc::clone(&seen);
        let a = obs.subscribe(move |v| s.borrow_mut().push(("a", *v)));
        let s = Rc::clone(&seen);
        obs.subscribe(move |v| s.borrow_mut().push(("b", *v)));

        obs.set(1);
        assert!(obs.unsubscribe(a));
        assert!(!obs.unsubscribe(a));
        obs.set(2);

        assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1), ("b", 2)]);
        assert_eq!(*obs.get(), 2);
        assert_eq!(obs.subscriber_count(), 1);
    }

    #[test]
    fn set_if_changed_skips_equal() {
        let count = Rc::new(RefCell::new(0));
        let mut obs = Observable::new(String::from("x"));
        let c = Rc::clone(&count);
        obs.subscribe(move |_| *c.borrow_mut() += 1);
        assert!(!obs.set_if_changed("x".into()));
        assert!(obs.set_if_changed("y".into()));
        assert_eq!(*count.borrow(), 1);
    }
}
