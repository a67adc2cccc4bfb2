//! Scenario-scoped key/value store shared by hooks and steps.
//!
//! Keys may be any comparable value, not only strings: two keys are equal when
//! they have the same type and compare equal. Values are stored behind `Arc`,
//! so cloning a [`Context`] is cheap and yields an independent map. Inserting
//! or removing in a clone never affects the original.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use hashbrown::{Equivalent, HashMap};
use thiserror::Error;

/// Types usable as context keys.
///
/// Implemented for every `Eq + Hash + Clone + Debug + Send + Sync + 'static`
/// type.
pub trait ContextKey: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

impl<T: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static> ContextKey for T {}

trait AnyKey: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_key(&self, other: &dyn AnyKey) -> bool;
    fn hash_key(&self, state: &mut dyn Hasher);
    fn clone_key(&self) -> Box<dyn AnyKey>;
    fn debug_key(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<K: ContextKey> AnyKey for K {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_key(&self, other: &dyn AnyKey) -> bool {
        other.as_any().downcast_ref::<K>().is_some_and(|other| other == self)
    }

    fn hash_key(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<K>().hash(&mut state);
        self.hash(&mut state);
    }

    fn clone_key(&self) -> Box<dyn AnyKey> {
        Box::new(self.clone())
    }

    fn debug_key(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

struct Key(Box<dyn AnyKey>);

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_key(other.0.as_ref())
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash_key(state);
    }
}

impl Clone for Key {
    fn clone(&self) -> Self {
        Self(self.0.clone_key())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.debug_key(f)
    }
}

// Borrowed lookup key so reads never allocate.
struct KeyRef<'a>(&'a dyn AnyKey);

impl Hash for KeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash_key(state);
    }
}

impl Equivalent<Key> for KeyRef<'_> {
    fn equivalent(&self, key: &Key) -> bool {
        self.0.eq_key(key.0.as_ref())
    }
}

/// Errors returned by [`Context::try_get`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ContextError {
    /// No value is stored under the key.
    #[error("the key {key} doesn't exist")]
    Missing {
        /// Debug rendering of the key.
        key: String,
    },
    /// A value is stored under the key but has another type.
    #[error("the value stored under {key} is not a {expected}")]
    TypeMismatch {
        /// Debug rendering of the key.
        key: String,
        /// Name of the requested type.
        expected: &'static str,
    },
}

/// Scenario-scoped key/value store.
///
/// # Examples
/// ```
/// use stepwise::Context;
///
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// struct Basket;
///
/// let mut ctx = Context::new();
/// ctx.set("count", 3_i64);
/// ctx.set(Basket, vec!["apple"]);
///
/// let copy = ctx.clone();
/// ctx.set("count", 4_i64);
///
/// assert_eq!(ctx.get::<_, i64>(&"count"), Some(&4));
/// assert_eq!(copy.get::<_, i64>(&"count"), Some(&3));
/// assert_eq!(copy.get::<_, Vec<&str>>(&Basket).map(Vec::len), Some(1));
/// ```
#[derive(Clone, Default)]
pub struct Context {
    values: HashMap<Key, Arc<dyn Any + Send + Sync>>,
}

impl Context {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set<K: ContextKey, V: Any + Send + Sync>(&mut self, key: K, value: V) {
        self.values.insert(Key(Box::new(key)), Arc::new(value));
    }

    /// Fetch the value stored under `key` if it has type `V`.
    #[must_use]
    pub fn get<K: ContextKey, V: Any>(&self, key: &K) -> Option<&V> {
        self.lookup(key)?.downcast_ref::<V>()
    }

    /// Fetch the value stored under `key`, explaining why it is unavailable.
    ///
    /// # Errors
    /// Returns [`ContextError::Missing`] when nothing is stored under `key`
    /// and [`ContextError::TypeMismatch`] when the value is not a `V`.
    pub fn try_get<K: ContextKey, V: Any>(&self, key: &K) -> Result<&V, ContextError> {
        let value = self.lookup(key).ok_or_else(|| ContextError::Missing {
            key: format!("{key:?}"),
        })?;
        value
            .downcast_ref::<V>()
            .ok_or_else(|| ContextError::TypeMismatch {
                key: format!("{key:?}"),
                expected: type_name::<V>(),
            })
    }

    /// Whether a value is stored under `key`.
    #[must_use]
    pub fn has<K: ContextKey>(&self, key: &K) -> bool {
        self.lookup(key).is_some()
    }

    /// Remove the value stored under `key`. Returns whether one was present.
    pub fn remove<K: ContextKey>(&mut self, key: &K) -> bool {
        self.values.remove(&KeyRef(key)).is_some()
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn lookup<K: ContextKey>(&self, key: &K) -> Option<&(dyn Any + Send + Sync)> {
        self.values.get(&KeyRef(key)).map(AsRef::as_ref)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}
