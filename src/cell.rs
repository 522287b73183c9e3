//! Value holder for a resolved field.

use crate::codec::StandardDecode;
use crate::descriptor::FieldDescriptor;
use crate::engine::resolve;
use crate::wire::WireMap;
use serde::Serialize;
use std::ops::Deref;

/// Holds the value of one field of a record.
///
/// A cell only exists once its value is known: it is built either by
/// resolving wire data ([`FieldCell::resolve`]) or from an explicit value.
/// There is no empty state to observe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FieldCell<V> {
    value: V,
}

impl<V> FieldCell<V> {
    pub fn new(value: V) -> Self {
        Self { value }
    }

    /// Resolve the field described by `descriptor` from `record`.
    pub fn resolve<D>(descriptor: &FieldDescriptor<V>, record: &WireMap, decode: &D) -> Self
    where
        V: 'static,
        D: StandardDecode<V> + ?Sized,
    {
        Self::new(resolve(descriptor, record, decode))
    }

    pub fn get(&self) -> &V {
        &self.value
    }

    pub fn get_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn set(&mut self, value: V) {
        self.value = value;
    }

    /// Store `value`, returning the previous one.
    pub fn replace(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    pub fn into_inner(self) -> V {
        self.value
    }
}

impl<V> Deref for FieldCell<V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.value
    }
}

impl<V> AsRef<V> for FieldCell<V> {
    fn as_ref(&self) -> &V {
        &self.value
    }
}

impl<V> From<V> for FieldCell<V> {
    fn from(value: V) -> Self {
        Self::new(value)
    }
}
