//! Deferred construction of array-typed slots.

use log::debug;

use crate::destination::{Destination, SlotKey};
use crate::types::Type;
use crate::value::Value;

#[derive(Debug)]
struct ArraySlot {
    key: SlotKey,
    component: Type,
    values: Vec<Value>,
}

/// Values collected for the array slots of one element.
///
/// The number of items in an array is only known once the element's last
/// child has been read, so items are collected here and written out as
/// fixed-length arrays when the element ends.
#[derive(Debug, Default)]
pub struct ArrayBuffer {
    slots: Vec<ArraySlot>,
}

impl ArrayBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of distinct slots collected.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Append an item to the array for `key`.
    pub fn put(&mut self, key: SlotKey, component: &Type, value: Value) {
        match self.slots.iter_mut().find(|slot| slot.key == key) {
            Some(slot) => slot.values.push(value),
            None => self.slots.push(ArraySlot {
                key,
                component: component.clone(),
                values: vec![value],
            }),
        }
    }

    /// Assign every collected array to `destination`, in document order.
    pub fn materialize_all(self, destination: &mut Destination<'_>) {
        for slot in self.slots {
            debug!(
                "materializing [{}; {}] into {:?}",
                slot.component,
                slot.values.len(),
                slot.key
            );
            destination.set(&slot.key, Value::Array(slot.values.into_boxed_slice()));
        }
    }
}
