#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

/// Installs `env_logger` once per test binary so `RUST_LOG=trace` shows the owners' events.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A value that counts how many times it has been dropped.
#[derive(Debug)]
pub struct DropCounter<T> {
    drop_count: Rc<Cell<usize>>,
    value: T,
}

/// Observes the drops of every `DropCounter` created from it.
#[derive(Clone, Debug)]
pub struct DropCounterHandle(Rc<Cell<usize>>);

impl<T> DropCounter<T> {
    pub fn new(value: T) -> (Self, DropCounterHandle) {
        let drop_count = Rc::new(Cell::new(0));
        (
            Self {
                drop_count: drop_count.clone(),
                value,
            },
            DropCounterHandle(drop_count),
        )
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl DropCounterHandle {
    pub fn count(&self) -> usize {
        self.0.get()
    }

    /// Creates another counter reporting to this handle.
    pub fn counter<T>(&self, value: T) -> DropCounter<T> {
        DropCounter {
            drop_count: self.0.clone(),
            value,
        }
    }
}

impl<T> Drop for DropCounter<T> {
    fn drop(&mut self) {
        self.drop_count.set(self.drop_count.get() + 1);
    }
}
