//! Deferred callback queue
//!
//! Callbacks added while the queue is idle are stored, once per callable,
//! until [`Que::flush`] runs them in insertion order. Flushing switches the
//! queue into a mode where newly added callbacks run right away; [`Que::pause`]
//! switches it back.
//!
//! All methods take `&self` so a callback can reach the queue that is running
//! it.
//!
//! # Examples
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use strux_runtime::queue::Que;
//! use strux_runtime::value::{Callable, Value};
//!
//! let count = Rc::new(Cell::new(0));
//! let counter = count.clone();
//! let effect = Callable::new("effect", move |_| {
//!     counter.set(counter.get() + 1);
//!     Ok(Value::Undefined)
//! });
//!
//! let que = Que::new();
//! que.add(effect.clone()).unwrap();
//! que.add(effect).unwrap();
//! assert_eq!(que.len(), 1);
//!
//! que.flush().unwrap();
//! assert_eq!(count.get(), 1);
//! ```

use crate::error::{StruxError, StruxResult};
use crate::value::{Callable, Value};
use std::cell::{Cell, RefCell};

#[derive(Debug, Default)]
pub struct Que {
    pending: RefCell<Vec<Callable>>,
    flushing: Cell<bool>,
}

impl Que {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `callback`, or run it now if the queue is flushing.
    /// A callable that is already pending is not queued twice.
    pub fn add(&self, callback: Callable) -> StruxResult<&Self> {
        if self.flushing.get() {
            callback.call(&[])?;
            return Ok(self);
        }

        let mut pending = self.pending.borrow_mut();
        if !pending.iter().any(|queued| queued.ptr_eq(&callback)) {
            pending.push(callback);
        }
        Ok(self)
    }

    /// Like [`Que::add`] for a runtime value, which must be callable
    pub fn add_value(&self, value: &Value) -> StruxResult<&Self> {
        match value {
            Value::Function(callback) => self.add(callback.clone()),
            other => Err(StruxError::mismatch(other, "is_callable")),
        }
    }

    /// Leave flushing mode; pending callbacks wait for the next flush
    pub fn pause(&self) -> &Self {
        self.flushing.set(false);
        self
    }

    /// Enter flushing mode and run every pending callback.
    ///
    /// Each callback leaves the queue just before it runs. If the queue is
    /// paused during the drain, callbacks added after that stay pending. A
    /// failing callback stops the drain; the ones after it remain queued.
    pub fn flush(&self) -> StruxResult<&Self> {
        self.flushing.set(true);

        let batch = self.pending.borrow().len();
        if batch > 0 {
            tracing::trace!(pending = batch, "flushing callback queue");
        }

        for _ in 0..batch {
            let next = {
                let mut pending = self.pending.borrow_mut();
                if pending.is_empty() {
                    break;
                }
                pending.remove(0)
            };
            if let Err(err) = next.call(&[]) {
                tracing::debug!(callback = next.name(), error = %err, "callback failed during flush");
                return Err(err);
            }
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    pub fn is_flushing(&self) -> bool {
        self.flushing.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_value_requires_callable() {
        let que = Que::new();
        for bad in [
            Value::Undefined,
            Value::Null,
            Value::from("one"),
            Value::from(10),
            Value::array(vec![]),
            Value::record(Vec::<(String, Value)>::new()),
        ] {
            let err = que.add_value(&bad).unwrap_err();
            assert!(err.to_string().contains("test is_callable"));
        }
    }

    #[test]
    fn test_empty_flush_enters_flushing() {
        let que = Que::new();
        assert!(!que.is_flushing());
        que.flush().unwrap();
        assert!(que.is_flushing());
        que.pause();
        assert!(!que.is_flushing());
    }
}
