//! Signal/slot system for Horizon DataView.
//!
//! A [`Signal`] is how a data view tells the embedding application that
//! something happened: a column was sorted, a column was dragged to a new
//! position, the column set changed. Connected slots (closures) are invoked
//! synchronously, in connection order, on the thread that emits.
//!
//! The data view itself is single-threaded, so there is no queued or
//! cross-thread dispatch here. Slots must still be `Send + Sync` so a signal
//! can live inside types that are moved between threads between events.
//!
//! # Example
//!
//! ```
//! use horizon_dataview_core::Signal;
//!
//! let column_sorted = Signal::<usize>::new();
//!
//! let conn_id = column_sorted.connect(|column| {
//!     println!("Column {} sorted", column);
//! });
//!
//! column_sorted.emit(2);
//! column_sorted.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple like `(usize, usize)` for several.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Block the signal until the returned guard is dropped.
    ///
    /// The previous blocked state is restored on drop, so guards nest.
    pub fn block_scoped(&self) -> SignalBlocker<'_, Args> {
        let was_blocked = self.blocked.swap(true, Ordering::SeqCst);
        SignalBlocker {
            signal: self,
            was_blocked,
        }
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// Slots are collected before any of them runs, so a slot may connect
    /// or disconnect on this same signal without deadlocking. Changes made
    /// that way take effect from the next emission.
    #[tracing::instrument(skip_all, target = "horizon_dataview_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

/// RAII guard returned by [`Signal::block_scoped`].
pub struct SignalBlocker<'a, Args> {
    signal: &'a Signal<Args>,
    was_blocked: bool,
}

impl<Args> Drop for SignalBlocker<'_, Args> {
    fn drop(&mut self) {
        self.signal
            .blocked
            .store(self.was_blocked, Ordering::SeqCst);
    }
}
