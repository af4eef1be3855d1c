//! Single-owner hand-off of a peripheral to an interrupt handler.

use core::{
    cell::UnsafeCell,
    mem::MaybeUninit,
    sync::atomic::{AtomicU8, Ordering},
};

const EMPTY: u8 = 0;
const WRITING: u8 = 1;
const READY: u8 = 2;
const BORROWED: u8 = 3;

/// Holds the one value that owns a peripheral.
///
/// Firmware declares a `static` slot for each peripheral that an interrupt
/// handler drives. Setup code moves the owner into the slot exactly once,
/// before unmasking the interrupt. After that, the handler borrows it with
/// [`with`](Self::with). Nothing else can reach the peripheral, so nothing
/// can reconfigure it behind the handler's back.
///
/// The slot never blocks. A borrow attempt that would alias an existing
/// borrow, like a re-entrant handler, is refused instead.
///
/// ```
/// use overflow_toggle::PeripheralSlot;
///
/// static LED: PeripheralSlot<u32> = PeripheralSlot::new();
///
/// assert_eq!(LED.with(|led| *led), None);
/// assert!(LED.install(7).is_ok());
/// assert_eq!(LED.install(8), Err(8));
/// assert_eq!(LED.with(|led| { *led += 1; *led }), Some(8));
/// ```
pub struct PeripheralSlot<T> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

// Access to `value` is serialized by `state`.
unsafe impl<T: Send> Sync for PeripheralSlot<T> {}

impl<T> PeripheralSlot<T> {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Move the owner into the slot.
    ///
    /// Only the first call succeeds. Any later call returns `value` back to
    /// the caller.
    pub fn install(&self, value: T) -> Result<(), T> {
        if self
            .state
            .compare_exchange(EMPTY, WRITING, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(value);
        }
        // Safety: the WRITING state excludes every other access.
        unsafe { (*self.value.get()).write(value) };
        self.state.store(READY, Ordering::Release);
        Ok(())
    }

    /// Returns `true` once a value is installed.
    pub fn is_installed(&self) -> bool {
        matches!(self.state.load(Ordering::Acquire), READY | BORROWED)
    }

    /// Run `func` with exclusive access to the installed value.
    ///
    /// Returns `None` without calling `func` if nothing is installed, or if
    /// the value is already borrowed.
    pub fn with<R>(&self, func: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.state
            .compare_exchange(READY, BORROWED, Ordering::Acquire, Ordering::Relaxed)
            .ok()?;
        // Safety: READY means the value is initialized, and BORROWED
        // excludes every other access until we release it below.
        let result = func(unsafe { (*self.value.get()).assume_init_mut() });
        self.state.store(READY, Ordering::Release);
        Some(result)
    }
}

impl<T> Default for PeripheralSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for PeripheralSlot<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == READY {
            // Safety: READY means the value is initialized.
            unsafe { self.value.get_mut().assume_init_drop() };
        }
    }
}
