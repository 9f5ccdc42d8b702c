/// Shared access to an [`ExpandedGpio`](crate::ExpandedGpio).
///
/// Every pin operation takes the dispatcher by `&mut`, and a controller usually has
/// several users of it: a control loop driving outputs, a task polling the ADCs, a
/// shutdown path calling `deinit_all`.  Wrapping the dispatcher in a `GpioMutex` gives
/// all of them a shared reference and serializes their bus transactions.
///
/// Ready-made impls:
///
/// - [`core::cell::RefCell`]: one execution context, no locking.
/// - `std::sync::Mutex` (feature `std`): threads on a hosted controller.  A poisoned
///   lock is recovered.
/// - `critical_section::Mutex<RefCell<_>>` (feature `critical-section`): main loop and
///   interrupt handlers on a microcontroller.
///
/// Other locks need a newtype:
///
/// ```
/// use plc_peripherals::GpioMutex;
///
/// struct SpinGpio<G>(spin_lock::Lock<G>);
/// # mod spin_lock {
/// #     pub struct Lock<T>(std::sync::Mutex<T>);
/// #     impl<T> Lock<T> {
/// #         pub fn new(v: T) -> Self { Self(std::sync::Mutex::new(v)) }
/// #         pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R { f(&mut *self.0.lock().unwrap()) }
/// #     }
/// # }
///
/// impl<G> GpioMutex for SpinGpio<G> {
///     type Gpio = G;
///
///     fn create(gpio: G) -> Self {
///         Self(spin_lock::Lock::new(gpio))
///     }
///
///     fn lock<R, F: FnOnce(&mut G) -> R>(&self, f: F) -> R {
///         self.0.with(f)
///     }
/// }
/// ```
pub trait GpioMutex {
    type Gpio;

    fn create(gpio: Self::Gpio) -> Self;

    /// Run `f` with exclusive access to the dispatcher.
    fn lock<R, F: FnOnce(&mut Self::Gpio) -> R>(&self, f: F) -> R;
}

impl<T> GpioMutex for core::cell::RefCell<T> {
    type Gpio = T;

    fn create(gpio: Self::Gpio) -> Self {
        core::cell::RefCell::new(gpio)
    }

    fn lock<R, F: FnOnce(&mut Self::Gpio) -> R>(&self, f: F) -> R {
        f(&mut *self.borrow_mut())
    }
}

#[cfg(any(test, feature = "std"))]
impl<T> GpioMutex for std::sync::Mutex<T> {
    type Gpio = T;

    fn create(gpio: Self::Gpio) -> Self {
        std::sync::Mutex::new(gpio)
    }

    fn lock<R, F: FnOnce(&mut Self::Gpio) -> R>(&self, f: F) -> R {
        let mut gpio = match self.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut gpio)
    }
}

#[cfg(feature = "critical-section")]
impl<T> GpioMutex for critical_section::Mutex<core::cell::RefCell<T>> {
    type Gpio = T;

    fn create(gpio: Self::Gpio) -> Self {
        critical_section::Mutex::new(core::cell::RefCell::new(gpio))
    }

    fn lock<R, F: FnOnce(&mut Self::Gpio) -> R>(&self, f: F) -> R {
        critical_section::with(|cs| f(&mut *self.borrow_ref_mut(cs)))
    }
}
