//! Timer configuration values.
//!
//! A [`ToggleConfig`] captures everything the overflow handler needs to
//! know: the timer's source clock, the prescaler, and the preload value
//! that the counter starts from after every overflow.

use core::fmt;

/// Number of counts in one full pass of a 16-bit counter.
pub const COUNTER_SPAN: u32 = 1 << 16;

const NANOS_PER_SEC: u64 = 1_000_000_000;
const MICROS_PER_SEC: u64 = 1_000_000;

/// A clock divider in front of the timer counter.
///
/// Not every timer supports every divider. Use [`Timer16::supports`] to
/// check a particular hardware family.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Prescaler {
    Div1,
    Div2,
    Div4,
    Div8,
    Div16,
    Div32,
    Div64,
    Div128,
    Div256,
    Div1024,
}

impl Prescaler {
    /// The clock divisor.
    pub const fn divisor(self) -> u32 {
        1 << self.log2()
    }

    /// Base-2 logarithm of the divisor.
    pub const fn log2(self) -> u32 {
        match self {
            Prescaler::Div1 => 0,
            Prescaler::Div2 => 1,
            Prescaler::Div4 => 2,
            Prescaler::Div8 => 3,
            Prescaler::Div16 => 4,
            Prescaler::Div32 => 5,
            Prescaler::Div64 => 6,
            Prescaler::Div128 => 7,
            Prescaler::Div256 => 8,
            Prescaler::Div1024 => 10,
        }
    }

    /// Look up the prescaler for `divisor`.
    pub const fn from_divisor(divisor: u32) -> Option<Self> {
        Some(match divisor {
            1 => Prescaler::Div1,
            2 => Prescaler::Div2,
            4 => Prescaler::Div4,
            8 => Prescaler::Div8,
            16 => Prescaler::Div16,
            32 => Prescaler::Div32,
            64 => Prescaler::Div64,
            128 => Prescaler::Div128,
            256 => Prescaler::Div256,
            1024 => Prescaler::Div1024,
            _ => return None,
        })
    }
}

impl fmt::Display for Prescaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.divisor())
    }
}

/// A family of 16-bit overflow timers.
///
/// The family decides which prescalers are available.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer16 {
    /// ATmega328P timer/counter 1.
    AvrTimer1,
    /// i.MX RT quad timer (TMR) channel.
    QTimer,
}

impl Timer16 {
    /// Prescalers supported by this timer, smallest divisor first.
    pub const fn prescalers(self) -> &'static [Prescaler] {
        match self {
            Timer16::AvrTimer1 => &[
                Prescaler::Div1,
                Prescaler::Div8,
                Prescaler::Div64,
                Prescaler::Div256,
                Prescaler::Div1024,
            ],
            Timer16::QTimer => &[
                Prescaler::Div1,
                Prescaler::Div2,
                Prescaler::Div4,
                Prescaler::Div8,
                Prescaler::Div16,
                Prescaler::Div32,
                Prescaler::Div64,
                Prescaler::Div128,
            ],
        }
    }

    /// Returns `true` if the timer can divide its clock by `prescaler`.
    pub fn supports(self, prescaler: Prescaler) -> bool {
        self.prescalers().contains(&prescaler)
    }
}

/// Why a configuration can't be realized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The timer clock frequency is zero.
    ZeroClock,
    /// The interval rounds to zero timer ticks.
    IntervalTooShort { interval_us: u32 },
    /// The interval needs more ticks than the counter holds.
    IntervalTooLong { interval_us: u32, max_us: u64 },
    /// The timer family doesn't implement this prescaler.
    UnsupportedPrescaler { timer: Timer16, prescaler: Prescaler },
    /// No supported prescaler stretches the counter far enough.
    NoPrescalerFits { timer: Timer16, interval_us: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroClock => f.write_str("timer clock frequency cannot be zero"),
            Self::IntervalTooShort { interval_us } => {
                write!(f, "interval of {interval_us} us is shorter than one timer tick")
            }
            Self::IntervalTooLong {
                interval_us,
                max_us,
            } => write!(
                f,
                "interval of {interval_us} us exceeds the {max_us} us the counter can hold"
            ),
            Self::UnsupportedPrescaler { timer, prescaler } => {
                write!(f, "{timer:?} does not support prescaler {prescaler}")
            }
            Self::NoPrescalerFits { timer, interval_us } => write!(
                f,
                "no {timer:?} prescaler can produce an interval of {interval_us} us"
            ),
        }
    }
}

/// Overflow timer configuration.
///
/// The counter counts up from `preload` at `clock_hz / prescaler` and
/// overflows after [`ticks()`](Self::ticks) counts. Each overflow toggles
/// the pin, so the output period is twice the overflow interval.
///
/// ```
/// use overflow_toggle::{Prescaler, ToggleConfig};
///
/// const BLINK: ToggleConfig = ToggleConfig::new(16_000_000, Prescaler::Div1024, 64755);
/// assert_eq!(BLINK.ticks(), 781);
/// assert_eq!(BLINK.interval_us(), 49_984);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleConfig {
    clock_hz: u32,
    prescaler: Prescaler,
    preload: u16,
}

impl ToggleConfig {
    /// Create a configuration from raw values.
    ///
    /// # Panics
    ///
    /// Panics if `clock_hz` is zero. In a `const` item, that's a compile
    /// error.
    pub const fn new(clock_hz: u32, prescaler: Prescaler, preload: u16) -> Self {
        assert!(clock_hz != 0, "timer clock frequency cannot be zero");
        Self {
            clock_hz,
            prescaler,
            preload,
        }
    }

    /// Compute the preload that overflows the counter every `interval_us`.
    ///
    /// The tick count is rounded to the nearest whole tick.
    ///
    /// # Errors
    ///
    /// Fails if the clock is zero, or if the interval doesn't fit between
    /// one tick and a full counter span.
    pub fn for_interval(
        clock_hz: u32,
        prescaler: Prescaler,
        interval_us: u32,
    ) -> Result<Self, ConfigError> {
        if clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        let den = prescaler.divisor() as u64 * MICROS_PER_SEC;
        let ticks = (interval_us as u64 * clock_hz as u64 + den / 2) / den;
        if ticks == 0 {
            return Err(ConfigError::IntervalTooShort { interval_us });
        }
        if ticks > COUNTER_SPAN as u64 {
            return Err(ConfigError::IntervalTooLong {
                interval_us,
                max_us: max_interval_us(clock_hz, prescaler),
            });
        }
        Ok(Self {
            clock_hz,
            prescaler,
            // Full span leaves a preload of zero.
            preload: (COUNTER_SPAN as u64 - ticks) as u16,
        })
    }

    /// Timer source clock, in hertz.
    pub const fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    pub const fn prescaler(&self) -> Prescaler {
        self.prescaler
    }

    /// The value loaded into the counter at start and after each overflow.
    pub const fn preload(&self) -> u16 {
        self.preload
    }

    /// Counter ticks between overflows.
    pub const fn ticks(&self) -> u32 {
        COUNTER_SPAN - self.preload as u32
    }

    /// Source clock cycles between overflows.
    pub const fn cycles(&self) -> u64 {
        self.ticks() as u64 * self.prescaler.divisor() as u64
    }

    /// Time between overflows, in nanoseconds (truncated).
    pub const fn interval_ns(&self) -> u64 {
        self.cycles() * NANOS_PER_SEC / self.clock_hz as u64
    }

    /// Time between overflows, in microseconds (truncated).
    pub const fn interval_us(&self) -> u64 {
        self.cycles() * MICROS_PER_SEC / self.clock_hz as u64
    }

    /// Period of the square wave on the pin, in nanoseconds.
    pub const fn period_ns(&self) -> u64 {
        2 * self.interval_ns()
    }

    /// Frequency of the square wave on the pin, in millihertz.
    pub const fn frequency_mhz(&self) -> u64 {
        self.clock_hz as u64 * 1000 / (2 * self.cycles())
    }
}

/// Longest interval a full counter span produces, in microseconds.
fn max_interval_us(clock_hz: u32, prescaler: Prescaler) -> u64 {
    COUNTER_SPAN as u64 * prescaler.divisor() as u64 * MICROS_PER_SEC / clock_hz as u64
}
