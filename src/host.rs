//! Host-side configuration for the target.
//!
//! See [`ToggleBuilder::build`] to understand how the generated configuration
//! reaches your firmware.

// Please explicitly match all `Timer16` variants. If someone adds a timer
// family, this will help them find all the settings they need to consider.
#![warn(clippy::wildcard_enum_match_arm)]

pub mod sim;

use std::{
    env, fs,
    io::{self, Write},
    path::PathBuf,
};

use crate::{ConfigError, Prescaler, Timer16, ToggleConfig};

impl std::error::Error for ConfigError {}

/// A builder value that a user may replace through an environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EnvOverride {
    default: u32,
    env: Option<String>,
}

impl EnvOverride {
    const fn new(default: u32) -> Self {
        Self { default, env: None }
    }
    fn set_default(&mut self, default: u32) {
        self.default = default;
    }
    fn set_env_key(&mut self, key: String) {
        self.env = Some(key);
    }
    fn read(&self) -> Result<u32, Box<dyn std::error::Error>> {
        if let Some(env) = &self.env {
            // Re-run only when the selected variable changes. If a build script
            // selects different variables on different paths, the re-run
            // behavior follows the selection.
            println!("cargo:rerun-if-env-changed={env}");
        }

        if let Some(val) = self.env.as_ref().and_then(|key| env::var(key).ok()) {
            parse_scaled(&val)
        } else {
            Ok(self.default)
        }
    }
}

/// Parse an integer with an optional `k` (x1000) or `M` (x1000000) suffix.
fn parse_scaled(val: &str) -> Result<u32, Box<dyn std::error::Error>> {
    let val = val.trim();
    let (digits, scale) = if let Some(digits) = val.strip_suffix(['k', 'K']) {
        (digits, 1_000)
    } else if let Some(digits) = val.strip_suffix('M') {
        (digits, 1_000_000)
    } else {
        (val, 1)
    };
    digits
        .parse::<u32>()?
        .checked_mul(scale)
        .ok_or_else(|| format!("{val} does not fit in 32 bits").into())
}

/// Builder for the overflow toggle configuration.
///
/// `ToggleBuilder` turns a timer clock and a target interval into the
/// counter preload and prescaler that the firmware programs into the timer.
/// Call it from your firmware's `build.rs`, then include the result with
/// [`include_config!`](crate::include_config).
///
/// # Default values
///
/// The example below demonstrates the default builder values.
///
/// ```
/// use overflow_toggle::{Timer16, ToggleBuilder};
///
/// let mut b = ToggleBuilder::new(Timer16::AvrTimer1, 16_000_000);
/// b.interval_us(50_000);                 // 50 ms between toggles.
/// b.config_file_name("overflow-toggle.rs");
///
/// assert_eq!(b, ToggleBuilder::new(Timer16::AvrTimer1, 16_000_000));
/// ```
///
/// Without an explicit [`prescaler`](Self::prescaler), the builder picks the
/// smallest divisor that the timer supports and that still fits the interval
/// into the 16-bit counter. Smaller divisors mean finer tick resolution.
///
/// ```
/// use overflow_toggle::{Prescaler, Timer16, ToggleBuilder};
///
/// let config = ToggleBuilder::new(Timer16::AvrTimer1, 16_000_000)
///     .config()
///     .unwrap();
/// assert_eq!(config.prescaler(), Prescaler::Div64);
/// assert_eq!(config.preload(), 53036);
///
/// let config = ToggleBuilder::new(Timer16::AvrTimer1, 16_000_000)
///     .prescaler(Prescaler::Div1024)
///     .config()
///     .unwrap();
/// assert_eq!(config.preload(), 64755);
/// ```
///
/// # Environment overrides
///
/// The interval and the timer clock can be replaced through environment
/// variables. As the provider of the firmware, use the `*_env_override`
/// methods to select the variables that others may use.
///
/// ```no_run
/// # use overflow_toggle::{Timer16, ToggleBuilder};
/// ToggleBuilder::new(Timer16::QTimer, 24_000_000)
///     .interval_us_env_override("YOUR_INTERVAL_US")
///     .clock_hz_env_override("YOUR_CLOCK_HZ")
///     // ...
///     # .build().unwrap();
/// ```
///
/// If a user sets `YOUR_INTERVAL_US=100000`, the pin toggles every 100 ms.
/// Otherwise, it toggles at the interval given to the builder.
///
/// > As a convenience, values accept a `k` or `K` suffix for multiples of
/// > 1000, and an `M` suffix for multiples of 1000000. `YOUR_CLOCK_HZ=24M`
/// > is equivalent to `YOUR_CLOCK_HZ=24000000`.
///
/// The call order is irrelevant, since the builder doesn't consult the
/// environment until you invoke [`config()`](Self::config) or
/// [`build()`](Self::build). When you select more than one variable for
/// the same value, the last one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleBuilder {
    timer: Timer16,
    clock_hz: EnvOverride,
    prescaler: Option<Prescaler>,
    interval_us: EnvOverride,
    preload: Option<u16>,
    config_file_name: String,
}

const DEFAULT_INTERVAL_US: u32 = 50_000;
const DEFAULT_CONFIG_FILE_NAME: &str = "overflow-toggle.rs";

impl ToggleBuilder {
    /// Creates a configuration for a `timer` clocked at `clock_hz`.
    ///
    /// `clock_hz` is the frequency that reaches the prescaler, in hertz.
    pub fn new(timer: Timer16, clock_hz: u32) -> Self {
        Self {
            timer,
            clock_hz: EnvOverride::new(clock_hz),
            prescaler: None,
            interval_us: EnvOverride::new(DEFAULT_INTERVAL_US),
            preload: None,
            config_file_name: DEFAULT_CONFIG_FILE_NAME.into(),
        }
    }

    /// Select the prescaler instead of letting the builder choose.
    pub fn prescaler(&mut self, prescaler: Prescaler) -> &mut Self {
        self.prescaler = Some(prescaler);
        self
    }

    /// Set the time between overflows, in microseconds.
    ///
    /// This discards any [`preload`](Self::preload) value.
    pub fn interval_us(&mut self, interval_us: u32) -> &mut Self {
        self.interval_us.set_default(interval_us);
        self.preload = None;
        self
    }

    /// Let the environment variable `key` set the interval, in microseconds.
    ///
    /// An explicit [`preload`](Self::preload) still takes precedence.
    pub fn interval_us_env_override(&mut self, key: impl AsRef<str>) -> &mut Self {
        self.interval_us.set_env_key(key.as_ref().into());
        self
    }

    /// Use an exact counter preload, skipping the interval computation.
    ///
    /// Without an explicit [`prescaler`](Self::prescaler), the timer runs
    /// at its smallest supported divisor.
    pub fn preload(&mut self, preload: u16) -> &mut Self {
        self.preload = Some(preload);
        self
    }

    /// Let the environment variable `key` set the timer clock, in hertz.
    pub fn clock_hz_env_override(&mut self, key: impl AsRef<str>) -> &mut Self {
        self.clock_hz.set_env_key(key.as_ref().into());
        self
    }

    /// Set the name of the generated configuration file.
    ///
    /// If you change this, pass the same name to
    /// [`include_config!`](crate::include_config).
    pub fn config_file_name(&mut self, name: &str) -> &mut Self {
        self.config_file_name = name.into();
        self
    }

    /// Resolve the configuration without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment override can't be parsed, or if
    /// the values produce a [`ConfigError`].
    pub fn config(&self) -> Result<ToggleConfig, Box<dyn std::error::Error>> {
        let clock_hz = self.clock_hz.read()?;
        if clock_hz == 0 {
            return Err(ConfigError::ZeroClock.into());
        }
        if let Some(prescaler) = self.prescaler {
            if !self.timer.supports(prescaler) {
                return Err(ConfigError::UnsupportedPrescaler {
                    timer: self.timer,
                    prescaler,
                }
                .into());
            }
        }

        if let Some(preload) = self.preload {
            let prescaler = self
                .prescaler
                .unwrap_or_else(|| self.timer.prescalers()[0]);
            return Ok(ToggleConfig::new(clock_hz, prescaler, preload));
        }

        let interval_us = self.interval_us.read()?;
        if let Some(prescaler) = self.prescaler {
            return Ok(ToggleConfig::for_interval(clock_hz, prescaler, interval_us)?);
        }
        self.fit_prescaler(clock_hz, interval_us)
    }

    /// Find the smallest supported prescaler that fits the interval.
    fn fit_prescaler(
        &self,
        clock_hz: u32,
        interval_us: u32,
    ) -> Result<ToggleConfig, Box<dyn std::error::Error>> {
        for prescaler in self.timer.prescalers() {
            match ToggleConfig::for_interval(clock_hz, *prescaler, interval_us) {
                Ok(config) => return Ok(config),
                Err(ConfigError::IntervalTooLong { .. }) => continue,
                // Larger divisors only make short intervals shorter.
                Err(err) => return Err(err.into()),
            }
        }
        Err(ConfigError::NoPrescalerFits {
            timer: self.timer,
            interval_us,
        }
        .into())
    }

    /// Commit the configuration.
    ///
    /// `build()` writes the generated configuration into `OUT_DIR`, where
    /// [`include_config!`](crate::include_config) finds it. It returns the
    /// configuration it wrote, in case the build script wants to use it.
    ///
    /// # Errors
    ///
    /// See [`config()`](Self::config). `build()` also fails if `OUT_DIR`
    /// isn't set, or if the file can't be written.
    pub fn build(&self) -> Result<ToggleConfig, Box<dyn std::error::Error>> {
        // Since `build` is called from a build script, the output directory
        // represents the path to the _user's_ crate.
        let out_dir = PathBuf::from(env::var("OUT_DIR")?);
        let config = self.config()?;

        let mut in_memory = Vec::new();
        write_config(&mut in_memory, &config)?;
        fs::write(out_dir.join(&self.config_file_name), &in_memory)?;
        Ok(config)
    }
}

/// Write `config` as a Rust constant.
fn write_config(writer: &mut dyn Write, config: &ToggleConfig) -> io::Result<()> {
    writeln!(
        writer,
        "// {} us between overflows, {} mHz square wave.",
        config.interval_us(),
        config.frequency_mhz()
    )?;
    writeln!(
        writer,
        "pub const TOGGLE_CONFIG: ::overflow_toggle::ToggleConfig = \
         ::overflow_toggle::ToggleConfig::new({}, ::overflow_toggle::Prescaler::{:?}, {});",
        config.clock_hz(),
        config.prescaler(),
        config.preload(),
    )
}

#[cfg(test)]
mod tests {
    use super::{parse_scaled, write_config, ToggleBuilder};
    use crate::{ConfigError, Prescaler, Timer16, ToggleConfig};
    use std::{env, error};

    type Error = Box<dyn error::Error>;

    const ALL_TIMERS: &[Timer16] = &[Timer16::AvrTimer1, Timer16::QTimer];

    fn config_error(err: Error) -> ConfigError {
        *err.downcast::<ConfigError>().expect("not a ConfigError")
    }

    #[test]
    fn default_interval_fits_every_timer() -> Result<(), Error> {
        for timer in ALL_TIMERS {
            let config = ToggleBuilder::new(*timer, 24_000_000).config()?;
            let error = config.interval_us().abs_diff(50_000);
            assert!(error < 10, "{timer:?}: {config:?}");
            assert!(timer.supports(config.prescaler()));
        }
        Ok(())
    }

    #[test]
    fn picks_smallest_fitting_prescaler() -> Result<(), Error> {
        // 99 MHz: /64 holds at most ~42 ms, so 50 ms needs /128.
        let config = ToggleBuilder::new(Timer16::QTimer, 99_000_000).config()?;
        assert_eq!(config.prescaler(), Prescaler::Div128);
        assert_eq!(config.preload(), 26864);

        let config = ToggleBuilder::new(Timer16::QTimer, 99_000_000)
            .interval_us(1_000)
            .config()?;
        assert_eq!(config.prescaler(), Prescaler::Div2);
        Ok(())
    }

    #[test]
    fn rejects_unsupported_prescaler() {
        let err = ToggleBuilder::new(Timer16::QTimer, 24_000_000)
            .prescaler(Prescaler::Div1024)
            .config()
            .unwrap_err();
        assert_eq!(
            config_error(err),
            ConfigError::UnsupportedPrescaler {
                timer: Timer16::QTimer,
                prescaler: Prescaler::Div1024,
            }
        );
    }

    #[test]
    fn no_prescaler_fits() {
        // 99 MHz / 128 wraps in under 85 ms.
        let err = ToggleBuilder::new(Timer16::QTimer, 99_000_000)
            .interval_us(500_000)
            .config()
            .unwrap_err();
        assert_eq!(
            config_error(err),
            ConfigError::NoPrescalerFits {
                timer: Timer16::QTimer,
                interval_us: 500_000,
            }
        );
    }

    #[test]
    fn too_short_is_not_retried() {
        let err = ToggleBuilder::new(Timer16::AvrTimer1, 16_000_000)
            .interval_us(0)
            .config()
            .unwrap_err();
        assert_eq!(
            config_error(err),
            ConfigError::IntervalTooShort { interval_us: 0 }
        );
    }

    #[test]
    fn zero_clock() {
        let err = ToggleBuilder::new(Timer16::AvrTimer1, 0)
            .config()
            .unwrap_err();
        assert_eq!(config_error(err), ConfigError::ZeroClock);
    }

    #[test]
    fn explicit_preload() -> Result<(), Error> {
        let config = ToggleBuilder::new(Timer16::AvrTimer1, 16_000_000)
            .prescaler(Prescaler::Div1024)
            .preload(64755)
            .config()?;
        assert_eq!(
            config,
            ToggleConfig::new(16_000_000, Prescaler::Div1024, 64755)
        );

        let config = ToggleBuilder::new(Timer16::AvrTimer1, 16_000_000)
            .preload(0)
            .config()?;
        assert_eq!(config.prescaler(), Prescaler::Div1);

        // Setting an interval afterwards takes precedence.
        let config = ToggleBuilder::new(Timer16::AvrTimer1, 16_000_000)
            .preload(0)
            .prescaler(Prescaler::Div1024)
            .interval_us(50_000)
            .config()?;
        assert_eq!(config.preload(), 64755);
        Ok(())
    }

    #[test]
    fn environment_overrides() -> Result<(), Error> {
        env::set_var("OVERFLOW_TOGGLE_TEST_INTERVAL", "100k");
        env::set_var("OVERFLOW_TOGGLE_TEST_CLOCK", "16M");
        let config = ToggleBuilder::new(Timer16::AvrTimer1, 1_000_000)
            .prescaler(Prescaler::Div1024)
            .interval_us_env_override("OVERFLOW_TOGGLE_TEST_INTERVAL")
            .clock_hz_env_override("OVERFLOW_TOGGLE_TEST_CLOCK")
            .config()?;
        assert_eq!(config.clock_hz(), 16_000_000);
        assert_eq!(config.ticks(), 1563);

        // Unset variables fall back to the builder's values.
        let config = ToggleBuilder::new(Timer16::AvrTimer1, 16_000_000)
            .prescaler(Prescaler::Div1024)
            .interval_us_env_override("OVERFLOW_TOGGLE_TEST_NOT_SET")
            .config()?;
        assert_eq!(config.preload(), 64755);
        Ok(())
    }

    #[test]
    fn invalid_environment_override() {
        env::set_var("OVERFLOW_TOGGLE_TEST_BAD_CLOCK", "fast");
        let res = ToggleBuilder::new(Timer16::AvrTimer1, 16_000_000)
            .clock_hz_env_override("OVERFLOW_TOGGLE_TEST_BAD_CLOCK")
            .config();
        assert!(res.is_err());
    }

    #[test]
    fn scaled_values() -> Result<(), Error> {
        assert_eq!(parse_scaled("50000")?, 50_000);
        assert_eq!(parse_scaled("50k")?, 50_000);
        assert_eq!(parse_scaled("50K")?, 50_000);
        assert_eq!(parse_scaled(" 24M ")?, 24_000_000);
        assert!(parse_scaled("5000M").is_err());
        assert!(parse_scaled("-1").is_err());
        assert!(parse_scaled("").is_err());
        Ok(())
    }

    #[test]
    fn generated_file() -> Result<(), Error> {
        let mut out = Vec::new();
        write_config(
            &mut out,
            &ToggleConfig::new(16_000_000, Prescaler::Div1024, 64755),
        )?;
        let out = String::from_utf8(out)?;
        assert!(out.starts_with("// 49984 us between overflows, 10003 mHz square wave.\n"));
        assert!(out.contains(
            "::overflow_toggle::ToggleConfig::new(16000000, ::overflow_toggle::Prescaler::Div1024, 64755);"
        ));
        Ok(())
    }
}
