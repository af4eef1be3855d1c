use std::{collections::HashSet, env};

use overflow_toggle::{Timer16, ToggleBuilder};

/// Blink interval when nobody overrides it.
const TOGGLE_INTERVAL_US: u32 = 50_000;

fn extract_features() -> HashSet<String> {
    env::vars()
        .map(|(k, _)| k)
        .flat_map(|feat| feat.strip_prefix("CARGO_FEATURE_").map(str::to_lowercase))
        .collect()
}

/// Computes the overflow configuration for a quad timer clocked at `clock_hz`.
///
/// Users can change the interval and the clock without touching this file.
fn toggle_config(clock_hz: u32) {
    ToggleBuilder::new(Timer16::QTimer, clock_hz)
        .interval_us(TOGGLE_INTERVAL_US)
        .interval_us_env_override("BOARD_TOGGLE_INTERVAL_US")
        .clock_hz_env_override("BOARD_TIMER_CLOCK_HZ")
        .build()
        .unwrap();
}

/// Configures the runtime and the blink timer for a variety of boards.
fn main() {
    let features = extract_features();
    for feature in features {
        match feature.as_str() {
            "teensy4" => {
                imxrt_rt::RuntimeBuilder::from_flexspi(imxrt_rt::Family::Imxrt1060, 1984 * 1024)
                    .flexram_banks(imxrt_rt::FlexRamBanks {
                        ocram: 0,
                        dtcm: 12,
                        itcm: 4,
                    })
                    .text(imxrt_rt::Memory::Flash)
                    .rodata(imxrt_rt::Memory::Dtcm)
                    .data(imxrt_rt::Memory::Dtcm)
                    .bss(imxrt_rt::Memory::Dtcm)
                    .uninit(imxrt_rt::Memory::Dtcm)
                    .stack_size_env_override("BOARD_STACK")
                    .build()
                    .unwrap();
                // IPG clock as the boot ROM leaves it.
                toggle_config(99_000_000);
            }
            "imxrt1010evk" => {
                imxrt_rt::RuntimeBuilder::from_flexspi(
                    imxrt_rt::Family::Imxrt1010,
                    16 * 1024 * 1024,
                )
                .rodata(imxrt_rt::Memory::Flash)
                .stack_size_env_override("BOARD_STACK")
                .build()
                .unwrap();
                toggle_config(99_000_000);
            }
            "imxrt1170evk_cm7" => {
                imxrt_rt::RuntimeBuilder::from_flexspi(imxrt_rt::Family::Imxrt1170, 16 * 1024 * 1024)
                    .rodata(imxrt_rt::Memory::Dtcm)
                    .stack_size_env_override("BOARD_STACK")
                    .build()
                    .unwrap();
                // The board code moves the bus clock to the 24 MHz crystal.
                toggle_config(24_000_000);
            }
            _ => continue,
        }
        break;
    }
}
