/// Include the timer configuration that `ToggleBuilder` generated.
///
/// Expands to a `pub const TOGGLE_CONFIG: ToggleConfig` item. Without
/// arguments, the macro looks for the default file name. If your build
/// script changed the name with `config_file_name()`, pass the same name
/// here.
///
/// ```ignore
/// overflow_toggle::include_config!();
/// // Or...
/// overflow_toggle::include_config!("blink.rs");
/// ```
#[macro_export]
macro_rules! include_config {
    () => {
        $crate::include_config!("overflow-toggle.rs");
    };
    ($name:literal) => {
        include!(concat!(env!("OUT_DIR"), "/", $name));
    };
}
