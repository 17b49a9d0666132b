//! Conversion of raw option and argument values into typed values.

use std::path::PathBuf;

use thiserror::Error;

/// A raw value that could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for '{name}': expected {expected}")]
pub struct ConversionError {
    /// Option or argument name.
    pub name: String,
    pub value: String,
    pub expected: &'static str,
}

/// Types that can be read from a command-line value.
///
/// # Examples
///
/// ```
/// use argtree_parser::FromArgValue;
///
/// assert_eq!(u16::from_arg_value("8080"), Some(8080));
/// assert_eq!(bool::from_arg_value("Yes"), Some(true));
/// assert_eq!(char::from_arg_value("ab"), None);
/// ```
pub trait FromArgValue: Sized {
    /// Short description of the accepted input, used in error messages.
    const EXPECTED: &'static str;

    fn from_arg_value(raw: &str) -> Option<Self>;
}

impl FromArgValue for String {
    const EXPECTED: &'static str = "a string";

    fn from_arg_value(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FromArgValue for PathBuf {
    const EXPECTED: &'static str = "a path";

    fn from_arg_value(raw: &str) -> Option<Self> {
        Some(PathBuf::from(raw))
    }
}

impl FromArgValue for char {
    const EXPECTED: &'static str = "a single character";

    fn from_arg_value(raw: &str) -> Option<Self> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl FromArgValue for bool {
    const EXPECTED: &'static str = "a boolean (true/false, yes/no, on/off, 1/0)";

    fn from_arg_value(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

macro_rules! from_str_values {
    ($($ty:ty => $expected:literal),* $(,)?) => {
        $(
            impl FromArgValue for $ty {
                const EXPECTED: &'static str = $expected;

                fn from_arg_value(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }
            }
        )*
    };
}

from_str_values! {
    u8 => "an integer between 0 and 255",
    u16 => "an integer between 0 and 65535",
    u32 => "a non-negative 32-bit integer",
    u64 => "a non-negative 64-bit integer",
    usize => "a non-negative integer",
    i8 => "an integer between -128 and 127",
    i16 => "a 16-bit integer",
    i32 => "a 32-bit integer",
    i64 => "a 64-bit integer",
    isize => "an integer",
    f32 => "a number",
    f64 => "a number",
}

/// Converts one raw value, naming `name` in the error.
pub(crate) fn convert<T: FromArgValue>(name: &str, raw: &str) -> Result<T, ConversionError> {
    T::from_arg_value(raw).ok_or_else(|| ConversionError {
        name: name.to_string(),
        value: raw.to_string(),
        expected: T::EXPECTED,
    })
}
