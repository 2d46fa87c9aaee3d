//! # Runtime Configuration
//!
//! Coroutine runtime settings for the HTTP host, read from the environment.
//!
//! `BRRTARGS_STACK_SIZE` sets the stack size of request coroutines, in decimal
//! (`32768`) or hexadecimal (`0x8000`). Unset or unparsable values fall back
//! to `0x4000` (16 KB). Dispatch itself is shallow, so the default is enough
//! unless a facade implementation recurses deeply.

use std::env;

pub const DEFAULT_STACK_SIZE: usize = 0x4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var("BRRTARGS_STACK_SIZE")
            .ok()
            .and_then(|val| parse_stack_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }

    /// Apply to the global `may` scheduler configuration
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal byte count
#[must_use]
pub fn parse_stack_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
    .filter(|size| *size > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(parse_stack_size("0x8000"), Some(0x8000));
        assert_eq!(parse_stack_size(" 32768 "), Some(32768));
        assert_eq!(parse_stack_size("0"), None);
        assert_eq!(parse_stack_size("lots"), None);
    }
}
