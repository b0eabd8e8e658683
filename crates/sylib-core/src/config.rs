//! Float text policy configuration.
//!
//! The policy decides how `getfloat`/`putfloat` (and their array forms) encode
//! single-precision floats on the console:
//! - `hex` (default build): minimal hexadecimal-float tokens (`0x1.8p+0`).
//!   Input accepts hexadecimal and decimal tokens.
//! - `decimal` (`decimal-float` cargo feature): `%f` fixed notation
//!   (`1.500000`). Input accepts decimal tokens only.
//!
//! The `SYLIB_FLOAT_TEXT` environment variable overrides the build default the
//! first time the process-wide policy is resolved. The resolved value never
//! changes afterwards, so a program's reads and writes always agree.

use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable consulted once per process.
pub const FLOAT_TEXT_ENV: &str = "SYLIB_FLOAT_TEXT";

/// Text encoding applied to every float read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatTextPolicy {
    /// Fixed-notation decimal (`%f`) output, decimal-only input.
    Decimal,
    /// Minimal hexadecimal-float (`%a`, trailing zeros trimmed) output.
    /// Input accepts hexadecimal and decimal tokens.
    HexMinimal,
}

impl Default for FloatTextPolicy {
    fn default() -> Self {
        Self::build_default()
    }
}

impl FloatTextPolicy {
    /// Policy compiled into this build.
    #[must_use]
    pub const fn build_default() -> Self {
        if cfg!(feature = "decimal-float") {
            Self::Decimal
        } else {
            Self::HexMinimal
        }
    }

    /// Parse from string (case-insensitive). Unknown values fall back to the
    /// build default.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "decimal" | "dec" | "fixed" | "f" | "%f" => Self::Decimal,
            "hex" | "hexadecimal" | "hex-minimal" | "a" | "%a" => Self::HexMinimal,
            _ => Self::build_default(),
        }
    }

    /// Whether hexadecimal-float tokens are accepted on input.
    #[must_use]
    pub const fn accepts_hex_input(self) -> bool {
        matches!(self, Self::HexMinimal)
    }

    /// Stable lowercase name, as accepted by [`FloatTextPolicy::from_str_loose`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decimal => "decimal",
            Self::HexMinimal => "hex",
        }
    }
}

impl std::fmt::Display for FloatTextPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Atomic cache: 0=unresolved, 1=Decimal, 2=HexMinimal, 255=resolving.
static CACHED_POLICY: AtomicU8 = AtomicU8::new(0);

const POLICY_UNRESOLVED: u8 = 0;
const POLICY_DECIMAL: u8 = 1;
const POLICY_HEX: u8 = 2;
const POLICY_RESOLVING: u8 = 255;

fn policy_to_u8(policy: FloatTextPolicy) -> u8 {
    match policy {
        FloatTextPolicy::Decimal => POLICY_DECIMAL,
        FloatTextPolicy::HexMinimal => POLICY_HEX,
    }
}

fn u8_to_policy(v: u8) -> FloatTextPolicy {
    match v {
        POLICY_DECIMAL => FloatTextPolicy::Decimal,
        POLICY_HEX => FloatTextPolicy::HexMinimal,
        _ => FloatTextPolicy::build_default(),
    }
}

/// Get the process-wide float text policy (reads the env var on first call,
/// caches thereafter).
///
/// A caller that races the resolving thread gets the build default, which is
/// also what the resolver stores unless the env var says otherwise.
#[must_use]
pub fn float_text_policy() -> FloatTextPolicy {
    let cached = CACHED_POLICY.load(Ordering::Acquire);

    if cached != POLICY_UNRESOLVED && cached != POLICY_RESOLVING {
        return u8_to_policy(cached);
    }
    if cached == POLICY_RESOLVING {
        return FloatTextPolicy::build_default();
    }

    if CACHED_POLICY
        .compare_exchange(
            POLICY_UNRESOLVED,
            POLICY_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        let v = CACHED_POLICY.load(Ordering::Acquire);
        return if v != POLICY_UNRESOLVED && v != POLICY_RESOLVING {
            u8_to_policy(v)
        } else {
            FloatTextPolicy::build_default()
        };
    }

    let policy = std::env::var(FLOAT_TEXT_ENV)
        .map(|v| FloatTextPolicy::from_str_loose(&v))
        .unwrap_or_default();
    CACHED_POLICY.store(policy_to_u8(policy), Ordering::Release);
    policy
}
