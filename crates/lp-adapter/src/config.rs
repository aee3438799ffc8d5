use serde::{Deserialize, Serialize};

/// Tunables for plan building. Defaults match the values the reference
/// deployment runs with; override per instance as needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Slippage tolerance applied to deposit maximums, in basis points.
    pub default_slippage_bps: u16,
    /// Extra lamports wrapped on top of a WSOL deposit so that rounding in
    /// the program's favor never drains the transfer below the requested
    /// maximum.
    pub wsol_wrap_buffer_lamports: u64,
    /// Unwrap leftover WSOL after close operations on WSOL-sided pools.
    pub unwrap_wsol_on_close: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            default_slippage_bps: 50,
            wsol_wrap_buffer_lamports: 10_000_000,
            unwrap_wsol_on_close: true,
        }
    }
}
