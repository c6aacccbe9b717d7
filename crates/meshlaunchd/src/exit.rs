//! Mapping the child's termination onto our own exit status

use meshlaunch_api::TerminationResult;

/// Shell convention for "killed by signal N"
const SIGNAL_EXIT_BASE: u8 = 128;

/// Exit status byte that mirrors how the child ended
///
/// Exit codes pass through (low 8 bits), signals become `128 + N`, and an
/// exit with neither is a plain failure.
pub fn status_byte(result: &TerminationResult) -> u8 {
    match (result.code, result.signal) {
        (Some(code), _) => (code & 0xff) as u8,
        (None, Some(signal)) => SIGNAL_EXIT_BASE.wrapping_add((signal & 0x7f) as u8),
        (None, None) => 1,
    }
}
