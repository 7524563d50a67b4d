//! Audible tone playback behind the [`ToneSink`] boundary.
//!
//! The monitor core only requests a frequency and duration; which device
//! actually beeps is chosen here, per platform, the same way the capture
//! layer chooses its input backend.

use std::io::{self, Write};

/// Plays an audible tone. Implementations are fire-and-forget from the
/// monitor's point of view; failures are reported, never fatal.
pub trait ToneSink: Send {
    fn play(&mut self, frequency_hz: u32, duration_ms: u32) -> io::Result<()>;
}

/// A sink that swallows tone requests. Used for muted runs and tests.
#[derive(Debug, Default)]
pub struct NullToneSink;

impl ToneSink for NullToneSink {
    fn play(&mut self, _frequency_hz: u32, _duration_ms: u32) -> io::Result<()> {
        Ok(())
    }
}

/// Windows tone playback via the kernel32 `Beep` call.
#[cfg(target_os = "windows")]
#[derive(Debug, Default)]
pub struct WinBeepTone;

#[cfg(target_os = "windows")]
impl ToneSink for WinBeepTone {
    fn play(&mut self, frequency_hz: u32, duration_ms: u32) -> io::Result<()> {
        use windows::Win32::System::Diagnostics::Debug::Beep;
        unsafe { Beep(frequency_hz, duration_ms) }
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

/// Terminal-bell tone for platforms without a speaker API.
///
/// The BEL character has a fixed pitch and length; frequency and duration
/// are accepted for interface compatibility and ignored.
#[derive(Debug, Default)]
pub struct TerminalBellTone;

impl ToneSink for TerminalBellTone {
    fn play(&mut self, _frequency_hz: u32, _duration_ms: u32) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()
    }
}

/// Platform default tone sink
#[cfg(target_os = "windows")]
pub type DefaultToneSink = WinBeepTone;

/// Platform default tone sink
#[cfg(not(target_os = "windows"))]
pub type DefaultToneSink = TerminalBellTone;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_tone_sink_accepts_requests() {
        let mut sink = NullToneSink;
        assert!(sink.play(1000, 1000).is_ok());
        assert!(sink.play(800, 800).is_ok());
    }
}
