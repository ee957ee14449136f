//! Braille spinner frames, advanced from the 100ms ui tick.

const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub fn frame(n: usize) -> &'static str {
    SPINNER_FRAMES[n % SPINNER_FRAMES.len()]
}
