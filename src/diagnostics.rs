// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! Terminal diagnostics: TTY-aware color, and, under the `parallel` feature,
//! `indicatif` spinners for the driver's parse/count/flatten passes. Mirrors
//! `sorex::cli::display`'s `use_colors()` check and `main.rs`'s per-step
//! `MultiProgress` spinners, pared down to this crate's single-document
//! pipeline: one spinner per pass instead of one per file format.

pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const RESET: &str = "\x1b[0m";
pub const RED: &str = "\x1b[31m";
pub const YELLOW: &str = "\x1b[33m";
pub const GREEN: &str = "\x1b[32m";

/// Respects `NO_COLOR`, then checks whether stderr is a TTY, the same order
/// `sorex::cli::display::use_colors` checks stdout.
pub fn use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    atty::is(atty::Stream::Stderr)
}

/// Wraps `text` in `styles` when stderr is a color-capable TTY, otherwise
/// returns it unchanged.
pub fn styled(styles: &[&str], text: &str) -> String {
    if use_colors() {
        format!("{}{}{}", styles.join(""), text, RESET)
    } else {
        text.to_string()
    }
}

pub use spinner::Spinner;

#[cfg(feature = "parallel")]
mod spinner {
    use indicatif::{ProgressBar, ProgressStyle};

    /// One step of `SerializerDriver::build_image`'s pipeline: parse, build
    /// the document tree, count, flatten. `start` ticks a spinner with
    /// `message`; dropping or `finish`-ing it stops the tick.
    pub struct Spinner(ProgressBar);

    impl Spinner {
        pub fn start(message: &str) -> Spinner {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                pb.set_style(style);
            }
            pb.set_message(message.to_string());
            pb.enable_steady_tick(std::time::Duration::from_millis(80));
            Spinner(pb)
        }

        pub fn finish(self, message: &str) {
            self.0.finish_with_message(message.to_string());
        }
    }
}

#[cfg(not(feature = "parallel"))]
mod spinner {
    /// No-op stand-in when the `parallel` feature (and `indicatif` with it)
    /// is disabled, so callers don't need a `#[cfg]` at every call site.
    pub struct Spinner;

    impl Spinner {
        pub fn start(_message: &str) -> Spinner {
            Spinner
        }

        pub fn finish(self, _message: &str) {}
    }
}
