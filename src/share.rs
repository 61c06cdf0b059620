//! Sharing a record as text, a link, or via the clipboard

use std::io::{self, Write};
use std::process::{Command, Stdio};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};
use url::Url;

use crate::models::WorkoutRecord;

/// Shareable summary of a workout
pub fn share_text(record: &WorkoutRecord) -> String {
    format!(
        "💪 Finished {}: {}kg × {} reps × {} sets today!\n\nTracking my progress with FitTrack 📊",
        record.exercise_name, record.weight, record.reps, record.sets
    )
}

/// Tweet-intent link carrying the share text
pub fn share_link(record: &WorkoutRecord) -> Option<Url> {
    Url::parse_with_params(
        "https://twitter.com/intent/tweet",
        &[("text", share_text(record))],
    )
    .ok()
}

/// Somewhere text can be copied to
pub trait ClipboardSink {
    fn name(&self) -> &str;
    fn write_text(&self, text: &str) -> io::Result<()>;
}

type ClipboardTool = (&'static str, &'static [&'static str]);

#[cfg(target_os = "macos")]
const CLIPBOARD_TOOLS: &[ClipboardTool] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const CLIPBOARD_TOOLS: &[ClipboardTool] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CLIPBOARD_TOOLS: &[ClipboardTool] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip.exe", &[]),
];

/// The desktop clipboard through whichever helper tool is installed
pub struct SystemClipboard {
    candidates: &'static [ClipboardTool],
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self {
            candidates: CLIPBOARD_TOOLS,
        }
    }
}

impl ClipboardSink for SystemClipboard {
    fn name(&self) -> &str {
        "system clipboard"
    }

    fn write_text(&self, text: &str) -> io::Result<()> {
        let mut last_err = io::Error::new(io::ErrorKind::NotFound, "no clipboard tool found");
        for (program, args) in self.candidates {
            match pipe_into(program, args, text) {
                Ok(()) => {
                    debug!(program, "copied via clipboard tool");
                    return Ok(());
                }
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }
}

fn pipe_into(program: &str, args: &[&str], text: &str) -> io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{} exited with {}", program, status)))
    }
}

/// Terminal clipboard escape (OSC 52), understood by most modern terminals
/// even over SSH
pub struct TerminalClipboard;

impl TerminalClipboard {
    pub fn sequence(text: &str) -> String {
        format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
    }
}

impl ClipboardSink for TerminalClipboard {
    fn name(&self) -> &str {
        "terminal clipboard"
    }

    fn write_text(&self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(Self::sequence(text).as_bytes())?;
        out.flush()
    }
}

/// Try `primary`, then `fallback`. Never fails; reports whether either worked.
pub fn copy_with_fallback(primary: &dyn ClipboardSink, fallback: &dyn ClipboardSink, text: &str) -> bool {
    match primary.write_text(text) {
        Ok(()) => true,
        Err(e) => {
            warn!(sink = primary.name(), error = %e, "copy failed, trying fallback");
            match fallback.write_text(text) {
                Ok(()) => true,
                Err(e) => {
                    warn!(sink = fallback.name(), error = %e, "fallback copy failed");
                    false
                }
            }
        }
    }
}

/// Copy to the system clipboard, falling back to the terminal escape
pub fn copy_to_clipboard(text: &str) -> bool {
    copy_with_fallback(&SystemClipboard::default(), &TerminalClipboard, text)
}
