//! I/O backends for the memory-mapped keyboard and TTY ports.
//!
//! The VM never blocks on input: `key_ready` polls the host without
//! waiting and `read_key` returns 0 when nothing is queued.

use std::collections::VecDeque;
use std::io::Write;
use std::time::Duration;

/// Host-side device interface behind the MMIO ports.
pub trait Io {
    /// Non-blocking: is a key byte queued?
    fn key_ready(&mut self) -> bool;

    /// Consume and return the next queued 7-bit ASCII byte, 0 if none.
    fn read_key(&mut self) -> u8;

    /// Write one byte to the terminal, flushed immediately.
    fn write_tty(&mut self, byte: u8);
}

/// Scripted I/O for tests and non-interactive use: input is a fixed
/// byte queue, output is captured.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIo {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl ScriptedIo {
    pub fn new(input: impl Into<VecDeque<u8>>) -> Self {
        ScriptedIo {
            input: input.into(),
            output: Vec::new(),
        }
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }
}

impl Io for ScriptedIo {
    fn key_ready(&mut self) -> bool {
        !self.input.is_empty()
    }

    fn read_key(&mut self) -> u8 {
        self.input.pop_front().unwrap_or(0)
    }

    fn write_tty(&mut self, byte: u8) {
        self.output.push(byte);
    }
}

/// Interactive console: raw-mode keyboard with non-blocking polling,
/// bytes written straight to stdout.
///
/// Raw mode is enabled on construction when stdin is a terminal and
/// restored on drop, whichever way the process leaves the run loop.
pub struct Console {
    queue: VecDeque<u8>,
    raw_mode: bool,
}

impl Console {
    pub fn new() -> Self {
        let raw_mode = crossterm::terminal::enable_raw_mode().is_ok();
        Console {
            queue: VecDeque::new(),
            raw_mode,
        }
    }

    /// Drain pending host key events into the queue without blocking.
    fn fill_queue_if_needed(&mut self) {
        use crossterm::event::{poll, read, Event, KeyCode, KeyEventKind};

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(event) = read() else { break };
            let Event::Key(key) = event else { continue };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            // Special keys (arrows, function keys, ...) are swallowed
            // and replaced with 0.
            let byte = match key.code {
                KeyCode::Char(c) if c.is_ascii() => c as u8,
                KeyCode::Enter => 0x0A,
                KeyCode::Tab => 0x09,
                KeyCode::Backspace => 0x08,
                KeyCode::Esc => 0x1B,
                _ => 0,
            };
            self.queue.push_back(byte);
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Io for Console {
    fn key_ready(&mut self) -> bool {
        self.fill_queue_if_needed();
        !self.queue.is_empty()
    }

    fn read_key(&mut self) -> u8 {
        self.fill_queue_if_needed();
        self.queue.pop_front().unwrap_or(0)
    }

    fn write_tty(&mut self, byte: u8) {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(&[byte]);
        let _ = stdout.flush();
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        if self.raw_mode {
            let _ = crossterm::terminal::disable_raw_mode();
        }
    }
}
