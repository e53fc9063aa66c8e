//! termios plumbing for the input channel.
//!
//! # Safety
//! This module uses unsafe code for FFI calls to libc termios functions.

#![allow(unsafe_code)]
#![allow(clippy::borrow_as_ptr)]

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

/// Raw mode held on a file descriptor. Restores the saved attributes when
/// dropped.
#[derive(Debug)]
pub struct RawModeGuard {
    fd: RawFd,
    original: libc::termios,
}

impl RawModeGuard {
    /// Enter raw mode on `fd`.
    ///
    /// Reads return after at most 100ms so a polling loop stays responsive.
    pub fn new<F: AsRawFd>(fd: &F) -> io::Result<Self> {
        let fd = fd.as_raw_fd();
        let original = get_termios(fd)?;

        let mut raw = original;
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        raw.c_oflag &= !libc::OPOST;
        raw.c_cflag |= libc::CS8;
        // Keep ISIG off so Ctrl+C arrives as a byte the host can act on
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 1;

        set_termios(fd, &raw)?;
        Ok(Self { fd, original })
    }

    /// Restore the saved attributes now.
    pub fn restore(&self) -> io::Result<()> {
        set_termios(self.fd, &self.original)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Check if the given file descriptor is a TTY.
#[must_use]
pub fn is_tty<F: AsRawFd>(fd: &F) -> bool {
    // SAFETY: isatty is safe to call with any fd
    unsafe { libc::isatty(fd.as_raw_fd()) == 1 }
}

/// Check if `fd` is a terminal in non-canonical (raw) mode.
#[must_use]
pub fn is_raw<F: AsRawFd>(fd: &F) -> bool {
    get_termios(fd.as_raw_fd()).is_ok_and(|t| t.c_lflag & libc::ICANON == 0)
}

/// Tell the line discipline that input is UTF-8.
///
/// Only Linux has `IUTF8`; elsewhere this just validates the descriptor.
pub fn enable_utf8<F: AsRawFd>(fd: &F) -> io::Result<()> {
    let fd = fd.as_raw_fd();
    let termios = get_termios(fd)?;
    set_utf8_flag(fd, termios)
}

#[cfg(target_os = "linux")]
fn set_utf8_flag(fd: RawFd, mut termios: libc::termios) -> io::Result<()> {
    if termios.c_iflag & libc::IUTF8 == 0 {
        termios.c_iflag |= libc::IUTF8;
        set_termios(fd, &termios)?;
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn set_utf8_flag(_fd: RawFd, _termios: libc::termios) -> io::Result<()> {
    Ok(())
}

fn get_termios(fd: RawFd) -> io::Result<libc::termios> {
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: tcgetattr is safe when passed a valid termios struct
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(termios)
    }
}

fn set_termios(fd: RawFd, termios: &libc::termios) -> io::Result<()> {
    // SAFETY: tcsetattr is safe when passed a valid termios struct
    let result = unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, termios) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
