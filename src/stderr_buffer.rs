use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);
static VERBOSE: AtomicBool = AtomicBool::new(false);

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Enable or disable `--verbose` diagnostics
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Start holding messages back (the TUI owns the terminal)
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Stop buffering and return everything collected meanwhile.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

/// Write a warning. Buffered while active, printed to stderr otherwise.
pub fn warn(msg: String) {
    let mut guard = buffer();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// Like [`warn`], but only when verbose diagnostics are on
pub fn debug(msg: String) {
    if is_verbose() {
        warn(msg);
    }
}

/// Works like `eprintln!` but routes through the stderr buffer when it is
/// active.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::warn(format!($($arg)*))
    };
}

/// `buffered_eprintln!` that only prints with `--verbose`.
#[macro_export]
macro_rules! verbose_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::debug(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffering_collects_and_drains() {
        activate();
        warn("first".to_string());
        crate::buffered_eprintln!("second {}", 2);
        let messages = drain();
        assert_eq!(messages, vec!["first".to_string(), "second 2".to_string()]);
        assert!(drain().is_empty());
    }
}
