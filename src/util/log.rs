//! A minimal debug tracer, ported in spirit from the teacher's `Log<T>` level enum
//! (`util/logger.rs`) rather than pulled in from an external logging crate: the teacher
//! has no `log`/`tracing` dependency of its own, so this crate doesn't reach for one
//! either. Tracing is a no-op unless both `cfg(debug_assertions)` holds and the level
//! has been raised above `None`.

use once_cell::unsync::OnceCell;
use std::cell::Cell;

/// Verbosity levels, ordered low to high exactly like the teacher's `Log` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    None,
    Default,
    Success,
    Result,
    Verbose,
}

thread_local! {
    static LEVEL: Cell<Level> = Cell::new(Level::None);
}

/// Raise (or lower) the crate-wide trace level for the current thread.
///
/// There is exactly one lexer/parser pipeline in this crate (unlike the teacher, whose
/// many composable productions each get their own `set_log` label), so a single
/// thread-local cell stands in for the teacher's per-production `OnceCell<Log<&'static
/// str>>` debugger field.
pub fn set_level(level: Level) {
    LEVEL.with(|cell| cell.set(level));
}

pub fn level() -> Level {
    LEVEL.with(|cell| cell.get())
}

/// Emit a trace line if the current level is at or above `at`. Compiles to nothing in
/// release builds.
#[cfg_attr(not(debug_assertions), allow(unused_variables))]
pub fn trace(at: Level, make_message: impl FnOnce() -> String) {
    #[cfg(debug_assertions)]
    {
        if level() >= at {
            println!("[{:?}] {}", at, make_message());
        }
    }
}

/// A construction-time label a caller can set once on a long-lived value (mirrors the
/// teacher's `OnceCell<Log<&'static str>>` debugger field on each production).
#[derive(Default)]
pub struct Label(OnceCell<&'static str>);

impl Label {
    pub fn new() -> Self {
        Self(OnceCell::new())
    }

    pub fn set(&self, label: &'static str) -> Result<(), String> {
        self.0
            .set(label)
            .map_err(|existing| format!("label '{}' is already assigned", existing))
    }

    pub fn get(&self) -> &'static str {
        self.0.get().copied().unwrap_or("<unnamed>")
    }
}
