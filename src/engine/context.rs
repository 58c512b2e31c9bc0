//! Nested diagnostic context, kept per thread.

use std::cell::RefCell;

thread_local! {
    static STACK: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Handle to the calling thread's diagnostic context.
///
/// Entries pushed on one thread are never seen by records written from another.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogContext;

impl LogContext {
    pub fn push(&self, entry: impl Into<String>) {
        STACK.with(|stack| stack.borrow_mut().push(entry.into()));
    }

    /// Clears the whole stack, not just the last entry.
    pub fn pop(&self) {
        STACK.with(|stack| stack.borrow_mut().clear());
    }

    /// Entries joined by single spaces; empty when nothing was pushed.
    pub fn current(&self) -> String {
        STACK.with(|stack| stack.borrow().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_joins_and_pop_clears() {
        let context = LogContext;
        assert_eq!(context.current(), "");
        context.push("request-42");
        context.push("user=ann");
        assert_eq!(context.current(), "request-42 user=ann");

        context.pop();
        assert_eq!(context.current(), "");
        context.push("after");
        assert_eq!(context.current(), "after");
        context.pop();
    }

    #[test]
    fn context_is_per_thread() {
        let context = LogContext;
        context.push("main");
        let other = std::thread::spawn(|| LogContext.current()).join().unwrap();
        assert_eq!(other, "");
        assert_eq!(context.current(), "main");
        context.pop();
    }
}
