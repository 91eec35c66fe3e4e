use super::ErrorKind;

/// Capacity of the per-renderer error queue.
pub const MAX_ERRORS: usize = 30;

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Name of the public operation that failed.
    pub function: &'static str,
    pub kind: ErrorKind,
    pub details: String,
}

/// Bounded error stack.
///
/// Once full, new records are dropped so the earliest failures survive.
/// [`ErrorQueue::pop`] hands out the most recent surviving record first.
#[derive(Debug, Default)]
pub struct ErrorQueue {
    records: Vec<ErrorRecord>,
}

impl ErrorQueue {
    pub fn new() -> Self {
        Self {
            records: Vec::with_capacity(MAX_ERRORS),
        }
    }

    /// Returns `false` when the record was dropped because the queue is full.
    pub fn push(&mut self, function: &'static str, kind: ErrorKind, details: impl Into<String>) -> bool {
        if self.records.len() >= MAX_ERRORS {
            return false;
        }
        self.records.push(ErrorRecord {
            function,
            kind,
            details: details.into(),
        });
        true
    }

    pub fn pop(&mut self) -> Option<ErrorRecord> {
        self.records.pop()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_on_empty_returns_none() {
        assert_eq!(ErrorQueue::new().pop(), None);
    }

    #[test]
    fn pop_returns_most_recent_first() {
        let mut q = ErrorQueue::new();
        q.push("create_image", ErrorKind::InvalidArgument, "first");
        q.push("blit", ErrorKind::NullArgument, "second");

        let top = q.pop().unwrap();
        assert_eq!(top.function, "blit");
        assert_eq!(top.details, "second");
        assert_eq!(q.pop().unwrap().details, "first");
        assert!(q.is_empty());
    }

    #[test]
    fn overflow_drops_newest() {
        let mut q = ErrorQueue::new();
        for i in 0..MAX_ERRORS {
            assert!(q.push("op", ErrorKind::DataError, format!("e{i}")));
        }
        assert!(!q.push("op", ErrorKind::DataError, "overflow"));
        assert_eq!(q.len(), MAX_ERRORS);
        assert_eq!(q.pop().unwrap().details, format!("e{}", MAX_ERRORS - 1));
    }
}
