use thiserror::Error;

/// Capacity used when a buffer is requested with zero slots
const DEFAULT_CAPACITY: usize = 100;

/// Errors returned by [`LogBuffer::get`]
#[derive(Debug, Error)]
pub enum BufferError {
    /// A window of zero lines can never return anything
    #[error("limit must be positive")]
    ZeroLimit,
}

/// Fixed-capacity ring buffer of raw log lines.
///
/// Holds at most `capacity` lines; pushing into a full buffer evicts the
/// oldest line. Lines are kept in arrival order, which the scanner treats as
/// chronological order.
#[derive(Clone, Debug)]
pub struct LogBuffer {
    /// Backing storage, grows to capacity and is then reused in place
    lines: Vec<String>,

    /// Index of the oldest line
    start: usize,

    /// Index of the slot the next line lands in
    end: usize,

    /// Number of lines currently held
    size: usize,

    /// Fixed slot count
    capacity: usize,
}

impl LogBuffer {
    /// Create a buffer holding at most `capacity` lines
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        Self {
            lines: Vec::with_capacity(capacity),
            start: 0,
            end: 0,
            size: 0,
            capacity,
        }
    }

    /// Push a line, evicting the oldest one if the buffer is full
    pub fn push(&mut self, line: String) {
        if self.lines.len() < self.capacity {
            self.lines.push(line);
        } else {
            self.lines[self.end] = line;
        }
        self.end = (self.end + 1) % self.capacity;
        if self.is_full() {
            self.start = (self.start + 1) % self.capacity;
        } else {
            self.size += 1;
        }
    }

    /// Get up to `limit` lines, skipping the `offset` most recent.
    ///
    /// The returned window is ordered oldest to newest. Asking for more than
    /// is available shrinks the window; skipping past everything returns an
    /// empty window.
    pub fn get(&self, offset: usize, limit: usize) -> Result<Vec<String>, BufferError> {
        if limit == 0 {
            return Err(BufferError::ZeroLimit);
        }
        if offset >= self.size {
            return Ok(Vec::new());
        }
        let available = self.size - offset;
        let count = limit.min(available);
        let first = available - count;
        let mut window = Vec::with_capacity(count);
        for i in 0..count {
            window.push(self.lines[(self.start + first + i) % self.capacity].clone());
        }
        Ok(window)
    }

    /// Get all lines, ordered oldest to newest
    pub fn all(&self) -> Vec<String> {
        (0..self.size)
            .map(|i| self.lines[(self.start + i) % self.capacity].clone())
            .collect()
    }

    /// Current line count
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Check if the next push will evict the oldest line
    pub fn is_full(&self) -> bool {
        self.size == self.capacity
    }

    /// Slot count the buffer was created with
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all lines, keeping the allocation and capacity
    pub fn clear(&mut self) {
        self.lines.clear();
        self.start = 0;
        self.end = 0;
        self.size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(buffer: &mut LogBuffer, range: std::ops::RangeInclusive<usize>) {
        for n in range {
            buffer.push(format!("line {n}"));
        }
    }

    #[test]
    fn test_keeps_everything_under_capacity() {
        let mut buffer = LogBuffer::new(5);
        fill(&mut buffer, 1..=3);
        assert_eq!(buffer.len(), 3);
        assert!(!buffer.is_full());
        assert_eq!(buffer.all(), ["line 1", "line 2", "line 3"]);
    }

    #[test]
    fn test_evicts_exactly_the_oldest_when_full() {
        let mut buffer = LogBuffer::new(3);
        fill(&mut buffer, 1..=3);
        assert!(buffer.is_full());

        buffer.push("line 4".to_string());
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.all(), ["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_all_after_wrap_around() {
        let mut buffer = LogBuffer::new(3);
        fill(&mut buffer, 1..=5);
        assert_eq!(buffer.all(), ["line 3", "line 4", "line 5"]);
    }

    #[test]
    fn test_get_full_window_equals_all() {
        let mut buffer = LogBuffer::new(3);
        fill(&mut buffer, 1..=7);
        assert_eq!(buffer.get(0, 3).unwrap(), buffer.all());
    }

    #[test]
    fn test_get_windows_after_wrap_around() {
        let mut buffer = LogBuffer::new(3);
        fill(&mut buffer, 1..=5);
        // Newest two.
        assert_eq!(buffer.get(0, 2).unwrap(), ["line 4", "line 5"]);
        // Skip the newest.
        assert_eq!(buffer.get(1, 2).unwrap(), ["line 3", "line 4"]);
        // Window shrinks near the oldest edge.
        assert_eq!(buffer.get(2, 2).unwrap(), ["line 3"]);
        // Skipping everything leaves nothing.
        assert!(buffer.get(3, 1).unwrap().is_empty());
    }

    #[test]
    fn test_get_clamps_oversized_limit() {
        let mut buffer = LogBuffer::new(4);
        fill(&mut buffer, 1..=2);
        assert_eq!(buffer.get(0, 10).unwrap(), ["line 1", "line 2"]);
    }

    #[test]
    fn test_get_rejects_zero_limit() {
        let buffer = LogBuffer::new(4);
        assert!(matches!(buffer.get(0, 0), Err(BufferError::ZeroLimit)));
    }

    #[test]
    fn test_get_on_empty_buffer() {
        let buffer = LogBuffer::new(4);
        assert!(buffer.get(0, 10).unwrap().is_empty());
    }

    #[test]
    fn test_zero_capacity_falls_back_to_default() {
        let mut buffer = LogBuffer::new(0);
        assert_eq!(buffer.capacity(), 100);
        buffer.push("line 1".to_string());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_clear_resets_for_reuse() {
        let mut buffer = LogBuffer::new(3);
        fill(&mut buffer, 1..=5);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 3);

        buffer.push("line 9".to_string());
        assert_eq!(buffer.all(), ["line 9"]);
    }
}
