//! Tests for the shared execution history.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use chrono::Utc;

    use crate::context::{DEFAULT_HISTORY_CAPACITY, ExecutionRecord, HistoryLog};

    fn record(n: usize) -> ExecutionRecord {
        ExecutionRecord::new(
            format!("command_{}", n),
            "bash",
            format!("output_{}\n", n),
            (n % 3) as i32,
            Utc::now(),
            Duration::from_millis(n as u64),
        )
    }

    #[test]
    fn test_overflow_keeps_most_recent() {
        let log = HistoryLog::new(DEFAULT_HISTORY_CAPACITY);
        for i in 1..=110 {
            log.append(record(i));
        }

        let entries = log.recent(0);
        assert_eq!(entries.len(), 100);
        assert_eq!(entries.first().map(|r| r.command.as_str()), Some("command_110"));
        assert_eq!(entries.last().map(|r| r.command.as_str()), Some("command_11"));
        for (offset, entry) in entries.iter().enumerate() {
            assert_eq!(entry.command, format!("command_{}", 110 - offset));
        }
    }

    #[test]
    fn test_lifo_order_for_exact_fill() {
        let log = HistoryLog::new(8);
        let appended: Vec<ExecutionRecord> = (1..=8).map(record).collect();
        for r in &appended {
            log.append(r.clone());
        }
        let mut expected = appended;
        expected.reverse();
        assert_eq!(log.recent(8), expected);
    }

    #[test]
    fn test_concurrent_appends() {
        let log = Arc::new(HistoryLog::new(50));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..25 {
                        log.append(record(t * 100 + i));
                        let _snapshot = log.recent(5);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.len(), 50);
        let entries = log.recent(0);
        let mut seen: Vec<&str> = entries.iter().map(|r| r.command.as_str()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 50);
    }
}
