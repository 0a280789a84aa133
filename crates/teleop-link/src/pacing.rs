use std::time::{Duration, Instant};

/// Keeps consecutive commands at least `min_interval` apart.
#[derive(Debug)]
pub struct CommandPacer {
    last: Option<Instant>,
    min_interval: Duration,
}

impl CommandPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self { last: None, min_interval }
    }

    /// Time left before the next command may go out.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(t) => self.min_interval.saturating_sub(now.duration_since(t)),
            None => Duration::ZERO,
        }
    }

    pub async fn wait(&mut self) {
        let d = self.remaining(Instant::now());
        if !d.is_zero() {
            tokio::time::sleep(d).await;
        }
        self.last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_command_is_immediate() {
        let p = CommandPacer::new(Duration::from_millis(100));
        assert_eq!(p.remaining(Instant::now()), Duration::ZERO);
    }

    #[tokio::test]
    async fn second_command_waits() {
        let mut p = CommandPacer::new(Duration::from_millis(40));
        p.wait().await;
        let start = Instant::now();
        assert!(p.remaining(start) > Duration::ZERO);
        p.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
