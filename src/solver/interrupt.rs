use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use separator::Separatable;

/// What the solver reports when it yields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub explored: usize,
    pub elapsed: Duration,
}

impl Progress {
    /// States per second
    pub fn speed(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.explored as f64 / secs
        } else {
            0.0
        }
    }
}

impl Display for Progress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Explored: {}     Time: {:.2}s     Speed: {:.2} states/s",
            (self.explored as u64).separated_string(),
            self.elapsed.as_secs_f64(),
            self.speed()
        )
    }
}

/// Polled by the solver at fixed intervals. Returning `true` cancels the search.
///
/// This is the only point where the solver hands control back to its caller
/// so it's also the place to report progress.
pub trait Interrupt {
    fn check(&mut self, progress: &Progress) -> bool;
}

impl<F> Interrupt for F
where
    F: FnMut(&Progress) -> bool,
{
    fn check(&mut self, progress: &Progress) -> bool {
        self(progress)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Interrupt for NeverCancel {
    fn check(&mut self, _progress: &Progress) -> bool {
        false
    }
}

/// Cancellation flag which can be set from elsewhere, e.g. another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Interrupt for CancelToken {
    fn check(&mut self, _progress: &Progress) -> bool {
        self.is_cancelled()
    }
}

/// Cancels once the search has been running for `limit`.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    limit: Duration,
}

impl Deadline {
    pub fn new(limit: Duration) -> Self {
        Deadline { limit }
    }
}

impl Interrupt for Deadline {
    fn check(&mut self, progress: &Progress) -> bool {
        progress.elapsed >= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(explored: usize, millis: u64) -> Progress {
        Progress {
            explored,
            elapsed: Duration::from_millis(millis),
        }
    }

    #[test]
    fn token_shared_between_clones() {
        let token = CancelToken::new();
        let mut other = token.clone();
        assert!(!other.check(&progress(0, 0)));
        token.cancel();
        assert!(other.check(&progress(0, 0)));
    }

    #[test]
    fn deadline() {
        let mut deadline = Deadline::new(Duration::from_secs(1));
        assert!(!deadline.check(&progress(10, 999)));
        assert!(deadline.check(&progress(10, 1000)));
    }

    #[test]
    fn closures() {
        let mut calls = 0;
        {
            let mut interrupt = |p: &Progress| {
                calls += 1;
                p.explored > 5
            };
            assert!(!interrupt.check(&progress(5, 0)));
            assert!(interrupt.check(&progress(6, 0)));
        }
        assert_eq!(calls, 2);
        assert!(!NeverCancel.check(&progress(1_000_000, 1_000_000)));
    }

    #[test]
    fn formatting() {
        assert_eq!(
            progress(2000, 500).to_string(),
            "Explored: 2,000     Time: 0.50s     Speed: 4000.00 states/s"
        );
        assert_eq!(progress(0, 0).speed(), 0.0);
    }
}
