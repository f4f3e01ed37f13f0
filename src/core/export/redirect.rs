//! Redirect bookkeeping for one export chain

/// Consecutive redirects one export call will follow before giving up
pub const MAX_REDIRECTS: u32 = 10;

/// Count of consecutive redirects within one export call
///
/// Each call to `export` owns a fresh counter, so concurrent exports never see
/// each other's redirects. Any non-redirect outcome ends the chain, which is
/// how the count returns to zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RedirectState {
    consecutive: u32,
}

impl RedirectState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirects seen so far
    pub fn count(&self) -> u32 {
        self.consecutive
    }

    /// Record one redirect
    ///
    /// Returns false once the count reaches [`MAX_REDIRECTS`]; the caller must
    /// then stop following.
    pub fn record(&mut self) -> bool {
        self.consecutive += 1;
        self.consecutive < MAX_REDIRECTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(RedirectState::new().count(), 0);
    }

    #[test]
    fn test_allows_nine_redirects_and_stops_at_tenth() {
        let mut state = RedirectState::new();
        for expected in 1..MAX_REDIRECTS {
            assert!(state.record());
            assert_eq!(state.count(), expected);
        }
        assert!(!state.record());
        assert_eq!(state.count(), MAX_REDIRECTS);
    }
}
