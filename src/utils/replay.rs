//! Sliding-window replay detection for data-channel packet ids.
//!
//! The decrypter surfaces each packet's sequence number; this window is
//! the collaborator that decides whether that number has been seen. Data
//! packets may reorder a little in flight, so a plain high-water mark
//! would drop legitimate traffic; a bitmap over the most recent ids
//! accepts bounded reordering while still refusing every duplicate.

use tracing::warn;

/// Number of packet ids the window remembers behind the highest seen.
const WINDOW_SIZE: u32 = 64;

/// 64-entry sliding replay window over 32-bit packet ids.
///
/// One window guards one (key, direction); reset it on key rotation
/// together with the packet-id sequence.
#[derive(Debug, Default)]
pub struct ReplayWindow {
    /// Highest packet id accepted so far.
    top: u32,
    /// Bit `n` set means `top - n` was seen.
    bitmap: u64,
    /// Whether any packet has been accepted yet.
    primed: bool,
}

impl ReplayWindow {
    /// Creates an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts or rejects a packet id, recording it when accepted.
    ///
    /// Returns `true` for fresh ids. Duplicates and ids older than the
    /// window are rejected.
    pub fn check_and_update(&mut self, packet_id: u32) -> bool {
        if !self.primed {
            self.primed = true;
            self.top = packet_id;
            self.bitmap = 1;
            return true;
        }

        if packet_id > self.top {
            let advance = packet_id - self.top;
            self.bitmap = if advance >= WINDOW_SIZE {
                1
            } else {
                (self.bitmap << advance) | 1
            };
            self.top = packet_id;
            return true;
        }

        let behind = self.top - packet_id;
        if behind >= WINDOW_SIZE {
            warn!(packet_id, top = self.top, "packet id older than replay window");
            return false;
        }

        let mask = 1u64 << behind;
        if self.bitmap & mask != 0 {
            warn!(packet_id, "replayed packet id");
            return false;
        }
        self.bitmap |= mask;
        true
    }

    /// Clears the window, e.g. across a key rotation.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_ids_accepted() {
        let mut window = ReplayWindow::new();
        for packet_id in 0..100 {
            assert!(window.check_and_update(packet_id));
        }
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut window = ReplayWindow::new();
        assert!(window.check_and_update(5));
        assert!(!window.check_and_update(5));

        assert!(window.check_and_update(6));
        assert!(!window.check_and_update(5));
        assert!(!window.check_and_update(6));
    }

    #[test]
    fn test_bounded_reordering_accepted() {
        let mut window = ReplayWindow::new();
        assert!(window.check_and_update(10));
        assert!(window.check_and_update(8));
        assert!(window.check_and_update(9));
        assert!(!window.check_and_update(8));
    }

    #[test]
    fn test_ids_older_than_window_rejected() {
        let mut window = ReplayWindow::new();
        assert!(window.check_and_update(1000));
        assert!(!window.check_and_update(1000 - WINDOW_SIZE));
        assert!(window.check_and_update(1000 - WINDOW_SIZE + 1));
    }

    #[test]
    fn test_large_jump_clears_bitmap() {
        let mut window = ReplayWindow::new();
        assert!(window.check_and_update(1));
        assert!(window.check_and_update(1 + 2 * WINDOW_SIZE));
        // The old id fell out of the window entirely.
        assert!(!window.check_and_update(1));
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut window = ReplayWindow::new();
        assert!(window.check_and_update(42));
        window.reset();
        assert!(window.check_and_update(42));
    }
}
