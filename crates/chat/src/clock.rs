/// Produces the display timestamps recorded on messages.
pub trait Clock: Send + Sync {
    fn timestamp(&self) -> String;
}

/// Local wall-clock time formatted as `HH:MM:SS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp(&self) -> String {
        murmur_transport::display_time()
    }
}
