use std::io::{self, Read};

use tokio_util::sync::CancellationToken;

/// A reader that fails instead of delivering data once cancellation has
/// been requested.
///
/// Wrapping an archive entry's stream in this makes an in-flight copy stop
/// at its next read boundary rather than running a large remaining transfer
/// to completion. The token is polled before every read; the wrapper never
/// blocks on it.
pub struct CancelReader<R> {
    token: CancellationToken,
    inner: R,
}

impl<R: Read> CancelReader<R> {
    pub fn new(token: CancellationToken, inner: R) -> Self {
        Self { token, inner }
    }
}

impl<R: Read> Read for CancelReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.token.is_cancelled() {
            // Not ErrorKind::Interrupted: io::copy would transparently
            // retry that and the copy would never stop.
            return Err(io::Error::other("operation canceled"));
        }
        self.inner.read(buf)
    }
}
