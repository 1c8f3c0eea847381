//! Relay stream for the content proxy.
//!
//! Wraps the backend body so the read handle is released on every exit
//! path: normal completion, a read error, or the client going away and the
//! response body being dropped mid-transfer.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use tracing::{debug, warn};

pin_project! {
    /// Byte stream that owns a backend read handle and accounts for it.
    pub struct RelayStream<S> {
        #[pin]
        inner: S,
        key: String,
        bytes_sent: u64,
        finished: bool,
    }

    impl<S> PinnedDrop for RelayStream<S> {
        fn drop(this: Pin<&mut Self>) {
            let this = this.project();
            if *this.finished {
                debug!(key = %this.key, bytes = *this.bytes_sent, "Backend read handle released");
            } else {
                debug!(
                    key = %this.key,
                    bytes = *this.bytes_sent,
                    "Backend read handle released before end of stream"
                );
            }
        }
    }
}

impl<S> RelayStream<S> {
    /// Relay `inner`, labelling log lines with the object `key`.
    pub fn new(inner: S, key: impl Into<String>) -> Self {
        Self {
            inner,
            key: key.into(),
            bytes_sent: 0,
            finished: false,
        }
    }
}

impl<S> Stream for RelayStream<S>
where
    S: Stream<Item = Result<Bytes, io::Error>>,
{
    type Item = Result<Bytes, io::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.finished {
            return Poll::Ready(None);
        }

        match ready!(this.inner.poll_next(cx)) {
            Some(Ok(chunk)) => {
                *this.bytes_sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Some(Err(e)) => {
                warn!(key = %this.key, bytes = *this.bytes_sent, error = %e, "Backend read failed mid-stream");
                *this.finished = true;
                Poll::Ready(Some(Err(e)))
            }
            None => {
                *this.finished = true;
                Poll::Ready(None)
            }
        }
    }
}
