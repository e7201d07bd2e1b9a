use crate::ports::{Clock, ConnectivityProbe, PeerConnection};
use ipmon_domain::{CandidateCollector, CollectorState, DetectedAddresses, PublicIpReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Closes the wrapped peer at most once, on `close()` or on drop.
struct PeerGuard<P: PeerConnection> {
    peer: Option<P>,
}

impl<P: PeerConnection> PeerGuard<P> {
    fn close(&mut self) {
        if let Some(mut peer) = self.peer.take() {
            peer.close();
        }
    }
}

impl<P: PeerConnection> Drop for PeerGuard<P> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Discovers the user's public addresses from ICE candidates.
pub struct PublicIpDetector {
    probe: Arc<dyn ConnectivityProbe>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl PublicIpDetector {
    pub fn new(
        probe: Arc<dyn ConnectivityProbe>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            probe,
            clock,
            timeout,
        }
    }

    /// Feeds candidates into a collector until both public families are
    /// known or the timeout fires. End of the candidate stream does not end
    /// collection early.
    pub async fn detect<P: PeerConnection>(
        &self,
        peer: P,
        mut candidates: mpsc::Receiver<String>,
    ) -> DetectedAddresses {
        let mut guard = PeerGuard { peer: Some(peer) };
        let mut collector = CandidateCollector::new();
        let mut stream_open = true;

        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    debug!(found = ?collector.found(), "Candidate collection timed out");
                    collector.time_out();
                    break;
                }
                candidate = candidates.recv(), if stream_open => match candidate {
                    Some(line) => {
                        if collector.offer(&line) == CollectorState::Complete {
                            break;
                        }
                    }
                    None => stream_open = false,
                },
            }
        }

        guard.close();
        collector.finish().unwrap_or_default()
    }

    /// Runs detection and the IPv6 connectivity probe together.
    pub async fn report<P: PeerConnection>(
        &self,
        peer: P,
        candidates: mpsc::Receiver<String>,
        url: Option<String>,
    ) -> PublicIpReport {
        let (detected, has_ipv6) = tokio::join!(
            self.detect(peer, candidates),
            self.probe.has_ipv6_connectivity()
        );
        PublicIpReport::new(detected, has_ipv6, url, self.clock.now())
    }
}
