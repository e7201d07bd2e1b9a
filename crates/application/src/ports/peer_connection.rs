use async_trait::async_trait;

/// Handle on the peer connection that produces ICE candidates.
pub trait PeerConnection: Send {
    fn close(&mut self);
}

/// Checks whether the machine can reach an IPv6-only host.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn has_ipv6_connectivity(&self) -> bool;
}
