use crate::control::OrientationSample;
use crate::{event, info, warn};
use std::io::ErrorKind;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::Sender;

/// Upper bound for one orientation frame; a longer length prefix means the
/// peer is not speaking the framing protocol.
const MAX_FRAME_LEN: usize = 512;

/// TCP endpoint receiving orientation frames from the head-tracker client.
///
/// One client is served at a time; each frame is a `u32` length prefix
/// followed by a JSON array of Euler angles, of which index 1 is the
/// yaw-like axis the translator consumes. Undecodable frames are dropped
/// with a warning, a broken connection goes back to accepting, and an
/// accept failure ends the endpoint, which the session observes as a source
/// fault through the closed sample channel.
pub struct OrientationEndpoint {
    listener: TcpListener,
}

impl OrientationEndpoint {
    pub async fn bind(port: u16) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        info!("listening for head-tracker clients on port {port}");
        Ok(Self { listener })
    }

    pub async fn serve(self, sample_tx: Sender<OrientationSample>) {
        loop {
            match self.listener.accept().await {
                Ok((socket, peer)) => {
                    info!("head tracker connected from {peer}");
                    match Self::pump_samples(socket, &sample_tx).await {
                        Ok(()) => return,
                        Err(e)
                            if e.kind() == ErrorKind::UnexpectedEof
                                || e.kind() == ErrorKind::ConnectionReset
                                || e.kind() == ErrorKind::ConnectionAborted =>
                        {
                            info!("head tracker disconnected");
                        }
                        Err(e) => warn!("head tracker connection closed: {e}"),
                    }
                }
                Err(e) => {
                    warn!("orientation endpoint cannot accept: {e}");
                    return;
                }
            }
        }
    }

    /// Forwards decoded samples until the connection or the session ends.
    /// `Ok` means the session side hung up, an `Err` is the connection.
    async fn pump_samples(
        mut socket: TcpStream,
        sample_tx: &Sender<OrientationSample>,
    ) -> Result<(), std::io::Error> {
        loop {
            let length = socket.read_u32().await?;
            if length as usize > MAX_FRAME_LEN {
                return Err(std::io::Error::new(
                    ErrorKind::InvalidData,
                    "oversized orientation frame",
                ));
            }
            let mut buffer = vec![0u8; length as usize];
            socket.read_exact(&mut buffer).await?;
            let Some(sample) = decode_frame(&buffer) else {
                warn!("dropping undecodable orientation frame");
                continue;
            };
            event!("orientation frame decoded to {}", sample.axis_value());
            if sample_tx.send(sample).await.is_err() {
                return Ok(());
            }
        }
    }
}

/// Extracts the yaw-like axis (index 1) from a JSON angle array. `None` for
/// frames that do not decode, hold fewer than two angles, or carry a
/// non-finite value.
pub(crate) fn decode_frame(payload: &[u8]) -> Option<OrientationSample> {
    let angles: Vec<f64> = serde_json::from_slice(payload).ok()?;
    let axis = *angles.get(1)?;
    if !axis.is_finite() {
        return None;
    }
    Some(OrientationSample::from_raw(axis))
}
