use super::command::FlightCommand;
use crate::{event, info, warn};
use serde::Deserialize;
use strum_macros::Display;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Upper bound for a single telemetry frame, anything larger is treated as
/// a framing failure.
const MAX_FRAME_LEN: usize = 1024;

/// Telemetry events decoded from the link's downstream frames.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LinkEvent {
    Battery { percent: i32 },
    Flying,
    Landed,
    Altitude { metres: f32 },
}

#[derive(Debug, Display)]
pub enum LinkError {
    #[strum(to_string = "link connect to {addr} failed: {detail}")]
    Connect { addr: String, detail: String },
    #[strum(to_string = "link write failed: {detail}")]
    Write { detail: String },
    #[strum(to_string = "command not encodable: {detail}")]
    Encode { detail: String },
}

/// Fire-and-forget dispatch facade over the flight command link.
///
/// Commands cross an unbounded channel to a writer task; `dispatch` never
/// blocks and never reports completion. A write failure is logged and the
/// command is dropped, there is no retry anywhere on this path.
#[derive(Debug, Clone)]
pub struct DroneClient {
    command_tx: mpsc::UnboundedSender<FlightCommand>,
}

impl DroneClient {
    /// Connects to the link daemon and applies the session tuning the drone
    /// expects before any motion command: full telemetry, yaw and tilt
    /// limits, then a latched-emergency clear and a stop.
    pub async fn connect(addr: &str) -> Result<(Self, mpsc::Receiver<LinkEvent>), LinkError> {
        let stream = TcpStream::connect(addr).await.map_err(|e| LinkError::Connect {
            addr: String::from(addr),
            detail: e.to_string(),
        })?;
        info!("flight command link up at {addr}");
        Ok(Self::from_stream(stream))
    }

    /// Wires a client onto an established bidirectional stream and spawns
    /// the writer and telemetry reader tasks.
    pub(crate) fn from_stream<S>(stream: S) -> (Self, mpsc::Receiver<LinkEvent>)
    where S: AsyncRead + AsyncWrite + Send + 'static {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (telemetry_tx, telemetry_rx) = mpsc::channel(32);
        let (reader, writer) = tokio::io::split(stream);
        tokio::spawn(run_writer(writer, command_rx));
        tokio::spawn(run_reader(reader, telemetry_tx));
        let client = Self { command_tx };
        client.apply_session_tuning();
        (client, telemetry_rx)
    }

    fn apply_session_tuning(&self) {
        self.dispatch(FlightCommand::Config {
            key: String::from("general:navdata_demo"),
            value: String::from("FALSE"),
        });
        self.dispatch(FlightCommand::Config {
            key: String::from("control:control_yaw"),
            value: String::from("6.1"),
        });
        self.dispatch(FlightCommand::Config {
            key: String::from("control:euler_angle_max"),
            value: String::from("0.25"),
        });
        self.dispatch(FlightCommand::DisableEmergency);
        self.dispatch(FlightCommand::Stop);
    }

    /// Enqueues a command for the writer task. Non-blocking; a dead link
    /// task downgrades to a warning and the command is dropped.
    pub fn dispatch(&self, command: FlightCommand) {
        event!("dispatching {command}");
        if self.command_tx.send(command).is_err() {
            warn!("link writer is gone, command dropped");
        }
    }

    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::UnboundedReceiver<FlightCommand>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        (Self { command_tx }, command_rx)
    }
}

async fn run_writer<S>(
    mut writer: WriteHalf<S>,
    mut command_rx: mpsc::UnboundedReceiver<FlightCommand>,
) where
    S: AsyncRead + AsyncWrite,
{
    while let Some(command) = command_rx.recv().await {
        if let Err(e) = write_frame(&mut writer, &command).await {
            warn!("{e}");
        }
    }
}

async fn run_reader<S>(mut reader: ReadHalf<S>, telemetry_tx: mpsc::Sender<LinkEvent>)
where S: AsyncRead + AsyncWrite {
    loop {
        match read_frame(&mut reader).await {
            Ok(Some(event)) => {
                if telemetry_tx.send(event).await.is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(_) => {
                info!("link telemetry stream ended");
                return;
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
async fn write_frame<W>(writer: &mut W, command: &FlightCommand) -> Result<(), LinkError>
where W: AsyncWrite + Unpin {
    let payload =
        serde_json::to_vec(command).map_err(|e| LinkError::Encode { detail: e.to_string() })?;
    let write = async {
        writer.write_u32(payload.len() as u32).await?;
        writer.write_all(&payload).await?;
        writer.flush().await
    };
    write.await.map_err(|e| LinkError::Write { detail: e.to_string() })
}

async fn read_frame<R>(reader: &mut R) -> Result<Option<LinkEvent>, std::io::Error>
where R: AsyncRead + Unpin {
    let length = reader.read_u32().await?;
    if length as usize > MAX_FRAME_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "oversized telemetry frame",
        ));
    }
    let mut buffer = vec![0u8; length as usize];
    reader.read_exact(&mut buffer).await?;
    match serde_json::from_slice::<LinkEvent>(&buffer) {
        Ok(event) => Ok(Some(event)),
        Err(e) => {
            warn!("dropping undecodable telemetry frame: {e}");
            Ok(None)
        }
    }
}
