use super::{DroneClient, FlightCommand, LedAnimation, LinkEvent};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::time::{Duration, timeout};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

async fn read_test_frame(stream: &mut DuplexStream) -> Value {
    let length = stream.read_u32().await.unwrap();
    let mut buffer = vec![0u8; length as usize];
    stream.read_exact(&mut buffer).await.unwrap();
    serde_json::from_slice(&buffer).unwrap()
}

#[allow(clippy::cast_possible_truncation)]
async fn write_test_frame(stream: &mut DuplexStream, frame: &Value) {
    let payload = serde_json::to_vec(frame).unwrap();
    stream.write_u32(payload.len() as u32).await.unwrap();
    stream.write_all(&payload).await.unwrap();
}

#[test]
fn command_frames_are_tagged_json() {
    let frame = serde_json::to_value(FlightCommand::CounterClockwise { speed: 0.5 }).unwrap();
    assert_eq!(frame, json!({"cmd": "counter_clockwise", "speed": 0.5}));
    let frame = serde_json::to_value(FlightCommand::Stop).unwrap();
    assert_eq!(frame, json!({"cmd": "stop"}));
    let frame = serde_json::to_value(FlightCommand::AnimateLeds {
        animation: LedAnimation::BlinkGreenRed,
        rate_hz: 5,
        duration_s: 2,
    })
    .unwrap();
    assert_eq!(
        frame,
        json!({"cmd": "animate_leds", "animation": "blink-green-red", "rate_hz": 5, "duration_s": 2})
    );
}

#[test]
fn telemetry_frames_decode() {
    let event: LinkEvent = serde_json::from_str(r#"{"event": "battery", "percent": 42}"#).unwrap();
    assert_eq!(event, LinkEvent::Battery { percent: 42 });
    let event: LinkEvent = serde_json::from_str(r#"{"event": "flying"}"#).unwrap();
    assert_eq!(event, LinkEvent::Flying);
    assert!(serde_json::from_str::<LinkEvent>(r#"{"event": "warp"}"#).is_err());
}

#[tokio::test]
async fn connect_applies_session_tuning() {
    let (near, mut far) = tokio::io::duplex(4096);
    let (_client, _telemetry_rx) = DroneClient::from_stream(near);

    let expected = [
        json!({"cmd": "config", "key": "general:navdata_demo", "value": "FALSE"}),
        json!({"cmd": "config", "key": "control:control_yaw", "value": "6.1"}),
        json!({"cmd": "config", "key": "control:euler_angle_max", "value": "0.25"}),
        json!({"cmd": "disable_emergency"}),
        json!({"cmd": "stop"}),
    ];
    for frame in expected {
        let got = timeout(RECV_TIMEOUT, read_test_frame(&mut far)).await.unwrap();
        assert_eq!(got, frame);
    }
}

#[tokio::test]
async fn dispatched_commands_reach_the_wire_in_order() {
    let (near, mut far) = tokio::io::duplex(4096);
    let (client, _telemetry_rx) = DroneClient::from_stream(near);
    for _ in 0..5 {
        // skip the tuning preamble
        timeout(RECV_TIMEOUT, read_test_frame(&mut far)).await.unwrap();
    }

    client.dispatch(FlightCommand::TakeOff);
    client.dispatch(FlightCommand::Clockwise { speed: 0.5 });
    client.dispatch(FlightCommand::Land);

    let got = timeout(RECV_TIMEOUT, read_test_frame(&mut far)).await.unwrap();
    assert_eq!(got, json!({"cmd": "take_off"}));
    let got = timeout(RECV_TIMEOUT, read_test_frame(&mut far)).await.unwrap();
    assert_eq!(got, json!({"cmd": "clockwise", "speed": 0.5}));
    let got = timeout(RECV_TIMEOUT, read_test_frame(&mut far)).await.unwrap();
    assert_eq!(got, json!({"cmd": "land"}));
}

#[tokio::test]
async fn telemetry_reaches_the_session_and_bad_frames_are_skipped() {
    let (near, mut far) = tokio::io::duplex(4096);
    let (_client, mut telemetry_rx) = DroneClient::from_stream(near);

    write_test_frame(&mut far, &json!({"event": "battery", "percent": 64})).await;
    write_test_frame(&mut far, &json!({"event": "no_such_event"})).await;
    write_test_frame(&mut far, &json!({"event": "landed"})).await;

    let got = timeout(RECV_TIMEOUT, telemetry_rx.recv()).await.unwrap();
    assert_eq!(got, Some(LinkEvent::Battery { percent: 64 }));
    let got = timeout(RECV_TIMEOUT, telemetry_rx.recv()).await.unwrap();
    assert_eq!(got, Some(LinkEvent::Landed));
}
