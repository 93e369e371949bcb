use super::keys::map_key;
use super::orientation::decode_frame;
use super::KeyAction;

#[test]
fn frame_decoding_extracts_the_second_axis() {
    let sample = decode_frame(b"[0.1, 0.52, -0.9]").unwrap();
    assert_eq!(sample.axis_value(), 0.52);
}

#[test]
fn frame_decoding_floors_to_two_decimals() {
    let sample = decode_frame(b"[0.0, 0.299999]").unwrap();
    assert_eq!(sample.axis_value(), 0.29);
    // Math-floor semantics: negative values round away from zero.
    let sample = decode_frame(b"[0.0, -0.299999]").unwrap();
    assert_eq!(sample.axis_value(), -0.3);
}

#[test]
fn malformed_frames_are_dropped() {
    assert!(decode_frame(b"not json").is_none());
    assert!(decode_frame(b"[0.1]").is_none());
    assert!(decode_frame(b"{\"yaw\": 0.5}").is_none());
    assert!(decode_frame(b"[0.0, \"sideways\"]").is_none());
}

#[test]
fn every_bound_key_maps_to_its_action() {
    assert_eq!(map_key(b't'), Some(KeyAction::TakeOff));
    assert_eq!(map_key(b'l'), Some(KeyAction::Land));
    assert_eq!(map_key(0x20), Some(KeyAction::Halt));
    assert_eq!(map_key(0x1b), Some(KeyAction::Shutdown));
    assert_eq!(map_key(0x03), Some(KeyAction::Shutdown));
    assert_eq!(map_key(b'r'), Some(KeyAction::Recover));
    assert_eq!(map_key(b'b'), Some(KeyAction::Blink));
    assert_eq!(map_key(b'a'), Some(KeyAction::StrafeLeft));
    assert_eq!(map_key(b'd'), Some(KeyAction::StrafeRight));
    assert_eq!(map_key(b'w'), Some(KeyAction::Forward));
    assert_eq!(map_key(b's'), Some(KeyAction::Backward));
    assert_eq!(map_key(b'1'), Some(KeyAction::Down));
    assert_eq!(map_key(b'2'), Some(KeyAction::Up));
    assert_eq!(map_key(b'q'), Some(KeyAction::TurnLeft));
    assert_eq!(map_key(b'e'), Some(KeyAction::TurnRight));
}

#[test]
fn unbound_keys_are_ignored() {
    assert_eq!(map_key(b'z'), None);
    assert_eq!(map_key(b'0'), None);
    assert_eq!(map_key(0x0a), None);
}
