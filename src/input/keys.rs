use crate::{info, warn};
use strum_macros::Display;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc::Sender;

const KEY_SPACE: u8 = 0x20;
const KEY_ESC: u8 = 0x1b;
const KEY_CTRL_C: u8 = 0x03;

/// A keypress already mapped to its control meaning. The session turns these
/// into link commands; this module never touches the link itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum KeyAction {
    TakeOff,
    Land,
    Halt,
    Recover,
    Blink,
    StrafeLeft,
    StrafeRight,
    Forward,
    Backward,
    Down,
    Up,
    TurnLeft,
    TurnRight,
    Shutdown,
}

/// Maps a raw key byte to its action. Unmapped bytes are ignored.
pub fn map_key(key: u8) -> Option<KeyAction> {
    match key {
        b't' => Some(KeyAction::TakeOff),
        b'l' => Some(KeyAction::Land),
        KEY_SPACE => Some(KeyAction::Halt),
        KEY_ESC | KEY_CTRL_C => Some(KeyAction::Shutdown),
        b'r' => Some(KeyAction::Recover),
        b'b' => Some(KeyAction::Blink),
        b'a' => Some(KeyAction::StrafeLeft),
        b'd' => Some(KeyAction::StrafeRight),
        b'w' => Some(KeyAction::Forward),
        b's' => Some(KeyAction::Backward),
        b'1' => Some(KeyAction::Down),
        b'2' => Some(KeyAction::Up),
        b'q' => Some(KeyAction::TurnLeft),
        b'e' => Some(KeyAction::TurnRight),
        _ => None,
    }
}

fn print_key_bindings() {
    println!("T - Takeoff drone");
    println!("L - Land drone");
    println!("SPACE - Stop whole drone movement");
    println!("ESC - Stop movement, land the drone and quit");
    println!("R - Recover from emergency");
    println!("B - Blinking LEDs");
    println!("W - Fly forward");
    println!("S - Fly backward");
    println!("A - Fly left");
    println!("D - Fly right");
    println!("1 - Fly down");
    println!("2 - Fly up");
    println!("Q - Turn counter clockwise");
    println!("E - Turn clockwise");
    println!("\r");
}

/// Restores the saved terminal attributes when dropped. Raw input only;
/// output post-processing is left untouched so log lines stay intact.
struct RawModeGuard {
    saved: libc::termios,
}

impl RawModeGuard {
    fn enable() -> Option<Self> {
        // SAFETY: plain termios syscalls on stdin with a zero-initialized,
        // kernel-filled struct.
        unsafe {
            if libc::isatty(libc::STDIN_FILENO) == 0 {
                return None;
            }
            let mut saved: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(libc::STDIN_FILENO, &raw mut saved) != 0 {
                return None;
            }
            let mut attrs = saved;
            attrs.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ISIG);
            attrs.c_cc[libc::VMIN] = 1;
            attrs.c_cc[libc::VTIME] = 0;
            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &raw const attrs) != 0 {
                return None;
            }
            Some(Self { saved })
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // SAFETY: restoring the attributes captured in enable().
        unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &raw const self.saved);
        }
    }
}

/// Captures terminal keypresses in raw mode and forwards mapped actions to
/// the session. Ends on the shutdown key, stdin closing, or a read error;
/// the terminal attributes are restored on the way out.
pub async fn run_key_input(action_tx: Sender<KeyAction>) {
    let Some(_guard) = RawModeGuard::enable() else {
        warn!("stdin is not a terminal, key mapping disabled");
        return;
    };
    info!("key mapping started");
    print_key_bindings();

    let mut stdin = tokio::io::stdin();
    let mut byte = [0u8; 1];
    loop {
        match stdin.read(&mut byte).await {
            Ok(0) => {
                info!("stdin closed, key mapping ended");
                return;
            }
            Ok(_) => {
                let Some(action) = map_key(byte[0]) else { continue };
                if action_tx.send(action).await.is_err() || action == KeyAction::Shutdown {
                    return;
                }
            }
            Err(e) => {
                warn!("key input failed: {e}");
                return;
            }
        }
    }
}
