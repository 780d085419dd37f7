//! # Frame Input Module
//!
//! Reads control frames as text lines and hands them to the control loop.
//!
//! Each line holds the four joystick values, separated by whitespace or
//! commas. Blank lines and lines starting with `#` are ignored, so recorded
//! sessions can carry comments:
//!
//! ```text
//! # full forward, slight left
//! 12 512 512 412
//! 512,512,512,512
//! ```

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::control::frame::ControlFrame;
use crate::error::Result;

/// Forwards every valid frame line from `reader` to `tx`.
///
/// Invalid lines, including lines that are not UTF-8, are logged and
/// skipped. Stops at end of input or when the receiving side is dropped.
///
/// # Returns
///
/// Number of frames forwarded.
///
/// # Errors
///
/// Returns error if reading from `reader` fails.
///
/// # Examples
///
/// ```
/// use carbot::input::forward_frames;
/// use tokio::sync::mpsc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> carbot::error::Result<()> {
/// let (tx, mut rx) = mpsc::channel(4);
/// let forwarded = forward_frames(&b"512 512 512 512\n"[..], tx).await?;
///
/// assert_eq!(forwarded, 1);
/// assert!(rx.recv().await.is_some());
/// # Ok(())
/// # }
/// ```
pub async fn forward_frames<R>(reader: R, tx: mpsc::Sender<ControlFrame>) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut reader = reader;
    let mut buf = Vec::new();
    let mut forwarded: u64 = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim(),
            Err(e) => {
                warn!("Skipping control frame line that is not UTF-8: {}", e);
                continue;
            }
        };
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.parse::<ControlFrame>() {
            Ok(frame) => {
                if tx.send(frame).await.is_err() {
                    debug!("Frame receiver dropped, stopping input");
                    break;
                }
                forwarded += 1;
            }
            Err(e) => warn!("Skipping control frame '{}': {}", line, e),
        }
    }

    debug!("Forwarded {} frames", forwarded);
    Ok(forwarded)
}
