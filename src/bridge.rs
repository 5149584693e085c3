// ================================
// src/bridge.rs - line transport: scans in, commands out
// ================================
//
// Input, one frame per line:   cx cy r0 r1 ... rN
// Output, one command per line: linear angular
use crate::control::VelocityCommand;
use crate::error::{NavError, Result};
use crate::node::{CommandSink, ScanFrame};
use crate::target::TargetCandidate;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub fn parse_frame(line: &str) -> Result<ScanFrame> {
    let mut values = line.split_whitespace().map(|token| {
        token
            .parse::<f64>()
            .map_err(|e| NavError::Frame(format!("bad value {:?}: {}", token, e)))
    });

    let x = values
        .next()
        .ok_or_else(|| NavError::Frame("missing target x".into()))??;
    let y = values
        .next()
        .ok_or_else(|| NavError::Frame("missing target y".into()))??;
    let ranges = values
        .map(|value| value.map(|v| v as f32))
        .collect::<Result<Vec<f32>>>()?;

    if ranges.is_empty() {
        return Err(NavError::Frame("no range readings".into()));
    }

    Ok(ScanFrame::new(ranges, TargetCandidate::new(x, y)))
}

/// Decodes one raw line. Blank lines and `#` comments yield `None`; text
/// that is not UTF-8 is a recoverable frame error.
fn frame_from_bytes(raw: &[u8]) -> Result<Option<ScanFrame>> {
    let line = std::str::from_utf8(raw)
        .map_err(|e| NavError::Frame(format!("line is not UTF-8: {}", e)))?
        .trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    parse_frame(line).map(Some)
}

/// Reads frames from `reader` and queues them in order. Blank lines and
/// `#` comments are skipped, malformed lines are dropped with a warning.
/// Returns the number of frames queued; only a read failure is an error.
pub async fn forward_frames<R>(reader: R, scan_sender: mpsc::Sender<ScanFrame>) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut forwarded = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let frame = match frame_from_bytes(&buf) {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(e) => {
                warn!("Dropping frame: {}", e);
                continue;
            }
        };

        if scan_sender.send(frame).await.is_err() {
            info!("Navigation node stopped, no longer reading scans");
            break;
        }
        forwarded += 1;
    }

    Ok(forwarded)
}

/// Writes each command as a `linear angular` line.
pub struct LineSink<W: Write> {
    out: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandSink for LineSink<W> {
    fn publish(&mut self, cmd: VelocityCommand) -> Result<()> {
        writeln!(self.out, "{}", cmd)?;
        self.out.flush()?;
        Ok(())
    }
}
