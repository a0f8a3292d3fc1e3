//! Battle log writer.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::LogLine;
use crate::actions::ActionDescriptor;
use crate::board::{BattleSetup, BoardState};
use crate::core::LogError;

/// File extension of battle logs, without the leading dot.
pub const BATTLE_LOG_EXTENSION: &str = "battle.jsonl";

/// Where a serializer writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogTarget {
    /// `<dir>/<battle_id>.battle.jsonl`, created on the first flush.
    File(PathBuf),
    /// Lines are kept in memory.
    Memory,
}

/// Buffers log lines and writes them out at checkpoints.
///
/// The header is buffered on construction. Nothing touches the file system
/// until the first [`flush`](Self::flush). A failed flush keeps every line
/// that was not fully written, and remembers how much of the first one was,
/// so a retry never writes a line twice.
#[derive(Debug)]
pub struct BattleSerializer {
    battle_id: String,
    target: LogTarget,
    file: Option<BufWriter<File>>,
    pending: VecDeque<LogLine>,
    /// Bytes of the first pending line already handed to the file.
    partial_bytes: usize,
    written: Vec<String>,
    actions_recorded: usize,
}

impl BattleSerializer {
    pub fn new(battle_id: impl Into<String>, setup: &BattleSetup, target: LogTarget) -> Self {
        Self {
            battle_id: battle_id.into(),
            target,
            file: None,
            pending: VecDeque::from([LogLine::Header(setup.clone())]),
            partial_bytes: 0,
            written: Vec::new(),
            actions_recorded: 0,
        }
    }

    /// Serializer that keeps its lines in memory.
    pub fn in_memory(battle_id: impl Into<String>, setup: &BattleSetup) -> Self {
        Self::new(battle_id, setup, LogTarget::Memory)
    }

    #[must_use]
    pub fn battle_id(&self) -> &str {
        &self.battle_id
    }

    /// Path of the log file, for file targets.
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        match &self.target {
            LogTarget::File(dir) => Some(dir.join(format!("{}.{BATTLE_LOG_EXTENSION}", self.battle_id))),
            LogTarget::Memory => None,
        }
    }

    /// Buffer an action record.
    pub fn record(&mut self, descriptor: &ActionDescriptor) {
        self.pending.push_back(LogLine::action(descriptor));
        self.actions_recorded += 1;
    }

    /// Buffer a checkpoint with the board's current digest.
    pub fn checkpoint(&mut self, board: &BoardState) -> Result<(), LogError> {
        let digest = board.digest()?;
        self.pending.push_back(LogLine::Checkpoint {
            turn: board.turn_counter(),
            digest,
        });
        Ok(())
    }

    /// Write out every buffered line.
    pub fn flush(&mut self) -> Result<(), LogError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        match self.path() {
            Some(path) => {
                if self.file.is_none() {
                    self.file = Some(open_log(&path)?);
                }
                if let Some(file) = self.file.as_mut() {
                    let lines = drain_lines(file, &mut self.pending, &mut self.partial_bytes)?;
                    debug!("Flushed {lines} log lines to {}", path.display());
                }
            }
            None => {
                while let Some(line) = self.pending.front() {
                    self.written.push(serde_json::to_string(line)?);
                    self.pending.pop_front();
                }
            }
        }
        Ok(())
    }

    /// Checkpoint the final board and flush.
    pub fn finish(&mut self, board: &BoardState) -> Result<(), LogError> {
        self.checkpoint(board)?;
        self.flush()
    }

    /// Lines buffered but not yet written.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Action records so far, written or not.
    #[must_use]
    pub fn actions_recorded(&self) -> usize {
        self.actions_recorded
    }

    /// Lines written to an in-memory target.
    #[must_use]
    pub fn written_lines(&self) -> &[String] {
        &self.written
    }

    /// Everything written to an in-memory target, one line per record.
    #[must_use]
    pub fn contents(&self) -> String {
        let mut out = String::new();
        for line in &self.written {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl Drop for BattleSerializer {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Dropping {} unwritten lines of battle {}: {e}", self.pending.len(), self.battle_id);
        }
    }
}

/// Writes `pending` to `out` line by line, dropping each line once all of
/// its bytes were accepted. `offset` is how much of the first line an
/// earlier failed attempt already wrote. Returns the number of lines written.
fn drain_lines<W: Write>(out: &mut W, pending: &mut VecDeque<LogLine>, offset: &mut usize) -> Result<usize, LogError> {
    let mut lines = 0;
    while let Some(line) = pending.front() {
        let mut bytes = serde_json::to_vec(line)?;
        bytes.push(b'\n');
        while *offset < bytes.len() {
            match out.write(&bytes[*offset..]) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero).into()),
                Ok(n) => *offset += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        pending.pop_front();
        *offset = 0;
        lines += 1;
    }
    out.flush()?;
    Ok(lines)
}

fn open_log(path: &Path) -> Result<BufWriter<File>, LogError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardId;
    use crate::core::BattleConfig;

    fn setup() -> BattleSetup {
        BattleSetup::new(5, vec![CardId::new(1); 3], vec![CardId::new(2); 3])
    }

    /// Accepts `budget` more bytes, then fails every write.
    struct ShortWriter {
        out: Vec<u8>,
        budget: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.budget);
            self.out.extend_from_slice(&buf[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn encoded(line: &LogLine) -> String {
        format!("{}\n", serde_json::to_string(line).unwrap())
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("battle-log-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let _ = fs::remove_file(&dir);
        dir
    }

    #[test]
    fn test_header_buffered_until_flush() {
        let mut serializer = BattleSerializer::in_memory("b1", &setup());
        assert_eq!(serializer.pending_len(), 1);
        assert!(serializer.written_lines().is_empty());

        serializer.flush().unwrap();
        assert_eq!(serializer.pending_len(), 0);
        assert!(serializer.written_lines()[0].starts_with(r#"{"kind":"header""#));
    }

    #[test]
    fn test_record_and_checkpoint() {
        let setup = setup();
        let board = BoardState::from_setup(&setup, &BattleConfig::default());
        let mut serializer = BattleSerializer::in_memory("b2", &setup);

        serializer.record(&ActionDescriptor::new("NextPlayer", Default::default()));
        serializer.checkpoint(&board).unwrap();
        serializer.flush().unwrap();

        assert_eq!(serializer.actions_recorded(), 1);
        assert_eq!(serializer.written_lines().len(), 3);
        assert!(serializer.written_lines()[2].contains(r#""kind":"checkpoint""#));
    }

    #[test]
    fn test_file_opened_lazily() {
        let dir = scratch_dir("lazy");
        let mut serializer = BattleSerializer::new("lazy", &setup(), LogTarget::File(dir.clone()));
        let path = serializer.path().unwrap();

        assert_eq!(path, dir.join("lazy.battle.jsonl"));
        assert!(!path.exists());

        serializer.flush().unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);

        drop(serializer);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_failed_flush_keeps_buffer() {
        let dir = scratch_dir("retry");
        // A plain file where the log directory should be.
        fs::write(&dir, b"in the way").unwrap();

        let mut serializer = BattleSerializer::new("retry", &setup(), LogTarget::File(dir.clone()));
        serializer.record(&ActionDescriptor::new("NextPlayer", Default::default()));

        assert!(matches!(serializer.flush(), Err(LogError::Io(_))));
        assert_eq!(serializer.pending_len(), 2);

        fs::remove_file(&dir).unwrap();
        serializer.flush().unwrap();
        assert_eq!(serializer.pending_len(), 0);

        let text = fs::read_to_string(serializer.path().unwrap()).unwrap();
        assert_eq!(text.lines().count(), 2);

        drop(serializer);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_partial_write_resumes_mid_line() {
        let header = LogLine::Header(setup());
        let action = LogLine::action(&ActionDescriptor::new("NextPlayer", Default::default()));
        let expected = encoded(&header) + &encoded(&action);
        let mut pending = VecDeque::from([header, action]);
        let mut offset = 0;
        let mut out = ShortWriter {
            out: Vec::new(),
            budget: encoded(&pending[0]).len() + 3,
        };

        assert!(matches!(drain_lines(&mut out, &mut pending, &mut offset), Err(LogError::Io(_))));
        assert_eq!(pending.len(), 1);
        assert_eq!(offset, 3);

        out.budget = 7;
        assert!(drain_lines(&mut out, &mut pending, &mut offset).is_err());
        assert_eq!(offset, 10);

        out.budget = usize::MAX;
        assert_eq!(drain_lines(&mut out, &mut pending, &mut offset).unwrap(), 1);
        assert!(pending.is_empty());
        assert_eq!(offset, 0);
        assert_eq!(String::from_utf8(out.out).unwrap(), expected);
    }
}
