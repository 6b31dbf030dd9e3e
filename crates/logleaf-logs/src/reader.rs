//! Log reader for read-back, tail and follow operations

use logleaf_core::{Error, LogTarget, Result};
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::debug;

use crate::format::parse_records;

/// Log reader for a target's active file
pub struct LogReader {
    path: PathBuf,
    delimiter: Option<char>,
}

impl LogReader {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            delimiter: None,
        }
    }

    pub fn for_target(target: &LogTarget) -> Self {
        Self {
            path: target.path().to_path_buf(),
            delimiter: target.format().delimiter(),
        }
    }

    /// Full contents of the file
    pub fn contents(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| Error::read_failed(&self.path, e))
    }

    /// Parsed rows of a delimited log, header included
    pub fn records(&self) -> Result<Vec<Vec<String>>> {
        let delimiter = self
            .delimiter
            .ok_or_else(|| Error::config(format!("{} is not a delimited log", self.path.display())))?;
        Ok(parse_records(&self.contents()?, delimiter))
    }

    /// Read the last N lines, seeking from the end
    pub fn tail(&self, n: usize) -> Result<Vec<String>> {
        if !self.path.exists() || n == 0 {
            return Ok(vec![]);
        }

        let mut file = File::open(&self.path).map_err(|e| Error::read_failed(&self.path, e))?;
        let file_size = file.metadata()?.len();

        if file_size == 0 {
            return Ok(vec![]);
        }

        // Read chunks backwards until enough line breaks are seen
        let chunk_size = 8192u64;
        let mut position = file_size;
        let mut buffer: Vec<u8> = Vec::new();

        while position > 0 {
            let read_size = std::cmp::min(chunk_size, position);
            position -= read_size;

            file.seek(SeekFrom::Start(position))?;
            let mut chunk = vec![0u8; read_size as usize];
            file.read_exact(&mut chunk)?;
            chunk.extend_from_slice(&buffer);
            buffer = chunk;

            // One extra break marks the start of the first wanted line
            if buffer.iter().filter(|&&b| b == b'\n').count() > n {
                break;
            }
        }

        let text = String::from_utf8_lossy(&buffer);
        let lines: Vec<&str> = text.lines().collect();
        let skip = lines.len().saturating_sub(n);
        Ok(lines[skip..].iter().map(|l| l.to_string()).collect())
    }

    /// Follow the log file (like tail -f)
    /// Returns a receiver that yields new lines as they're written.
    /// Rotation is detected when the file shrinks or is replaced.
    pub fn follow(&self) -> Result<mpsc::Receiver<String>> {
        let path = self.path.clone();
        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            if let Err(e) = follow_file(&path, tx).await {
                debug!("Follow ended: {}", e);
            }
        });

        Ok(rx)
    }

    /// Check if the log file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get file size
    pub fn size(&self) -> Result<u64> {
        if !self.path.exists() {
            return Ok(0);
        }
        Ok(fs::metadata(&self.path)?.len())
    }
}

/// Follow a file for new content
async fn follow_file(path: &Path, tx: mpsc::Sender<String>) -> Result<()> {
    use notify::{RecommendedWatcher, RecursiveMode, Watcher};
    use tokio::time::{timeout, Duration};

    let mut position = fs::metadata(path)?.len();
    let mut partial = String::new();

    // Watch the directory so renames of the active file are seen
    let watch_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let (watch_tx, mut watch_rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            let _ = watch_tx.send(res);
        },
        notify::Config::default(),
    )
    .map_err(|e| Error::config(format!("Failed to create watcher: {}", e)))?;

    watcher
        .watch(watch_dir, RecursiveMode::NonRecursive)
        .map_err(|e| Error::config(format!("Failed to watch directory: {}", e)))?;

    loop {
        if tx.is_closed() {
            break;
        }

        // Wait for a change; poll on timeout in case an event was missed
        match timeout(Duration::from_millis(500), watch_rx.recv()).await {
            Ok(Some(Ok(_event))) => {}
            Ok(Some(Err(e))) => {
                debug!("Watch error: {}", e);
                continue;
            }
            Ok(None) => break,
            Err(_elapsed) => {}
        }

        let len = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            // Between rename and re-create during rotation
            Err(_) => continue,
        };

        if len < position {
            debug!("{} was rotated, reading from start", path.display());
            position = 0;
            partial.clear();
        }
        if len == position {
            continue;
        }

        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(position))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        position += buf.len() as u64;

        partial.push_str(&String::from_utf8_lossy(&buf));
        while let Some(idx) = partial.find('\n') {
            let line = partial[..idx].trim_end_matches('\r').to_string();
            partial.drain(..=idx);
            if tx.send(line).await.is_err() {
                return Ok(()); // Channel closed
            }
        }
    }

    Ok(())
}
