//! Virtual source registry and streams
//!
//! Fragments are single-use: registered once, consumed by one open/read/close
//! cycle, then released. A released name can be registered again. Every
//! stream owns its own cursor, so a load triggered while another stream is
//! open (a resolver loading a dependency, say) never disturbs it.

use super::reference::SourceRef;
use super::stat::SourceStat;
use crate::error::{LoaderError, LoaderResult};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct Fragment {
    text: Arc<str>,
    origin: Option<PathBuf>,
}

/// Process-wide table of pending fragments.
///
/// Cloning is cheap and shares the table.
#[derive(Debug, Clone, Default)]
pub struct VirtualSourceRegistry {
    fragments: Arc<Mutex<HashMap<String, Fragment>>>,
}

impl VirtualSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Fragment>> {
        // A panic mid-insert cannot leave the map itself inconsistent
        self.fragments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register `text` under `name`.
    ///
    /// `origin` is the real file the text stands in for; when set, `stat`
    /// copies that file's metadata. Fails if `name` is still pending.
    pub fn set_fragment(
        &self,
        name: impl Into<String>,
        text: impl Into<String>,
        origin: Option<PathBuf>,
    ) -> LoaderResult<()> {
        let name = name.into();
        let mut table = self.table();
        if table.contains_key(&name) {
            return Err(LoaderError::DuplicateFragment(name));
        }
        let text: String = text.into();
        debug!("Registered fragment {} ({} bytes)", name, text.len());
        table.insert(
            name,
            Fragment {
                text: Arc::from(text),
                origin,
            },
        );
        Ok(())
    }

    /// Whether `name` is registered and not yet released
    pub fn has_fragment(&self, name: &str) -> bool {
        self.table().contains_key(name)
    }

    /// Number of fragments still pending
    pub fn fragment_count(&self) -> usize {
        self.table().len()
    }

    /// Release a fragment that will never be opened (an aborted load).
    pub fn discard(&self, name: &str) -> bool {
        self.table().remove(name).is_some()
    }

    /// Open a stream over `reference`.
    pub fn open(&self, reference: &SourceRef) -> LoaderResult<VirtualStream> {
        let body = match reference {
            SourceRef::Fragment { name } => {
                let fragment = self
                    .table()
                    .get(name)
                    .cloned()
                    .ok_or_else(|| LoaderError::FragmentNotFound(name.clone()))?;
                Body::Fragment {
                    name: name.clone(),
                    text: fragment.text,
                    origin: fragment.origin,
                    pos: 0,
                }
            }
            SourceRef::Remap { content, reported } => {
                let file = File::open(content).map_err(|e| {
                    LoaderError::io(format!("opening {}", content.display()), e)
                })?;
                let len = file
                    .metadata()
                    .map_err(|e| LoaderError::io(format!("stat {}", content.display()), e))?
                    .len();
                Body::File {
                    file,
                    content: content.clone(),
                    reported: reported.clone(),
                    len,
                    pos: 0,
                }
            }
        };

        Ok(VirtualStream {
            reference: reference.clone(),
            body,
            registry: self.clone(),
            stat: None,
            released: false,
        })
    }

    fn release(&self, name: &str, text: &Arc<str>) {
        let mut table = self.table();
        // The name may already belong to a newer registration
        if table.get(name).is_some_and(|f| Arc::ptr_eq(&f.text, text)) {
            table.remove(name);
            debug!("Released fragment {}", name);
        }
    }
}

#[derive(Debug)]
enum Body {
    Fragment {
        name: String,
        text: Arc<str>,
        origin: Option<PathBuf>,
        pos: usize,
    },
    File {
        file: File,
        content: PathBuf,
        reported: PathBuf,
        len: u64,
        pos: u64,
    },
}

/// An open read cycle over a [`SourceRef`].
///
/// `close` (or drop) releases the fragment behind it exactly once.
#[derive(Debug)]
pub struct VirtualStream {
    reference: SourceRef,
    body: Body,
    registry: VirtualSourceRegistry,
    stat: Option<SourceStat>,
    released: bool,
}

impl VirtualStream {
    pub fn reference(&self) -> &SourceRef {
        &self.reference
    }

    /// The path tooling should see as this stream's source, if any
    pub fn origin(&self) -> Option<&Path> {
        match &self.body {
            Body::Fragment { origin, .. } => origin.as_deref(),
            Body::File { reported, .. } => Some(reported),
        }
    }

    /// Read up to `count` bytes; an empty result means end of stream.
    pub fn read_chunk(&mut self, count: usize) -> LoaderResult<Vec<u8>> {
        let mut buf = vec![0; count];
        let mut filled = 0;
        while filled < count {
            let n = self
                .read(&mut buf[filled..])
                .map_err(|e| LoaderError::io(format!("reading {}", self.reference), e))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf.truncate(filled);
        Ok(buf)
    }

    /// Read everything left as UTF-8 text
    pub fn read_to_text(&mut self) -> LoaderResult<String> {
        let mut text = String::new();
        self.read_to_string(&mut text)
            .map_err(|e| LoaderError::io(format!("reading {}", self.reference), e))?;
        Ok(text)
    }

    pub fn eof(&self) -> bool {
        match &self.body {
            Body::Fragment { text, pos, .. } => *pos >= text.len(),
            Body::File { len, pos, .. } => *pos >= *len,
        }
    }

    /// Size of the bytes served plus metadata of the reported origin.
    pub fn stat(&mut self) -> LoaderResult<&SourceStat> {
        if self.stat.is_none() {
            self.stat = Some(self.compute_stat()?);
        }
        self.stat
            .as_ref()
            .ok_or_else(|| LoaderError::Internal("stat not initialized".to_string()))
    }

    fn compute_stat(&self) -> LoaderResult<SourceStat> {
        match &self.body {
            Body::Fragment { text, origin, .. } => {
                let size = text.len() as u64;
                let Some(origin) = origin else {
                    return Ok(SourceStat::sized(size));
                };
                match fs::metadata(origin) {
                    Ok(meta) => Ok(SourceStat::from_metadata(size, Some(origin.clone()), &meta)),
                    Err(e) => {
                        warn!("Cannot stat fragment origin {}: {}", origin.display(), e);
                        Ok(SourceStat {
                            origin: Some(origin.clone()),
                            ..SourceStat::sized(size)
                        })
                    }
                }
            }
            Body::File {
                content,
                reported,
                len,
                ..
            } => {
                let meta = match fs::metadata(reported) {
                    Ok(meta) => meta,
                    Err(e) => {
                        debug!(
                            "Reported origin {} not readable ({}), using {}",
                            reported.display(),
                            e,
                            content.display()
                        );
                        fs::metadata(content).map_err(|e| {
                            LoaderError::io(format!("stat {}", content.display()), e)
                        })?
                    }
                };
                Ok(SourceStat::from_metadata(*len, Some(reported.clone()), &meta))
            }
        }
    }

    /// End the read cycle and release the fragment
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Body::Fragment { name, text, .. } = &self.body {
            self.registry.release(name, text);
        }
    }
}

impl Read for VirtualStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.body {
            Body::Fragment { text, pos, .. } => {
                let bytes = text.as_bytes();
                let n = buf.len().min(bytes.len() - *pos);
                buf[..n].copy_from_slice(&bytes[*pos..*pos + n]);
                *pos += n;
                Ok(n)
            }
            Body::File { file, pos, .. } => {
                let n = file.read(buf)?;
                *pos += n as u64;
                Ok(n)
            }
        }
    }
}

impl Drop for VirtualStream {
    fn drop(&mut self) {
        self.release();
    }
}
