// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invoice archive over a directory tree of PDFs.

use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use socio_config::model::ArchiveConfig;
use socio_core::error::SocioError;
use socio_core::traits::{InvoiceArchive, PluginAdapter};
use socio_core::types::{AdapterType, HealthStatus, InvoiceDocument, InvoiceQuery};
use tracing::{debug, warn};

use crate::naming::NameTokens;

/// One candidate file found while scanning.
#[derive(Debug)]
struct Candidate {
    file_id: String,
    file_name: String,
    tokens: NameTokens,
    modified: SystemTime,
}

/// Looks invoices up by account, period and service in file names under `root`.
///
/// File ids are paths relative to the root, `/`-separated. Lookups and reads
/// that outlast `timeout` fail with [`SocioError::Timeout`].
#[derive(Debug, Clone)]
pub struct FsInvoiceArchive {
    root: PathBuf,
    timeout: Duration,
}

impl FsInvoiceArchive {
    pub fn new(config: &ArchiveConfig) -> Self {
        Self::at(&config.root_dir).with_timeout(Duration::from_secs(config.timeout_secs))
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Runs `op`, giving up once the archive timeout elapses.
    async fn bounded<T>(
        &self,
        what: &str,
        op: impl Future<Output = Result<T, SocioError>>,
    ) -> Result<T, SocioError> {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result,
            Err(_) => {
                warn!(what, timeout = ?self.timeout, "archive operation timed out");
                Err(SocioError::Timeout {
                    duration: self.timeout,
                })
            }
        }
    }

    /// Resolves a file id to a path inside the root, refusing escapes.
    fn resolve(&self, file_id: &str) -> Result<PathBuf, SocioError> {
        let relative = Path::new(file_id);
        let clean = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if file_id.is_empty() || !clean {
            return Err(SocioError::Archive {
                message: format!("invalid file id: {file_id}"),
                source: None,
            });
        }
        Ok(self.root.join(relative))
    }
}

fn archive_error(message: String, e: std::io::Error) -> SocioError {
    SocioError::Archive {
        message,
        source: Some(Box::new(e)),
    }
}

/// Recursively collects PDFs under `root`.
fn scan(root: &Path) -> Result<Vec<Candidate>, SocioError> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| archive_error(format!("failed to read {}", dir.display()), e))?;
        for entry in entries {
            let entry = entry
                .map_err(|e| archive_error(format!("failed to read entry in {}", dir.display()), e))?;
            let path = entry.path();
            let metadata = entry
                .metadata()
                .map_err(|e| archive_error(format!("failed to stat {}", path.display()), e))?;
            if metadata.is_dir() {
                pending.push(path);
                continue;
            }
            let is_pdf = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if !is_pdf {
                continue;
            }
            let (Some(stem), Some(file_name), Ok(relative)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.file_name().and_then(|s| s.to_str()),
                path.strip_prefix(root),
            ) else {
                continue;
            };
            let file_id = relative
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect::<Vec<_>>()
                .join("/");
            found.push(Candidate {
                file_id,
                file_name: file_name.to_string(),
                tokens: NameTokens::parse(stem),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }
    }
    Ok(found)
}

#[async_trait]
impl PluginAdapter for FsInvoiceArchive {
    fn name(&self) -> &str {
        "fs-archive"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Archive
    }

    async fn health_check(&self) -> Result<HealthStatus, SocioError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                self.root.display()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "{}: {e}",
                self.root.display()
            ))),
        }
    }
}

#[async_trait]
impl InvoiceArchive for FsInvoiceArchive {
    async fn find_invoice(
        &self,
        query: &InvoiceQuery,
    ) -> Result<Option<InvoiceDocument>, SocioError> {
        let root = self.root.clone();
        let scanning = async move {
            tokio::task::spawn_blocking(move || scan(&root))
                .await
                .map_err(|e| SocioError::Internal(format!("archive scan task failed: {e}")))?
        };
        let candidates = self.bounded("lookup", scanning).await?;

        let best = candidates
            .into_iter()
            .filter(|c| c.tokens.matches(query))
            .max_by_key(|c| (c.tokens.period(), c.modified));

        debug!(
            account = %query.account_number,
            month = ?query.month,
            year = ?query.year,
            found = best.as_ref().map(|c| c.file_id.as_str()),
            "archive lookup"
        );

        Ok(best.map(|c| InvoiceDocument {
            file_id: c.file_id,
            file_name: c.file_name,
            service: c.tokens.service.or(query.service),
        }))
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, SocioError> {
        let path = self.resolve(file_id)?;
        let reading = async {
            tokio::fs::read(&path)
                .await
                .map_err(|e| archive_error(format!("failed to read {}", path.display()), e))
        };
        self.bounded("download", reading).await
    }
}
