// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity and lifecycle shared by every collaborator.

use async_trait::async_trait;

use crate::error::SocioError;
use crate::types::{AdapterType, HealthStatus};

/// Implemented by the transport, provider, storage and archive adapters.
///
/// The binary calls `health_check` at startup and logs anything but
/// [`HealthStatus::Healthy`]; it never refuses to start on a bad result.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Short identifier used in log fields, e.g. `"whatsapp-cloud"`.
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    fn adapter_type(&self) -> AdapterType;

    /// Stateless adapters are always healthy.
    async fn health_check(&self) -> Result<HealthStatus, SocioError> {
        Ok(HealthStatus::Healthy)
    }

    /// Releases held resources. Adapters without any keep the default.
    async fn shutdown(&self) -> Result<(), SocioError> {
        Ok(())
    }
}

