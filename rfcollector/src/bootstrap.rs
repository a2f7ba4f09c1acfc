//! Reader bootstrap sequence
//!
//! After connecting, the reader is brought into a known state by a fixed
//! series of transactions. Each step waits for the previous one; the first
//! failure ends the sequence.

use std::fmt;

use rfcollector_core::request::ALL_ROSPECS;
use rfcollector_core::{Request, Response};
use rfcollector_transport::Transport;
use rfcollector_types::ReaderInfo;
use tracing::{info, info_span, Instrument};

use crate::definition::{JobDefinition, ReaderConfigDefinition};
use crate::error::{Error, Result};
use crate::executor::Executor;

/// One bootstrap step, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapStep {
    EnableExtensions,
    FactoryReset,
    ClearJobs,
    ReadCapabilities,
    ReadConfiguration,
    ApplyConfiguration,
    InstallJob,
    ArmJob,
}

impl BootstrapStep {
    /// Every step in the order it runs
    pub const ORDER: [Self; 8] = [
        Self::EnableExtensions,
        Self::FactoryReset,
        Self::ClearJobs,
        Self::ReadCapabilities,
        Self::ReadConfiguration,
        Self::ApplyConfiguration,
        Self::InstallJob,
        Self::ArmJob,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::EnableExtensions => "enable vendor extensions",
            Self::FactoryReset => "reset to factory defaults",
            Self::ClearJobs => "clear installed ROSpecs",
            Self::ReadCapabilities => "read capabilities",
            Self::ReadConfiguration => "read configuration",
            Self::ApplyConfiguration => "apply configuration",
            Self::InstallJob => "install ROSpec",
            Self::ArmJob => "enable ROSpec",
        }
    }

    /// Request this step sends
    pub fn request(self, config: &ReaderConfigDefinition, job: &JobDefinition) -> Request {
        match self {
            Self::EnableExtensions => Request::EnableImpinjExtensions,
            Self::FactoryReset => Request::ResetToFactoryDefaults,
            Self::ClearJobs => Request::DeleteRoSpec {
                rospec_id: ALL_ROSPECS,
            },
            Self::ReadCapabilities => Request::GetReaderCapabilities,
            Self::ReadConfiguration => Request::GetReaderConfig,
            Self::ApplyConfiguration => config.request(),
            Self::InstallJob => job.request(),
            Self::ArmJob => Request::EnableRoSpec {
                rospec_id: job.rospec_id(),
            },
        }
    }
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run every step against a freshly connected reader
///
/// `installed` receives the ROSpec id as soon as the reader accepts the
/// job, so a later failure still leaves it known for cleanup.
pub(crate) async fn run(
    executor: &Executor,
    transport: &mut dyn Transport,
    config: &ReaderConfigDefinition,
    job: &JobDefinition,
    vendor_id: u32,
    installed: &mut Option<u32>,
) -> Result<ReaderInfo> {
    let mut reader_info = ReaderInfo::default();

    for (index, step) in BootstrapStep::ORDER.into_iter().enumerate() {
        let span = info_span!("bootstrap", step = %step);
        async {
            info!("[{}/{}] {}", index + 1, BootstrapStep::ORDER.len(), step);
            let response = executor
                .execute(&mut *transport, &step.request(config, job))
                .await?;

            match step {
                BootstrapStep::ReadCapabilities => {
                    reader_info = read_capabilities(&response, vendor_id)?;
                }
                BootstrapStep::ReadConfiguration => {
                    read_configuration(&response, &mut reader_info)?;
                }
                BootstrapStep::InstallJob => *installed = Some(job.rospec_id()),
                _ => {}
            }
            Ok::<(), Error>(())
        }
        .instrument(span)
        .await
        .map_err(|source| Error::Bootstrap {
            step,
            source: Box::new(source),
        })?;
    }

    Ok(reader_info)
}

fn read_capabilities(response: &Response, vendor_id: u32) -> Result<ReaderInfo> {
    let capabilities = response.capabilities()?;
    let general = capabilities
        .general
        .ok_or_else(|| Error::InvalidResponse("no GeneralDeviceCapabilities".into()))?;

    if general.manufacturer != vendor_id {
        return Err(Error::VendorMismatch {
            expected: vendor_id,
            actual: general.manufacturer,
        });
    }

    let max_power = capabilities.max_transmit_power.map(|p| p.dbm());
    info!(
        "Reader model {} (firmware {}), max transmit power {}",
        general.model,
        general.firmware_version,
        max_power.map_or_else(|| "unknown".to_string(), |dbm| format!("{dbm:.2} dBm"))
    );

    Ok(ReaderInfo {
        max_antennas: general.max_antennas,
        max_transmit_power_dbm: max_power,
        ..ReaderInfo::new(general.manufacturer, general.model, general.firmware_version)
    })
}

fn read_configuration(response: &Response, info: &mut ReaderInfo) -> Result<()> {
    let configuration = response.configuration()?;
    let first = configuration
        .antennas
        .first()
        .ok_or_else(|| Error::InvalidResponse("reader reports no antenna configuration".into()))?;

    info!(
        "{} antennas configured; antenna {} on hop table {:?}, channel {:?}",
        configuration.antennas.len(),
        first.antenna_id,
        first.hop_table_id,
        first.channel_index
    );

    info.hop_table_id = first.hop_table_id;
    info.channel_index = first.channel_index;
    Ok(())
}
