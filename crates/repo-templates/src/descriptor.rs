//! Locating and parsing template descriptors inside a repository

use tracing::debug;

use crate::error::{ParseError, Result, ScanError};
use crate::repository::RepositoryService;
use crate::template::TemplateDescriptor;

pub const TEMPLATE_YML: &str = "template.yml";
pub const TEMPLATE_YAML: &str = "template.yaml";

/// Accepted descriptor file names, in priority order
pub const DESCRIPTOR_FILE_NAMES: [&str; 2] = [TEMPLATE_YML, TEMPLATE_YAML];

/// Turns raw descriptor bytes into a [`TemplateDescriptor`]
///
/// Implementations hold no mutable state and are shared across scans.
pub trait DescriptorParser: Send + Sync {
    fn parse(&self, content: &[u8]) -> std::result::Result<TemplateDescriptor, ParseError>;
}

/// YAML descriptor parser
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDescriptorParser;

impl DescriptorParser for YamlDescriptorParser {
    fn parse(&self, content: &[u8]) -> std::result::Result<TemplateDescriptor, ParseError> {
        if content.iter().all(u8::is_ascii_whitespace) {
            return Err(ParseError::Empty);
        }
        Ok(serde_yaml::from_slice(content)?)
    }
}

/// Find the descriptor file at the repository root.
///
/// `template.yml` is checked first; if it exists `template.yaml` is never
/// looked at.
pub async fn find_descriptor(service: &dyn RepositoryService) -> Result<Option<&'static str>> {
    for file_name in DESCRIPTOR_FILE_NAMES {
        let exists = service
            .exists(file_name)
            .await
            .map_err(|source| ScanError::Io {
                path: file_name.to_string(),
                source,
            })?;
        if exists {
            return Ok(Some(file_name));
        }
    }
    Ok(None)
}

/// Read and parse the repository's descriptor, if it has one
pub async fn read_descriptor(
    service: &dyn RepositoryService,
    parser: &dyn DescriptorParser,
) -> Result<Option<TemplateDescriptor>> {
    let Some(file_name) = find_descriptor(service).await? else {
        return Ok(None);
    };

    debug!(
        "Reading {} in repository {}",
        file_name,
        service.repository().namespace_and_name()
    );

    let content = service
        .read(file_name)
        .await
        .map_err(|source| ScanError::Io {
            path: file_name.to_string(),
            source,
        })?;

    let descriptor = parser
        .parse(&content)
        .map_err(|source| ScanError::Parse {
            path: file_name.to_string(),
            source,
        })?;

    Ok(Some(descriptor))
}
