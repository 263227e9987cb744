//! Hyperlinked collection representation of collected templates
//!
//! The listing is rendered as a HAL document:
//!
//! ```json
//! {
//!   "_links": { "self": { "href": "/api/v2/repos/templates" } },
//!   "_embedded": { "templates": [ { "templateRepository": "ns/repo", "name": "..." } ] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::template::RepositoryTemplate;

/// Path of the template listing below the API base path
pub const TEMPLATES_PATH: &str = "v2/repos/templates";

const TEMPLATE_REPOSITORY_FIELD: &str = "templateRepository";

/// Wire representation of one template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRepresentation {
    /// `namespace/name` of the repository the template lives in
    pub template_repository: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl From<&RepositoryTemplate> for TemplateRepresentation {
    fn from(template: &RepositoryTemplate) -> Self {
        let descriptor = template.descriptor();
        let mut properties = descriptor.properties.clone();
        // The owning repository always comes from the scan, never from the file
        properties.remove(TEMPLATE_REPOSITORY_FIELD);

        Self {
            template_repository: template.repository().to_string(),
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            properties,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedTemplates {
    pub templates: Vec<TemplateRepresentation>,
}

/// The externally visible template collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(rename = "pageTotal", default, skip_serializing_if = "Option::is_none")]
    pub page_total: Option<usize>,
    #[serde(rename = "_links")]
    pub links: CollectionLinks,
    #[serde(rename = "_embedded")]
    pub embedded: EmbeddedTemplates,
}

impl CollectionEnvelope {
    pub fn templates(&self) -> &[TemplateRepresentation] {
        &self.embedded.templates
    }
}

/// A page of the listing; `page` is zero based and `page_size` never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl PageRequest {
    /// Returns `None` for a zero page size
    pub fn new(page: usize, page_size: usize) -> Option<Self> {
        (page_size > 0).then_some(Self { page, page_size })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

/// Canonical listing URL for an API base path
pub fn templates_href(base_path: &str) -> String {
    format!("{}/{}", base_path.trim_end_matches('/'), TEMPLATES_PATH)
}

fn page_href(base_path: &str, page: usize, page_size: usize) -> String {
    format!(
        "{}?page={}&pageSize={}",
        templates_href(base_path),
        page,
        page_size
    )
}

/// Representations in a stable order, independent of scan order
fn representations(templates: &[RepositoryTemplate]) -> Vec<TemplateRepresentation> {
    let mut sorted: Vec<&RepositoryTemplate> = templates.iter().collect();
    sorted.sort_by(|a, b| a.repository().cmp(b.repository()));
    sorted.into_iter().map(TemplateRepresentation::from).collect()
}

/// Build the complete, unpaginated collection
pub fn assemble(templates: &[RepositoryTemplate], base_path: &str) -> CollectionEnvelope {
    CollectionEnvelope {
        page: None,
        page_total: None,
        links: CollectionLinks {
            self_link: Link::new(templates_href(base_path)),
            next: None,
            prev: None,
        },
        embedded: EmbeddedTemplates {
            templates: representations(templates),
        },
    }
}

/// Build one page of the collection
pub fn assemble_page(
    templates: &[RepositoryTemplate],
    base_path: &str,
    request: PageRequest,
) -> CollectionEnvelope {
    let (page, page_size) = (request.page(), request.page_size());
    let all = representations(templates);
    let total = all.len();
    let page_total = total.div_ceil(page_size);

    let start = page.saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    let items = all[start..end].to_vec();

    let prev = (page > 0).then(|| Link::new(page_href(base_path, page - 1, page_size)));
    let next = (end < total).then(|| Link::new(page_href(base_path, page + 1, page_size)));

    CollectionEnvelope {
        page: Some(page),
        page_total: Some(page_total),
        links: CollectionLinks {
            self_link: Link::new(page_href(base_path, page, page_size)),
            next,
            prev,
        },
        embedded: EmbeddedTemplates { templates: items },
    }
}
