//! SEO metadata generation: resolved head-tag metadata plus JSON-LD
//! structured data.
//!
//! Schema emission is additive. Organization and WebSite are always present;
//! everything else appears only when its input is present on the page
//! descriptor. Article and Person are mutually exclusive because both hang
//! off the page type.

use crate::i18n::{alternate_links, AlternateLink, Locale};
use serde::Serialize;

const SITE_NAME: &str = "Estudio Digital";
const CONTACT_EMAIL: &str = "hola@estudiodigital.dev";

/// What kind of page is being rendered. Drives the Article/Person gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageType {
    #[default]
    Website,
    Article,
    Profile,
}

/// A breadcrumb trail entry, outermost first.
#[derive(Debug, Clone)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

/// One question/answer pair for an FAQPage schema.
#[derive(Debug, Clone)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Input for a Service schema.
#[derive(Debug, Clone)]
pub struct ServiceInput {
    pub name: String,
    pub description: String,
    pub service_type: String,
}

/// Input for one Review schema.
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub author: String,
    pub rating: f64,
    pub body: String,
    pub date: String,
}

/// Logical page descriptor. Everything optional falls back to localized
/// site defaults.
#[derive(Debug, Clone, Default)]
pub struct PageDescriptor {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub image: Option<String>,
    pub path: String,
    pub locale: Locale,
    pub page_type: PageType,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub author: Option<String>,
    pub no_index: bool,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub faq: Vec<FaqEntry>,
    pub service: Option<ServiceInput>,
    pub reviews: Vec<ReviewInput>,
    pub business_hours: Vec<String>,
}

/// Fully resolved metadata ready for head-tag rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub canonical: String,
    pub alternates: Vec<AlternateLink>,
    pub image: Option<String>,
    pub no_index: bool,
    pub locale: Locale,
}

// ==================== JSON-LD schema types ====================

/// One JSON-LD object. Serializes flat (no enum wrapper) so the output is
/// a plain schema.org object.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StructuredData {
    Organization(OrganizationSchema),
    WebSite(WebSiteSchema),
    Article(ArticleSchema),
    Person(PersonSchema),
    Service(ServiceSchema),
    BreadcrumbList(BreadcrumbListSchema),
    FaqPage(FaqPageSchema),
    Review(ReviewSchema),
    ProfessionalService(ProfessionalServiceSchema),
}

impl StructuredData {
    /// The schema.org `@type` discriminator, for logging and tests.
    pub fn schema_type(&self) -> &'static str {
        match self {
            Self::Organization(_) => "Organization",
            Self::WebSite(_) => "WebSite",
            Self::Article(_) => "Article",
            Self::Person(_) => "Person",
            Self::Service(_) => "Service",
            Self::BreadcrumbList(_) => "BreadcrumbList",
            Self::FaqPage(_) => "FAQPage",
            Self::Review(_) => "Review",
            Self::ProfessionalService(_) => "ProfessionalService",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSchema {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    schema_type: &'static str,
    name: &'static str,
    url: String,
    email: &'static str,
    logo: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSiteSchema {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    schema_type: &'static str,
    name: &'static str,
    url: String,
    in_language: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSchema {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    schema_type: &'static str,
    headline: String,
    description: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_modified: Option<String>,
    author: PersonRef,
    publisher: OrganizationRef,
    in_language: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSchema {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    schema_type: &'static str,
    name: String,
    url: String,
    works_for: OrganizationRef,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSchema {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    schema_type: &'static str,
    name: String,
    description: String,
    service_type: String,
    provider: OrganizationRef,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbListSchema {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    schema_type: &'static str,
    item_list_element: Vec<BreadcrumbItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbItem {
    #[serde(rename = "@type")]
    schema_type: &'static str,
    position: usize,
    name: String,
    item: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqPageSchema {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    schema_type: &'static str,
    main_entity: Vec<FaqQuestion>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqQuestion {
    #[serde(rename = "@type")]
    schema_type: &'static str,
    name: String,
    accepted_answer: FaqAnswer,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqAnswer {
    #[serde(rename = "@type")]
    schema_type: &'static str,
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSchema {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    schema_type: &'static str,
    author: PersonRef,
    review_rating: Rating,
    review_body: String,
    date_published: String,
    item_reviewed: OrganizationRef,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(rename = "@type")]
    schema_type: &'static str,
    rating_value: f64,
    best_rating: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalServiceSchema {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    schema_type: &'static str,
    name: &'static str,
    url: String,
    email: &'static str,
    opening_hours: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    #[serde(rename = "@type")]
    schema_type: &'static str,
    name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRef {
    #[serde(rename = "@type")]
    schema_type: &'static str,
    name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

const SCHEMA_CONTEXT: &str = "https://schema.org";

fn organization_ref(url: Option<String>) -> OrganizationRef {
    OrganizationRef {
        schema_type: "Organization",
        name: SITE_NAME,
        url,
    }
}

// ==================== Generator ====================

/// Stateless metadata generator bound to the public site origin.
#[derive(Debug, Clone)]
pub struct SeoGenerator {
    base_url: String,
}

impl SeoGenerator {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    fn absolute_url(&self, path: &str) -> String {
        if path.is_empty() || path == "/" {
            return self.base_url.clone();
        }
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", self.base_url, path)
    }

    /// Resolve the descriptor against the localized site defaults.
    pub fn resolve(&self, page: &PageDescriptor) -> PageMetadata {
        let strings = page.locale.strings();

        let title = match &page.title {
            Some(title) => format!("{}{}", title, strings.title_suffix),
            None => strings.default_title.to_string(),
        };

        let description = page
            .description
            .clone()
            .unwrap_or_else(|| strings.default_description.to_string());

        let mut keywords: Vec<String> = strings
            .default_keywords
            .iter()
            .map(|k| k.to_string())
            .collect();
        keywords.extend(page.keywords.iter().cloned());

        let alternates = alternate_links(&page.path)
            .into_iter()
            .map(|link| AlternateLink {
                hreflang: link.hreflang,
                href: self.absolute_url(&link.href),
            })
            .collect();

        PageMetadata {
            title,
            description,
            keywords,
            canonical: self.absolute_url(&page.path),
            alternates,
            image: page.image.as_ref().map(|img| self.absolute_url(img)),
            no_index: page.no_index,
            locale: page.locale,
        }
    }

    /// Build the JSON-LD objects for a page.
    pub fn structured_data(&self, page: &PageDescriptor) -> Vec<StructuredData> {
        let resolved = self.resolve(page);
        let mut schemas = vec![
            StructuredData::Organization(OrganizationSchema {
                context: SCHEMA_CONTEXT,
                schema_type: "Organization",
                name: SITE_NAME,
                url: self.base_url.clone(),
                email: CONTACT_EMAIL,
                logo: self.absolute_url("/logo.png"),
            }),
            StructuredData::WebSite(WebSiteSchema {
                context: SCHEMA_CONTEXT,
                schema_type: "WebSite",
                name: SITE_NAME,
                url: self.base_url.clone(),
                in_language: Locale::all().iter().map(|l| l.code()).collect(),
            }),
        ];

        match page.page_type {
            PageType::Article => {
                let author = page
                    .author
                    .clone()
                    .unwrap_or_else(|| SITE_NAME.to_string());
                schemas.push(StructuredData::Article(ArticleSchema {
                    context: SCHEMA_CONTEXT,
                    schema_type: "Article",
                    headline: resolved.title.clone(),
                    description: resolved.description.clone(),
                    url: resolved.canonical.clone(),
                    image: resolved.image.clone(),
                    date_published: page.published_time.clone(),
                    date_modified: page.modified_time.clone(),
                    author: PersonRef {
                        schema_type: "Person",
                        name: author,
                    },
                    publisher: organization_ref(Some(self.base_url.clone())),
                    in_language: page.locale.code().to_string(),
                }));
            }
            PageType::Profile => {
                let name = page
                    .author
                    .clone()
                    .or_else(|| page.title.clone())
                    .unwrap_or_else(|| SITE_NAME.to_string());
                schemas.push(StructuredData::Person(PersonSchema {
                    context: SCHEMA_CONTEXT,
                    schema_type: "Person",
                    name,
                    url: resolved.canonical.clone(),
                    works_for: organization_ref(Some(self.base_url.clone())),
                }));
            }
            PageType::Website => {}
        }

        if let Some(service) = &page.service {
            schemas.push(StructuredData::Service(ServiceSchema {
                context: SCHEMA_CONTEXT,
                schema_type: "Service",
                name: service.name.clone(),
                description: service.description.clone(),
                service_type: service.service_type.clone(),
                provider: organization_ref(Some(self.base_url.clone())),
            }));
        }

        if !page.breadcrumbs.is_empty() {
            schemas.push(StructuredData::BreadcrumbList(BreadcrumbListSchema {
                context: SCHEMA_CONTEXT,
                schema_type: "BreadcrumbList",
                item_list_element: page
                    .breadcrumbs
                    .iter()
                    .enumerate()
                    .map(|(i, crumb)| BreadcrumbItem {
                        schema_type: "ListItem",
                        position: i + 1,
                        name: crumb.name.clone(),
                        item: self.absolute_url(&crumb.path),
                    })
                    .collect(),
            }));
        }

        if !page.faq.is_empty() {
            schemas.push(StructuredData::FaqPage(FaqPageSchema {
                context: SCHEMA_CONTEXT,
                schema_type: "FAQPage",
                main_entity: page
                    .faq
                    .iter()
                    .map(|entry| FaqQuestion {
                        schema_type: "Question",
                        name: entry.question.clone(),
                        accepted_answer: FaqAnswer {
                            schema_type: "Answer",
                            text: entry.answer.clone(),
                        },
                    })
                    .collect(),
            }));
        }

        for review in &page.reviews {
            schemas.push(StructuredData::Review(ReviewSchema {
                context: SCHEMA_CONTEXT,
                schema_type: "Review",
                author: PersonRef {
                    schema_type: "Person",
                    name: review.author.clone(),
                },
                review_rating: Rating {
                    schema_type: "Rating",
                    rating_value: review.rating,
                    best_rating: 5,
                },
                review_body: review.body.clone(),
                date_published: review.date.clone(),
                item_reviewed: organization_ref(Some(self.base_url.clone())),
            }));
        }

        if !page.business_hours.is_empty() {
            schemas.push(StructuredData::ProfessionalService(
                ProfessionalServiceSchema {
                    context: SCHEMA_CONTEXT,
                    schema_type: "ProfessionalService",
                    name: SITE_NAME,
                    url: self.base_url.clone(),
                    email: CONTACT_EMAIL,
                    opening_hours: page.business_hours.clone(),
                },
            ));
        }

        schemas
    }
}
