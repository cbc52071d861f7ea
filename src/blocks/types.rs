//! Block Schema (§6). Every variant carries `id`, `type`, `order`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
}

impl Default for HeaderLevel {
    fn default() -> Self {
        HeaderLevel::H2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    Bullet,
    Number,
}

impl Default for ListStyle {
    fn default() -> Self {
        ListStyle::Bullet
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaVariant {
    Primary,
    Secondary,
}

impl Default for CtaVariant {
    fn default() -> Self {
        CtaVariant::Primary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockVariant {
    Header {
        text: String,
        #[serde(default)]
        level: HeaderLevel,
    },
    Paragraph {
        text: String,
    },
    List {
        items: Vec<String>,
        #[serde(default)]
        style: ListStyle,
    },
    Image {
        url: String,
        caption: Option<String>,
    },
    Quote {
        text: String,
        author: String,
    },
    Cta {
        label: String,
        action: String,
        #[serde(default)]
        variant: CtaVariant,
    },
    Divider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: Uuid,
    pub order: u32,
    #[serde(flatten)]
    pub variant: BlockVariant,
}

impl Block {
    pub fn validate(&self) -> crate::error::TriadResult<()> {
        if self.order < 1 {
            return Err(crate::error::TriadError::ValidationFailed(format!(
                "block {} has order {} (must be >= 1)",
                self.id, self.order
            )));
        }
        match &self.variant {
            BlockVariant::Header { text, .. } | BlockVariant::Paragraph { text } => {
                if text.trim().is_empty() {
                    return Err(crate::error::TriadError::ValidationFailed(format!(
                        "block {} has empty text",
                        self.id
                    )));
                }
            }
            BlockVariant::List { items, .. } => {
                if items.is_empty() {
                    return Err(crate::error::TriadError::ValidationFailed(format!(
                        "block {} list has no items",
                        self.id
                    )));
                }
            }
            BlockVariant::Image { url, .. } => {
                if url.trim().is_empty() {
                    return Err(crate::error::TriadError::ValidationFailed(format!(
                        "block {} image has empty url",
                        self.id
                    )));
                }
            }
            BlockVariant::Quote { text, author } => {
                if text.trim().is_empty() || author.trim().is_empty() {
                    return Err(crate::error::TriadError::ValidationFailed(format!(
                        "block {} quote missing text or author",
                        self.id
                    )));
                }
            }
            BlockVariant::Cta { label, action, .. } => {
                if label.trim().is_empty() || action.trim().is_empty() {
                    return Err(crate::error::TriadError::ValidationFailed(format!(
                        "block {} cta missing label or action",
                        self.id
                    )));
                }
            }
            BlockVariant::Divider => {}
        }
        Ok(())
    }
}
