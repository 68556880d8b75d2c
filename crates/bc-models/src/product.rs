//! Product model
//!
//! Endpoint: /products

use bc_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A product delivered by the platform (owns product versions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Id,

    pub name: String,

    /// Short code shown in tables
    #[serde(default)]
    pub abbreviation: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub product_code: Option<String>,

    /// Name used by the program management system
    #[serde(default)]
    pub pgm_system_name: Option<String>,
}

impl Identifiable for Product {
    fn id(&self) -> Id {
        self.id
    }
}

impl Entity for Product {
    const RESOURCE_PATH: &'static str = "products";
    const TYPE_NAME: &'static str = "Product";
}

/// Form input for creating a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, max = 255, message = "can't be blank or longer than 255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 20, message = "must be 1 to 20 characters"))]
    pub abbreviation: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pgm_system_name: Option<String>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, abbreviation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abbreviation: abbreviation.into(),
            description: None,
            product_code: None,
            pgm_system_name: None,
        }
    }
}
