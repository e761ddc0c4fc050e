use serde::Serialize;
use serde_json::json;

use super::{require, Fields};
use crate::db::models::Category;
use crate::error::AppResult;

/// Categories are listed by id and name only.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: i64,
    pub name: String,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

/// Applies the name rules to a category created from the command line.
pub fn validate_name(name: &str) -> AppResult<String> {
    let body = json!({ "name": name });
    let mut fields = Fields::new(&body, false)?;
    let name = fields.required_str("name", Some(125));
    fields.finish()?;
    require(name, "name")
}
