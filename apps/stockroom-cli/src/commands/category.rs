//! # Category Commands
//!
//! `stockroom category add|list|show|update|delete|counts`

use clap::Subcommand;
use std::io::Write;
use tracing::info;

use super::Session;
use crate::error::{AppError, AppResult};
use stockroom_core::validation::{validate_category_name, validate_category_size, validate_text};
use stockroom_core::NewCategory;

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    /// Register a category.
    Add {
        #[arg(long)]
        name: String,
        /// Small, Medium or Large.
        #[arg(long)]
        size: String,
        /// Packaging, e.g. Can, Glass, Plastic.
        #[arg(long)]
        packaging: String,
    },

    /// List categories by name.
    List,

    /// Show one category.
    Show { id: i64 },

    /// Change a category's fields. Omitted fields keep their value.
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        packaging: Option<String>,
    },

    /// Delete a category. Fails while products reference it.
    Delete { id: i64 },

    /// Number of products in each category.
    Counts,
}

pub async fn run<W: Write>(command: CategoryCommand, session: &mut Session<W>) -> AppResult<()> {
    match command {
        CategoryCommand::Add {
            name,
            size,
            packaging,
        } => {
            let mut draft = NewCategory::new(name.trim(), size.trim(), packaging.trim());
            draft.validate()?;
            draft.size = validate_category_size(&draft.size)?.to_string();

            let category = session.db.categories().create(&draft).await?;
            info!(id = category.id, name = %category.name, "Category created");
            if session.json {
                session.print_json(&category)?;
            } else {
                writeln!(session.out, "Created category {}", category.id)?;
            }
        }

        CategoryCommand::List => {
            let categories = session.db.categories().list_all().await?;
            if session.json {
                session.print_json(&categories)?;
            } else {
                for category in &categories {
                    session.print_category(category)?;
                }
            }
        }

        CategoryCommand::Show { id } => {
            let category = session.require_category(id).await?;
            if session.json {
                session.print_json(&category)?;
            } else {
                session.print_category(&category)?;
            }
        }

        CategoryCommand::Update {
            id,
            name,
            size,
            packaging,
        } => {
            let mut category = session.require_category(id).await?;
            if let Some(name) = name {
                validate_category_name(name.trim())?;
                category.name = name.trim().to_string();
            }
            if let Some(size) = size {
                category.size = validate_category_size(&size)?.to_string();
            }
            if let Some(packaging) = packaging {
                validate_text("packaging", packaging.trim())?;
                category.packaging = packaging.trim().to_string();
            }

            if !session.db.categories().update(&category).await? {
                return Err(AppError::not_found("Category", id));
            }
            writeln!(session.out, "Updated category {}", id)?;
        }

        CategoryCommand::Delete { id } => {
            if !session.db.categories().delete(id).await? {
                return Err(AppError::not_found("Category", id));
            }
            writeln!(session.out, "Deleted category {}", id)?;
        }

        CategoryCommand::Counts => {
            let counts = session.db.categories().count_products_per_category().await?;
            if session.json {
                session.print_json(&counts)?;
            } else {
                for count in &counts {
                    writeln!(session.out, "{:<30} {:>6}", count.name, count.count)?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{seed_soda, session, take_output};
    use stockroom_db::DbError;

    fn add(name: &str, size: &str) -> CategoryCommand {
        CategoryCommand::Add {
            name: name.to_string(),
            size: size.to_string(),
            packaging: "Glass".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_canonicalizes_size() {
        let mut session = session().await;
        run(add(" Beverages ", "medium"), &mut session).await.unwrap();

        assert_eq!(take_output(&mut session), "Created category 1\n");
        let stored = session.db.categories().get(1).await.unwrap().unwrap();
        assert_eq!(stored.name, "Beverages");
        assert_eq!(stored.size, "Medium");
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_size() {
        let mut session = session().await;
        let err = run(add("Beverages", "Huge"), &mut session).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(session.db.categories().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_keeps_omitted_fields() {
        let mut session = session().await;
        run(add("Beverages", "Medium"), &mut session).await.unwrap();

        run(
            CategoryCommand::Update {
                id: 1,
                name: Some("Drinks".to_string()),
                size: None,
                packaging: None,
            },
            &mut session,
        )
        .await
        .unwrap();

        let stored = session.db.categories().get(1).await.unwrap().unwrap();
        assert_eq!(stored.name, "Drinks");
        assert_eq!(stored.characteristics(), "Medium, Glass");
    }

    #[tokio::test]
    async fn test_missing_category_is_not_found() {
        let mut session = session().await;

        let err = run(CategoryCommand::Show { id: 9 }, &mut session).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { id: 9, .. }));

        let err = run(CategoryCommand::Delete { id: 9 }, &mut session).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_in_use_category_fails() {
        let mut session = session().await;
        let soda = seed_soda(&session).await;

        let err = run(
            CategoryCommand::Delete {
                id: soda.category.id,
            },
            &mut session,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::Database(DbError::ForeignKeyViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_counts_include_empty_categories() {
        let mut session = session().await;
        seed_soda(&session).await;
        run(add("Cleaning", "Large"), &mut session).await.unwrap();
        take_output(&mut session);

        run(CategoryCommand::Counts, &mut session).await.unwrap();
        let text = take_output(&mut session);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Beverages") && lines[0].ends_with('1'));
        assert!(lines[1].starts_with("Cleaning") && lines[1].ends_with('0'));
    }

    #[tokio::test]
    async fn test_list_as_json() {
        let mut session = session().await.json(true);
        run(add("Beverages", "Small"), &mut session).await.unwrap();
        take_output(&mut session);

        run(CategoryCommand::List, &mut session).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&take_output(&mut session)).unwrap();
        assert_eq!(value[0]["name"], "Beverages");
        assert_eq!(value[0]["size"], "Small");
    }
}
