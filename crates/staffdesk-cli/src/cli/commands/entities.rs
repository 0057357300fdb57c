//! Company, department, and employee handlers.
//!
//! Every subcommand goes through the list controller so the CLI follows the
//! same open/submit/close flow as an interactive list page.

use anyhow::{Context, Result};
use serde_json::Value;
use staffdesk_core::app::AppContext;
use staffdesk_core::crud::{Entity, MutationOutcome};
use staffdesk_core::entities::{Company, Department, Employee};
use staffdesk_core::list::ListController;

use super::print_toasts;
use crate::cli::EntityCommands;

/// One-line rendering used by `list` and `all`.
pub trait Row {
    fn row(&self) -> String;
}

impl Row for Company {
    fn row(&self) -> String {
        format!(
            "{:>5}  {:<32} {:>4} depts {:>5} employees",
            self.id,
            self.name,
            self.num_departments.unwrap_or(0),
            self.num_employees.unwrap_or(0)
        )
    }
}

impl Row for Department {
    fn row(&self) -> String {
        format!(
            "{:>5}  {:<32} {:<24} {:>5} employees",
            self.id,
            self.name,
            self.company_name.as_deref().unwrap_or("-"),
            self.num_employees.unwrap_or(0)
        )
    }
}

impl Row for Employee {
    fn row(&self) -> String {
        format!(
            "{:>5}  {:<24} {:<28} {:<20} {}",
            self.id,
            self.name,
            self.email,
            self.department_name.as_deref().unwrap_or("-"),
            self.status.label()
        )
    }
}

pub async fn run<T: Entity + Row>(
    app: &AppContext,
    list: ListController<T>,
    command: EntityCommands,
) -> Result<()> {
    let resource = *list.slice().resource();

    match command {
        EntityCommands::List { page } => {
            if page <= 1 {
                list.mount().await;
            } else {
                list.set_page(page).await;
            }
            let view = list.snapshot();
            if let Some(error) = view.error {
                anyhow::bail!(error);
            }
            if view.items.is_empty() {
                println!("No {} found.", resource.entity_name_plural);
                return Ok(());
            }
            for item in &view.items {
                println!("{}", item.row());
            }
            println!();
            println!(
                "Page {} of {} ({} total)",
                view.page,
                view.total_pages.max(1),
                view.count
            );
            Ok(())
        }

        EntityCommands::All => {
            if resource.all_endpoint.is_none() {
                anyhow::bail!("{} have no unpaged listing", resource.entity_name_plural);
            }
            list.slice().fetch_all_items().await;
            let state = list.slice().snapshot();
            if let Some(error) = state.error {
                anyhow::bail!(error);
            }
            for item in &state.all_items {
                println!("{}", item.row());
            }
            Ok(())
        }

        EntityCommands::Show { id } => {
            let item = load(&list, id).await?;
            let pretty = serde_json::to_string_pretty(&item).context("format record")?;
            println!("{pretty}");
            Ok(())
        }

        EntityCommands::Add { json } => {
            let draft: T::Draft = serde_json::from_str(&json).context("parse --json draft")?;
            list.open_add();
            report(app, list.submit_form(draft).await)
        }

        EntityCommands::Update { id, json } => {
            let item = load(&list, id).await?;
            let draft = merge_draft(&item, &json)?;
            list.open_edit(item);
            report(app, list.submit_form(draft).await)
        }

        EntityCommands::Delete { id } => {
            let item = load(&list, id).await?;
            list.open_delete(item);
            report(app, list.confirm_delete().await)
        }
    }
}

/// Fetches one record through the view modal.
async fn load<T: Entity>(list: &ListController<T>, id: i64) -> Result<T> {
    list.open_view(id).await;
    let view = list.snapshot();
    list.close_view();

    match view.view_item {
        Some(item) => Ok(item),
        None => {
            let name = list.slice().resource().entity_name;
            anyhow::bail!(
                view.view_error
                    .unwrap_or_else(|| format!("Failed to load {name}"))
            )
        }
    }
}

/// Overlays the keys of `json` onto the record's current draft.
fn merge_draft<T: Entity>(item: &T, json: &str) -> Result<T::Draft> {
    let patch: Value = serde_json::from_str(json).context("parse --json draft")?;
    let Value::Object(patch) = patch else {
        anyhow::bail!("--json must be a JSON object");
    };

    let mut draft = serde_json::to_value(item.to_draft()).context("encode current values")?;
    if let Value::Object(fields) = &mut draft {
        fields.extend(patch);
    }
    serde_json::from_value(draft).context("parse --json draft")
}

fn report<T>(app: &AppContext, outcome: Option<MutationOutcome<T>>) -> Result<()> {
    print_toasts(app);
    match outcome {
        Some(MutationOutcome::Success { .. }) => Ok(()),
        Some(MutationOutcome::Failure {
            error,
            field_errors,
        }) => {
            for (field, message) in field_errors.unwrap_or_default() {
                eprintln!("  {field}: {message}");
            }
            anyhow::bail!(error)
        }
        None => anyhow::bail!("Another operation is already in progress"),
    }
}
