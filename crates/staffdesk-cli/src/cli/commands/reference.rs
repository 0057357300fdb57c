//! Status choices and dashboard handlers.

use anyhow::Result;
use staffdesk_core::app::AppContext;

pub async fn status_choices(app: &AppContext) -> Result<()> {
    app.choices.fetch_status_choices().await;
    let state = app.choices.snapshot();
    if let Some(error) = state.error {
        anyhow::bail!(error);
    }

    for choice in state.status_choices {
        println!("{:<22} {}", choice.value, choice.label);
    }
    Ok(())
}

pub async fn dashboard(app: &AppContext) -> Result<()> {
    app.dashboard.fetch_dashboard_data().await;
    let state = app.dashboard.snapshot();
    if let Some(error) = state.error {
        anyhow::bail!(error);
    }

    let stats = &state.data.stats;
    println!("Companies:   {}", stats.companies);
    println!("Departments: {}", stats.departments);
    println!("Employees:   {}", stats.employees);

    let charts = &state.data.chart_data;
    if !charts.employees_per_company.is_empty() {
        println!();
        println!("Employees per company:");
        for row in &charts.employees_per_company {
            println!("  {:<30} {}", row.name, row.employee_count);
        }
    }
    if !charts.departments_per_company.is_empty() {
        println!();
        println!("Departments per company:");
        for row in &charts.departments_per_company {
            println!("  {:<30} {}", row.name, row.department_count);
        }
    }
    Ok(())
}
