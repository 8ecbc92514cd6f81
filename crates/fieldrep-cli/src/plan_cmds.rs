//! CLI handlers for `fieldrep plan` subcommands.
//!
//! Implements:
//! - `fieldrep plan create <file>` -- create a daily plan from a TOML draft
//! - `fieldrep plan new --area ...` -- create a daily plan from flags
//!
//! Both walk the same [`PlanWizard`] a screen would: location, then
//! selection, then details and submit.

use anyhow::{Context, Result};

use fieldrep_core::wizard::draft::PLAN_DATE_FORMAT;
use fieldrep_core::wizard::{
    AreaRef, CreatedPlan, PlanFile, PlanWizard, parse_plan_date, parse_plan_file,
};

use crate::PlanCommands;
use crate::app::App;
use crate::resolve::resolve_working_area;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(command: PlanCommands, app: &App) -> Result<()> {
    app.require_login()?;
    match command {
        PlanCommands::Create { file } => cmd_create(app, &file).await,
        PlanCommands::New {
            area,
            doctor,
            chemist,
            date,
            notes,
            work_together,
        } => {
            let plan = PlanFile {
                working_area: AreaRef::parse(&area),
                date: date.as_deref().map(parse_plan_date).transpose()?,
                notes: notes.unwrap_or_default(),
                work_together,
                doctors: doctor,
                chemists: chemist,
            };
            plan.validate()?;
            create_plan(app, &plan).await
        }
    }
}

// -----------------------------------------------------------------------
// fieldrep plan create <file>
// -----------------------------------------------------------------------

async fn cmd_create(app: &App, file_path: &str) -> Result<()> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read plan file: {file_path}"))?;
    let plan = parse_plan_file(&content)
        .with_context(|| format!("failed to parse plan file: {file_path}"))?;
    create_plan(app, &plan).await
}

// -----------------------------------------------------------------------
// Shared wizard walk
// -----------------------------------------------------------------------

/// Summary captured before submit, for printing.
struct PlanSummary {
    area: String,
    date: String,
    doctors: usize,
    chemists: usize,
    work_together: bool,
}

async fn create_plan(app: &App, plan: &PlanFile) -> Result<()> {
    let mut wizard = PlanWizard::new(app.api.clone(), app.cache());

    let result = drive(&mut wizard, plan).await;
    if result.is_err() {
        // Leave nothing half-filled in the cache for the next run.
        wizard.dismiss().await;
    }
    let (created, summary) = result?;

    println!("Daily plan created successfully.");
    println!();
    println!("  Plan ID:       {}", created.id);
    println!("  Working area:  {}", summary.area);
    println!(
        "  Date:          {}",
        created.plan_date.as_deref().unwrap_or(&summary.date)
    );
    println!("  Doctors:       {}", summary.doctors);
    println!("  Chemists:      {}", summary.chemists);
    println!(
        "  Work together: {}",
        if summary.work_together { "yes" } else { "no" }
    );
    Ok(())
}

async fn drive(wizard: &mut PlanWizard, plan: &PlanFile) -> Result<(CreatedPlan, PlanSummary)> {
    // 1. Location.
    let areas = wizard
        .load_working_areas()
        .await
        .context("failed to load working areas")?;
    let area_id = resolve_working_area(areas, &plan.working_area)?.id;
    let area_name = wizard.select_working_area(area_id)?.display_name();

    wizard
        .next()
        .await
        .with_context(|| format!("failed to load doctors and chemists for {area_name}"))?;

    // 2. Selection.
    for &id in &plan.doctors {
        wizard
            .toggle_doctor(id)
            .with_context(|| format!("cannot add doctor {id} in {area_name}"))?;
    }
    for &id in &plan.chemists {
        wizard
            .toggle_chemist(id)
            .with_context(|| format!("cannot add chemist {id} in {area_name}"))?;
    }
    wizard.next().await?;

    // 3. Details.
    if let Some(date) = plan.date {
        wizard.set_plan_date(date)?;
    }
    wizard.set_notes(plan.notes.clone())?;
    wizard.set_work_together(plan.work_together)?;

    let draft = wizard.draft();
    let summary = PlanSummary {
        area: area_name,
        date: draft.plan_date.format(PLAN_DATE_FORMAT).to_string(),
        doctors: draft.doctor_ids.len(),
        chemists: draft.chemist_ids.len(),
        work_together: draft.work_together,
    };

    let created = wizard
        .submit()
        .await
        .context("failed to create daily plan")?;
    Ok((created, summary))
}
