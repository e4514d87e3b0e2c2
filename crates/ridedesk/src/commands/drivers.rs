//! Driver and driver-request command handlers.

use tabled::Tabled;

use ridedesk_core::Console;
use ridedesk_core::models::{Driver, DriverRequest, DriverStatus, EntityId, with_status};

use crate::cli::{
    DriverState, DriversArgs, DriversCommand, GlobalOpts, RequestsArgs, RequestsCommand,
};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DriverRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Rides")]
    rides: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Online")]
    online: String,
}

impl DriverRow {
    fn new(d: &Driver, color: bool) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.display_name().to_owned(),
            phone: util::or_dash(d.user().and_then(|u| u.phone_number.as_deref())),
            status: output::status(&d.status.to_string(), color),
            rides: d.completed_rides.unwrap_or(0).to_string(),
            rating: d
                .ratings
                .map_or_else(|| "-".into(), |r| format!("{:.1} ({})", r.average, r.count)),
            online: match d.is_online {
                Some(true) => "yes".into(),
                Some(false) => "no".into(),
                None => "-".into(),
            },
        }
    }
}

#[derive(Tabled)]
struct RequestRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Applicant")]
    name: String,
    #[tabled(rename = "License")]
    license: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Submitted")]
    submitted: String,
}

fn driver_detail(d: &Driver) -> String {
    let user = d.user();
    let mut lines = vec![
        format!("ID:        {}", d.id),
        format!("Name:      {}", d.display_name()),
        format!("Email:     {}", util::or_dash(user.and_then(|u| u.email.as_deref()))),
        format!("Phone:     {}", util::or_dash(user.and_then(|u| u.phone_number.as_deref()))),
        format!("Status:    {}", d.status),
        format!("Vehicle:   {}", util::or_dash(d.vehicle_id.as_ref().map(EntityId::as_str))),
        format!("Rides:     {}", d.completed_rides.unwrap_or(0)),
    ];
    if let Some(earnings) = d.earnings {
        lines.push(format!("Earnings:  {}", output::money(earnings.total)));
    }
    if let Some(r) = d.ratings {
        lines.push(format!("Rating:    {:.1} ({} ratings)", r.average, r.count));
    }
    // GeoJSON order: longitude first.
    if let Some(&[lng, lat]) = d.current_location.as_ref().map(|l| l.coordinates.as_slice()) {
        lines.push(format!("Location:  {lat:.5}, {lng:.5}"));
    }
    lines.push(format!("Joined:    {}", output::when(d.created_at)));
    lines.join("\n")
}

fn status_of(state: DriverState) -> DriverStatus {
    match state {
        DriverState::Pending => DriverStatus::Pending,
        DriverState::Approved => DriverStatus::Approved,
        DriverState::Rejected => DriverStatus::Rejected,
    }
}

// ── Drivers ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: DriversArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DriversCommand::List(args) => {
            let mut query = console.drivers(args.page.page);
            let list = util::load(query.observer_mut(), "drivers", global).await?;
            let rows: Vec<Driver> = match args.status {
                Some(state) => with_status(&list.items, status_of(state)).cloned().collect(),
                None => list.items.clone(),
            };
            let color = output::should_color(global.color);
            let out = output::render_list(
                global.output,
                &rows,
                |d| DriverRow::new(d, color),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            output::print_page_footer(global, list.page, list.total_pages, list.total);
            Ok(())
        }

        DriversCommand::Get { id } => {
            let id = EntityId::from(id);
            let mut observer = console.driver(Some(&id));
            let driver = util::load(&mut observer, "driver", global).await?;
            let out = output::render_single(global.output, &*driver, driver_detail, |d| {
                d.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DriversCommand::Approve { id } => {
            util::submit(console, &console.approve_driver(), EntityId::from(id), global).await?;
            Ok(())
        }

        DriversCommand::Reject { id } => {
            if !util::confirm(&format!("Reject driver {id}?"), global.yes)? {
                return Ok(());
            }
            util::submit(console, &console.reject_driver(), EntityId::from(id), global).await?;
            Ok(())
        }

        DriversCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete driver {id}? This cannot be undone."),
                global.yes,
            )? {
                return Ok(());
            }
            util::submit(console, &console.delete_driver(), EntityId::from(id), global).await?;
            Ok(())
        }
    }
}

// ── Driver requests ─────────────────────────────────────────────────

pub async fn handle_requests(
    console: &Console,
    args: RequestsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RequestsCommand::List(page) => {
            let mut query = console.driver_requests(page.page);
            let list = util::load(query.observer_mut(), "driver requests", global).await?;
            let color = output::should_color(global.color);
            let out = output::render_list(
                global.output,
                &list.items,
                |r: &DriverRequest| RequestRow {
                    id: r.id.to_string(),
                    name: r.display_name().to_owned(),
                    license: util::or_dash(r.license_number.as_deref()),
                    status: output::status(&r.status.to_string(), color),
                    submitted: output::when(r.created_at),
                },
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            output::print_page_footer(global, list.page, list.total_pages, list.total);
            Ok(())
        }

        RequestsCommand::Approve { id } => {
            util::submit(
                console,
                &console.approve_driver_request(),
                EntityId::from(id),
                global,
            )
            .await?;
            Ok(())
        }

        RequestsCommand::Reject { id } => {
            if !util::confirm(&format!("Reject application {id}?"), global.yes)? {
                return Ok(());
            }
            util::submit(
                console,
                &console.reject_driver_request(),
                EntityId::from(id),
                global,
            )
            .await?;
            Ok(())
        }
    }
}
