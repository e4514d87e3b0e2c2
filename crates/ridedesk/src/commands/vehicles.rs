//! Vehicle (taxi) command handlers.

use dialoguer::Select;
use tabled::Tabled;

use ridedesk_core::models::{EntityId, Vehicle, VehicleInput};
use ridedesk_core::{Console, NewVehicle, VehicleAssignment};

use crate::cli::{GlobalOpts, VehicleSpec, VehiclesArgs, VehiclesCommand};
use crate::error::{CliError, prompt_err};
use crate::output;

use super::util;

#[derive(Tabled)]
struct VehicleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Plate")]
    plate: String,
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Driver")]
    driver: String,
}

impl From<&Vehicle> for VehicleRow {
    fn from(v: &Vehicle) -> Self {
        Self {
            id: v.id.to_string(),
            name: v.taxi_name.clone(),
            model: v.model.clone(),
            plate: v.plate_number.clone(),
            year: v.year.map_or_else(|| "-".into(), |y| y.to_string()),
            service: util::or_dash(v.service_name()),
            driver: v.driver_name().unwrap_or("unassigned").to_owned(),
        }
    }
}

/// Pick a service interactively. The picker query stays disabled until
/// it is opened.
async fn pick_service(console: &Console, global: &GlobalOpts) -> Result<EntityId, CliError> {
    let mut picker = console.services_list(false);
    picker.set_enabled(true);
    let services = util::load(&mut picker, "services", global).await?;
    if services.is_empty() {
        return Err(CliError::Validation {
            field: "service".into(),
            reason: "no services exist yet; create one with `ridedesk services create`".into(),
        });
    }

    let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
    let choice = Select::new()
        .with_prompt("Service")
        .items(&names)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    services
        .get(choice)
        .map(|s| s.id.clone())
        .ok_or_else(|| CliError::Internal("service selection out of range".into()))
}

pub async fn handle(
    console: &Console,
    args: VehiclesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        VehiclesCommand::List(page) => {
            let mut query = console.taxis(page.page);
            let list = util::load(query.observer_mut(), "vehicles", global).await?;
            let out = output::render_list(global.output, &list.items, |x| VehicleRow::from(x), |v| {
                v.id.to_string()
            });
            output::print_output(&out, global.quiet);
            output::print_page_footer(global, list.page, list.total_pages, list.total);
            Ok(())
        }

        VehiclesCommand::Create(spec) => {
            let VehicleSpec {
                service,
                name,
                model,
                plate,
                color,
                year,
                vin,
            } = spec;
            let service_id = match service {
                Some(id) => EntityId::from(id),
                None => pick_service(console, global).await?,
            };
            let input = NewVehicle {
                service_id,
                input: VehicleInput {
                    taxi_name: name,
                    model,
                    plate_number: plate,
                    color,
                    year,
                    vin,
                },
            };
            util::submit(console, &console.create_vehicle(), input, global).await?;
            Ok(())
        }

        VehiclesCommand::Assign { vehicle, driver } => {
            let assignment = VehicleAssignment {
                vehicle_id: EntityId::from(vehicle),
                driver_id: EntityId::from(driver),
            };
            util::submit(console, &console.assign_vehicle(), assignment, global).await?;
            Ok(())
        }

        VehiclesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete vehicle {id}?"), global.yes)? {
                return Ok(());
            }
            util::submit(console, &console.delete_vehicle(), EntityId::from(id), global).await?;
            Ok(())
        }
    }
}
