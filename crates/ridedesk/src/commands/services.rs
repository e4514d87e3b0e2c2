//! Ride service command handlers.

use tabled::Tabled;

use ridedesk_core::models::{EntityId, Service, ServiceInput};
use ridedesk_core::{Console, Update};

use crate::cli::{GlobalOpts, ServicesArgs, ServicesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Base fare")]
    base_fare: String,
    #[tabled(rename = "Per km")]
    per_km: String,
    #[tabled(rename = "Per min")]
    per_minute: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn fare(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), output::money)
}

impl From<&Service> for ServiceRow {
    fn from(s: &Service) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            base_fare: fare(s.base_fare),
            per_km: fare(s.per_km_rate),
            per_minute: fare(s.per_minute_rate),
            description: util::or_dash(s.description.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct PickRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn handle(
    console: &Console,
    args: ServicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ServicesCommand::List(page) => {
            let mut query = console.services(page.page);
            let list = util::load(query.observer_mut(), "services", global).await?;
            let out = output::render_list(global.output, &list.items, |x| ServiceRow::from(x), |s| {
                s.id.to_string()
            });
            output::print_output(&out, global.quiet);
            output::print_page_footer(global, list.page, list.total_pages, list.total);
            Ok(())
        }

        ServicesCommand::All => {
            let mut picker = console.services_list(true);
            let services = util::load(&mut picker, "services", global).await?;
            let out = output::render_list(
                global.output,
                &services,
                |s| PickRow {
                    id: s.id.to_string(),
                    name: s.name.clone(),
                },
                |s| s.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ServicesCommand::Create {
            name,
            description,
            image,
        } => {
            let input = ServiceInput {
                name,
                description,
                service_image: image,
            };
            util::submit(console, &console.create_service(), input, global).await?;
            Ok(())
        }

        ServicesCommand::Update {
            id,
            name,
            description,
            image,
        } => {
            let id = EntityId::from(id);
            let mut picker = console.services_list(true);
            let services = util::load(&mut picker, "services", global).await?;
            let current = services
                .iter()
                .find(|s| s.id == id)
                .ok_or_else(|| CliError::NotFound {
                    message: format!("service '{id}' not found"),
                })?;

            let mut input = ServiceInput::from(current);
            if let Some(name) = name {
                input.name = name;
            }
            if let Some(description) = description {
                input.description = description;
            }
            if image.is_some() {
                input.service_image = image;
            }
            util::submit(console, &console.update_service(), Update { id, input }, global)
                .await?;
            Ok(())
        }

        ServicesCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete service {id}? Vehicles under it lose their service."),
                global.yes,
            )? {
                return Ok(());
            }
            util::submit(console, &console.delete_service(), EntityId::from(id), global).await?;
            Ok(())
        }
    }
}
