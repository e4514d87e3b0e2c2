//! Ride command handlers.

use tabled::Tabled;

use ridedesk_core::Console;
use ridedesk_core::models::{EntityId, Ride};

use crate::cli::{GlobalOpts, RidesArgs, RidesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RideRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Driver")]
    driver: String,
    #[tabled(rename = "Fare")]
    fare: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Payment")]
    payment: String,
    #[tabled(rename = "Date")]
    date: String,
}

impl RideRow {
    fn new(r: &Ride, color: bool) -> Self {
        Self {
            id: r.id.to_string(),
            customer: r.customer_name().to_owned(),
            driver: util::or_dash(r.driver_id.as_ref().map(EntityId::short)),
            fare: r.total_fare.map_or_else(|| "-".into(), output::money),
            status: output::status(r.status.as_deref().unwrap_or("-"), color),
            payment: match (r.payment_method.as_deref(), r.payment_status.as_deref()) {
                (Some(method), Some(state)) => format!("{method} ({state})"),
                (Some(method), None) => method.to_owned(),
                (None, state) => util::or_dash(state),
            },
            date: output::when(r.created_at),
        }
    }
}

pub async fn handle(
    console: &Console,
    args: RidesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RidesCommand::List(page) => {
            let mut query = console.rides(page.page);
            let list = util::load(query.observer_mut(), "rides", global).await?;
            let color = output::should_color(global.color);
            let out = output::render_list(
                global.output,
                &list.items,
                |r| RideRow::new(r, color),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            output::print_page_footer(global, list.page, list.total_pages, list.total);
            Ok(())
        }
    }
}
