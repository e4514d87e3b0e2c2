//! Commission command handlers.

use tabled::Tabled;

use ridedesk_core::Console;
use ridedesk_core::models::{CommissionInput, CommissionRide};

use crate::cli::{CommissionsArgs, CommissionsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct CommissionRow {
    #[tabled(rename = "Ride")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

impl From<&CommissionRide> for CommissionRow {
    fn from(r: &CommissionRide) -> Self {
        let charge = r.commission.unwrap_or_default();
        Self {
            id: r.id.to_string(),
            date: output::when(r.created_at),
            rate: charge.rate.map_or_else(|| "-".into(), |rate| format!("{rate}%")),
            amount: charge.amount.map_or_else(|| "-".into(), output::money),
        }
    }
}

pub async fn handle(
    console: &Console,
    args: CommissionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CommissionsCommand::List(page) => {
            let mut query = console.commissions(page.page);
            let history = util::load(query.observer_mut(), "commissions", global).await?;
            if global.output == OutputFormat::Table {
                let rides = &history.rides;
                let out = output::render_list(
                    global.output,
                    &rides.items,
                    |x| CommissionRow::from(x),
                    |r| r.id.to_string(),
                );
                output::print_output(&out, global.quiet);
                output::print_output(
                    &format!("Total commission: {}", output::money(history.total_commission)),
                    global.quiet,
                );
                output::print_page_footer(global, rides.page, rides.total_pages, rides.total);
            } else {
                let out = output::render_single(global.output, &*history, |_| String::new(), |h| {
                    h.rides
                        .items
                        .iter()
                        .map(|r| r.id.to_string())
                        .collect::<Vec<_>>()
                        .join("\n")
                });
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        CommissionsCommand::Create { date, rate } => {
            let input = CommissionInput {
                date: util::parse_date("date", &date)?,
                commission: rate,
            };
            util::submit(console, &console.create_commission(), input, global).await?;
            Ok(())
        }
    }
}
