//! Promo code command handlers.

use tabled::Tabled;

use ridedesk_core::models::{EntityId, PromoCode, PromoCodeInput, PromoStatus};
use ridedesk_core::{Console, Update};

use crate::cli::{GlobalOpts, PromoArgs, PromoCommand, PromoSpec, PromoState};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct PromoRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Discount")]
    discount: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Starts")]
    starts: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl PromoRow {
    fn new(p: &PromoCode, color: bool) -> Self {
        Self {
            id: p.id.to_string(),
            code: util::or_dash(p.code.as_deref().or(p.title.as_deref())),
            discount: p.discount_label(),
            status: output::status(p.status.as_deref().unwrap_or("-"), color),
            starts: date_only(p.start_date.as_deref()),
            expires: date_only(p.expiry_date.as_deref()),
        }
    }
}

/// `2025-01-01T00:00:00.000Z` -> `2025-01-01`.
fn date_only(raw: Option<&str>) -> String {
    raw.map_or_else(|| "-".into(), |s| s.split('T').next().unwrap_or(s).to_owned())
}

fn to_input(spec: PromoSpec) -> Result<PromoCodeInput, CliError> {
    Ok(PromoCodeInput {
        discount_value: spec.discount,
        start_date: util::parse_date("start", &spec.start)?,
        expiry_date: util::parse_date("expiry", &spec.expiry)?,
        status: match spec.status {
            PromoState::Active => PromoStatus::Active,
            PromoState::Inactive => PromoStatus::Inactive,
            PromoState::Expired => PromoStatus::Expired,
        },
    })
}

pub async fn handle(
    console: &Console,
    args: PromoArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PromoCommand::List(page) => {
            let mut query = console.promo_codes(page.page);
            let list = util::load(query.observer_mut(), "promo codes", global).await?;
            let color = output::should_color(global.color);
            let out = output::render_list(
                global.output,
                &list.items,
                |p| PromoRow::new(p, color),
                |p| p.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            output::print_page_footer(global, list.page, list.total_pages, list.total);
            Ok(())
        }

        PromoCommand::Create(spec) => {
            let input = to_input(spec)?;
            util::submit(console, &console.create_promo_code(), input, global).await?;
            Ok(())
        }

        PromoCommand::Update { id, spec } => {
            let update = Update {
                id: EntityId::from(id),
                input: to_input(spec)?,
            };
            util::submit(console, &console.update_promo_code(), update, global).await?;
            Ok(())
        }

        PromoCommand::Delete { id } => {
            if !util::confirm(&format!("Delete promo code {id}?"), global.yes)? {
                return Ok(());
            }
            util::submit(console, &console.delete_promo_code(), EntityId::from(id), global)
                .await?;
            Ok(())
        }
    }
}
