//! Rider account command handlers.

use std::fmt::Write;

use tabled::Tabled;

use ridedesk_core::Console;
use ridedesk_core::models::{EntityId, User, UserDetails};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct UserRow {
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
    #[tabled(rename = "Last ride")]
    last_ride: String,
}

impl UserRow {
    fn new(u: &User, color: bool) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.full_name.clone(),
            phone: util::or_dash(u.phone_number.as_deref()),
            status: output::status(if u.is_active { "active" } else { "inactive" }, color),
            rides: u
                .total_completed_rides
                .map_or_else(|| u.ride_history.len().to_string(), |n| n.to_string()),
            last_ride: output::when(u.last_ride_at()),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn detail(u: &UserDetails) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:          {}", u.id);
    let _ = writeln!(out, "Name:        {}", u.full_name);
    let _ = writeln!(
        out,
        "Email:       {} (verified: {})",
        util::or_dash(u.email.as_deref()),
        yes_no(u.is_email_verified)
    );
    let _ = writeln!(
        out,
        "Phone:       {} (verified: {})",
        util::or_dash(u.phone_number.as_deref()),
        yes_no(u.is_phone_verified)
    );
    let _ = writeln!(out, "Role:        {}", util::or_dash(u.role.as_deref()));
    let _ = writeln!(out, "Active:      {}", yes_no(u.is_active));
    let _ = writeln!(out, "Joined:      {}", output::when(u.created_at));
    let _ = writeln!(out, "Last seen:   {}", output::when(u.last_seen.or(u.last_active)));
    if let Some(wallet) = u.wallet.as_ref() {
        let _ = writeln!(out, "Wallet:      {}", output::money(wallet.balance));
    }
    let _ = writeln!(
        out,
        "Rides:       {}",
        u.total_completed_rides
            .map_or_else(|| u.ride_history.len().to_string(), |n| n.to_string())
    );

    if !u.payment_methods.is_empty() {
        let _ = writeln!(out, "\nPayment methods:");
        for pm in &u.payment_methods {
            let default = if pm.is_default { " (default)" } else { "" };
            let _ = writeln!(
                out,
                "  {} {}{default}",
                pm.kind,
                util::or_dash(pm.card_number.as_deref())
            );
        }
    }

    if !u.login_history.is_empty() {
        let _ = writeln!(out, "\nRecent logins:");
        for login in u.login_history.iter().take(5) {
            let _ = writeln!(
                out,
                "  {}  {}  {}",
                output::when(login.login_time),
                util::or_dash(login.device.as_deref()),
                util::or_dash(login.ip_address.as_deref())
            );
        }
    }
    out.trim_end().to_owned()
}

pub async fn handle(
    console: &Console,
    args: UsersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List(page) => {
            let mut query = console.users(page.page);
            let list = util::load(query.observer_mut(), "users", global).await?;
            let color = output::should_color(global.color);
            let out = output::render_list(
                global.output,
                &list.items,
                |u| UserRow::new(u, color),
                |u| u.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            output::print_page_footer(global, list.page, list.total_pages, list.total);
            Ok(())
        }

        UsersCommand::Get { id } => {
            let id = EntityId::from(id);
            let mut observer = console.user(Some(&id));
            let user = util::load(&mut observer, "user", global).await?;
            let out = output::render_single(global.output, &*user, detail, |u| u.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete user {id}? This cannot be undone."),
                global.yes,
            )? {
                return Ok(());
            }
            util::submit(console, &console.delete_user(), EntityId::from(id), global).await?;
            Ok(())
        }
    }
}
