//! Admin inbox command handlers.

use tabled::Tabled;
use tracing::debug;

use ridedesk_core::Console;
use ridedesk_core::models::{EntityId, Notification, unread_count};

use crate::cli::{GlobalOpts, NotificationsArgs, NotificationsCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

const MESSAGE_WIDTH: usize = 60;

#[derive(Tabled)]
struct NotificationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "From")]
    sender: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Received")]
    received: String,
}

impl NotificationRow {
    fn new(n: &Notification, color: bool) -> Self {
        Self {
            id: n.id.to_string(),
            title: util::or_dash(n.title.as_deref()),
            message: truncate(&n.message, MESSAGE_WIDTH),
            kind: n.kind.clone(),
            sender: n.sender_name().to_owned(),
            status: output::status(if n.is_read { "read" } else { "unread" }, color),
            received: output::when(n.created_at),
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }
    let cut: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{cut}…")
}

pub async fn handle(
    console: &Console,
    args: NotificationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NotificationsCommand::List { unread } => {
            let mut observer = console.notifications();
            let inbox = util::load(&mut observer, "notifications", global).await?;
            let items: Vec<Notification> = inbox
                .items
                .iter()
                .filter(|n| !unread || !n.is_read)
                .cloned()
                .collect();
            let color = output::should_color(global.color);
            let out = output::render_list(
                global.output,
                &items,
                |n| NotificationRow::new(n, color),
                |n| n.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            if global.output == OutputFormat::Table {
                output::print_output(
                    &format!("{} unread", unread_count(&inbox.items)),
                    global.quiet,
                );
            }
            Ok(())
        }

        NotificationsCommand::Read { id } => {
            // The optimistic patch needs the inbox in the cache.
            let mut observer = console.notifications();
            util::load(&mut observer, "notifications", global).await?;
            util::submit(
                console,
                &console.mark_notification_read(),
                EntityId::from(id),
                global,
            )
            .await?;
            Ok(())
        }

        NotificationsCommand::ReadAll => {
            let mut observer = console.notifications();
            util::load(&mut observer, "notifications", global).await?;
            util::submit(console, &console.mark_all_notifications_read(), (), global).await?;
            Ok(())
        }

        NotificationsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete notification {id}?"), global.yes)? {
                return Ok(());
            }
            let mut observer = console.notifications();
            util::load(&mut observer, "notifications", global).await?;
            util::submit(
                console,
                &console.delete_notification(),
                EntityId::from(id),
                global,
            )
            .await?;
            Ok(())
        }

        NotificationsCommand::Watch => watch(console, global).await,
    }
}

/// Print the unread count each time the polled inbox changes, until
/// Ctrl-C.
async fn watch(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    let mut observer = console.notifications();
    let inbox = util::load(&mut observer, "notifications", global).await?;
    let mut last = unread_count(&inbox.items);
    output::print_output(&format!("{last} unread"), global.quiet);

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            _ = &mut interrupt => return Ok(()),
            alive = observer.changed() => {
                if !alive {
                    return Ok(());
                }
            }
        }

        let result = observer.result();
        if let Some(err) = result.error {
            debug!(error = %err, "notification poll failed");
            continue;
        }
        let Some(inbox) = result.data else { continue };
        let count = unread_count(&inbox.items);
        if count != last {
            let line = match inbox.items.iter().find(|n| !n.is_read) {
                Some(newest) if count > last => format!(
                    "{count} unread (latest: {})",
                    newest.title.as_deref().unwrap_or(&newest.message)
                ),
                _ => format!("{count} unread"),
            };
            output::print_output(&line, global.quiet);
            last = count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_messages_are_untouched() {
        assert_eq!(truncate("Trip finished", 20), "Trip finished");
    }

    #[test]
    fn long_messages_end_with_an_ellipsis() {
        let out = truncate("abcdefghij", 5);
        assert_eq!(out, "abcd…");
        assert_eq!(out.chars().count(), 5);
    }
}
