//! Shared helpers for command handlers.

use std::sync::Arc;

use chrono::NaiveDate;

use ridedesk_core::{Console, Mutation, NoticeLevel, QueryObserver};

use crate::cli::GlobalOpts;
use crate::error::{CliError, prompt_err};
use crate::output;

/// Wait for an observer to settle behind a spinner, then hand back its data.
pub async fn load<T>(
    observer: &mut QueryObserver<T>,
    what: &str,
    global: &GlobalOpts,
) -> Result<Arc<T>, CliError>
where
    T: Send + Sync + 'static,
{
    let bar = output::spinner(&format!("Loading {what}..."), global);
    let result = observer.settled().await;
    bar.finish_and_clear();

    if let Some(err) = result.error {
        return Err(err.into());
    }
    result
        .data
        .ok_or_else(|| CliError::Internal(format!("no {what} returned")))
}

/// Run a mutation and print its success notice.
///
/// Failure notices are not printed; the returned error is reported instead.
pub async fn submit<I, O>(
    console: &Console,
    mutation: &Mutation<I, O>,
    input: I,
    global: &GlobalOpts,
) -> Result<Arc<O>, CliError>
where
    I: Clone + Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    let mut notices = console.notices();
    let bar = output::spinner("Saving...", global);
    let result = mutation.mutate(input).await;
    bar.finish_and_clear();

    while let Ok(notice) = notices.try_recv() {
        if notice.level == NoticeLevel::Success {
            output::print_notice(&notice, global);
        }
    }
    Ok(result?)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Parse a `YYYY-MM-DD` argument.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("'{raw}' is not a YYYY-MM-DD date"),
    })
}

/// `-` for absent values.
pub fn or_dash(value: Option<&str>) -> String {
    value.map_or_else(|| "-".into(), str::to_owned)
}
