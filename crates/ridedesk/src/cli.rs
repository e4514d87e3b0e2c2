//! Clap derive structures for the `ridedesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Kept free of workspace crates so `build.rs` can include it for man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ridedesk -- admin console for the ride-hailing backend
#[derive(Debug, Parser)]
#[command(
    name = "ridedesk",
    version,
    about = "Administer a ride-hailing platform from the command line",
    long_about = "Review drivers, vehicles, services, promo codes, commissions,\n\
        rides, users and notifications of a ride-hailing admin backend.\n\n\
        Sign in once with `ridedesk login`; the token is kept in the system keyring.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "RIDEDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "RIDEDESK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides RIDEDESK_TOKEN, keyring and profile)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RIDEDESK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "RIDEDESK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout (e.g. "30s", "2m"; overrides profile)
    #[arg(long, env = "RIDEDESK_TIMEOUT", global = true)]
    pub timeout: Option<String>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with an admin account and store the token
    Login(LoginArgs),

    /// Forget the stored token
    Logout,

    /// Change, reset or recover the admin password
    #[command(alias = "pw")]
    Password(PasswordArgs),

    /// Dashboard overview and monthly figures
    Stats,

    /// Review and manage drivers
    #[command(alias = "dr")]
    Drivers(DriversArgs),

    /// Pending driver applications
    #[command(alias = "req")]
    Requests(RequestsArgs),

    /// Manage taxis and driver assignments
    #[command(alias = "taxis")]
    Vehicles(VehiclesArgs),

    /// Manage ride services and their fares
    #[command(alias = "svc")]
    Services(ServicesArgs),

    /// Manage promo codes
    #[command(alias = "promos")]
    Promo(PromoArgs),

    /// Commission history and rates
    Commissions(CommissionsArgs),

    /// Browse rides
    Rides(RidesArgs),

    /// Manage rider accounts
    Users(UsersArgs),

    /// Admin inbox
    #[command(alias = "notif")]
    Notifications(NotificationsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Page selector shared by every list command.
#[derive(Debug, Clone, Copy, Args)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCOUNT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Email or phone number (defaults to the profile's `email_or_phone`)
    pub email_or_phone: Option<String>,

    /// Print the token instead of storing it in the keyring
    #[arg(long)]
    pub print_token: bool,
}

#[derive(Debug, Args)]
pub struct PasswordArgs {
    #[command(subcommand)]
    pub command: PasswordCommand,
}

#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    /// Change the password of the signed-in admin
    Change,

    /// Send a one-time code to the account's email or phone
    Forgot {
        /// Email or phone number
        email_or_phone: String,
    },

    /// Verify a one-time code
    VerifyOtp {
        /// Email the code was sent to
        email: String,

        /// Six-digit code
        otp: String,

        /// What the code is for
        #[arg(long, value_enum, default_value = "password-reset")]
        purpose: OtpKind,
    },

    /// Set a new password after verifying a one-time code
    Reset {
        /// Email or phone number
        email_or_phone: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OtpKind {
    PasswordReset,
    EmailVerification,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DRIVERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DriversArgs {
    #[command(subcommand)]
    pub command: DriversCommand,
}

#[derive(Debug, Subcommand)]
pub enum DriversCommand {
    /// List drivers
    #[command(alias = "ls")]
    List(DriverListArgs),

    /// Show one driver
    Get {
        /// Driver ID
        id: String,
    },

    /// Approve a driver
    Approve {
        /// Driver ID
        id: String,
    },

    /// Reject a driver
    Reject {
        /// Driver ID
        id: String,
    },

    /// Delete a driver
    #[command(alias = "rm")]
    Delete {
        /// Driver ID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct DriverListArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Only show drivers in this onboarding state (filters the fetched page)
    #[arg(long, value_enum)]
    pub status: Option<DriverState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DriverState {
    /// Waiting for review
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Args)]
pub struct RequestsArgs {
    #[command(subcommand)]
    pub command: RequestsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RequestsCommand {
    /// List driver applications
    #[command(alias = "ls")]
    List(PageArgs),

    /// Approve an application
    Approve {
        /// Driver ID
        id: String,
    },

    /// Reject an application
    Reject {
        /// Driver ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VEHICLES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VehiclesArgs {
    #[command(subcommand)]
    pub command: VehiclesCommand,
}

#[derive(Debug, Subcommand)]
pub enum VehiclesCommand {
    /// List vehicles
    #[command(alias = "ls")]
    List(PageArgs),

    /// Register a vehicle under a service
    Create(VehicleSpec),

    /// Assign a vehicle to a driver
    Assign {
        /// Vehicle ID
        vehicle: String,

        /// Driver ID
        driver: String,
    },

    /// Delete a vehicle
    #[command(alias = "rm")]
    Delete {
        /// Vehicle ID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct VehicleSpec {
    /// Service ID the vehicle runs under (see `ridedesk services all`)
    #[arg(long)]
    pub service: Option<String>,

    /// Display name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub model: String,

    #[arg(long)]
    pub plate: String,

    #[arg(long)]
    pub color: String,

    #[arg(long)]
    pub year: u16,

    #[arg(long)]
    pub vin: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SERVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ServicesArgs {
    #[command(subcommand)]
    pub command: ServicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServicesCommand {
    /// List services
    #[command(alias = "ls")]
    List(PageArgs),

    /// Service names and IDs, for picking one
    All,

    /// Create a service
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        /// URL of an already-hosted image
        #[arg(long)]
        image: Option<String>,
    },

    /// Update a service; omitted fields keep their current value
    Update {
        /// Service ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        image: Option<String>,
    },

    /// Delete a service
    #[command(alias = "rm")]
    Delete {
        /// Service ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROMO CODES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PromoArgs {
    #[command(subcommand)]
    pub command: PromoCommand,
}

#[derive(Debug, Subcommand)]
pub enum PromoCommand {
    /// List promo codes
    #[command(alias = "ls")]
    List(PageArgs),

    /// Create a promo code
    Create(PromoSpec),

    /// Replace a promo code's terms
    Update {
        /// Promo code ID
        id: String,

        #[command(flatten)]
        spec: PromoSpec,
    },

    /// Delete a promo code
    #[command(alias = "rm")]
    Delete {
        /// Promo code ID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct PromoSpec {
    /// Discount amount
    #[arg(long)]
    pub discount: f64,

    /// First valid day (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// Last valid day (YYYY-MM-DD)
    #[arg(long)]
    pub expiry: String,

    #[arg(long, value_enum, default_value = "active")]
    pub status: PromoState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PromoState {
    Active,
    Inactive,
    Expired,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMMISSIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CommissionsArgs {
    #[command(subcommand)]
    pub command: CommissionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CommissionsCommand {
    /// Commission charged per ride
    #[command(alias = "ls")]
    List(PageArgs),

    /// Set the commission rate from a date onwards
    Create {
        /// Effective date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Rate, e.g. "12.5"
        #[arg(long)]
        rate: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RIDES & USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RidesArgs {
    #[command(subcommand)]
    pub command: RidesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RidesCommand {
    /// List rides
    #[command(alias = "ls")]
    List(PageArgs),
}

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List riders
    #[command(alias = "ls")]
    List(PageArgs),

    /// Show a rider's profile, wallet and history
    Get {
        /// User ID
        id: String,
    },

    /// Delete a rider
    #[command(alias = "rm")]
    Delete {
        /// User ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NOTIFICATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    /// Show the inbox
    #[command(alias = "ls")]
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },

    /// Mark one notification as read
    Read {
        /// Notification ID
        id: String,
    },

    /// Mark every notification as read
    ReadAll,

    /// Delete a notification
    #[command(alias = "rm")]
    Delete {
        /// Notification ID
        id: String,
    },

    /// Poll the inbox and print unread-count changes until interrupted
    Watch,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (api_url, email_or_phone, token_env, insecure, ca_cert,
        /// timeout, stale_time, gc_time, notification_poll)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
