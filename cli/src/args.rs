use clap::{Parser, Subcommand};

use subscriber::SubscriberId;

#[derive(Debug, Parser)]
#[clap(name = "dealwatch", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Run the monitor and the bot until interrupted.
    Run,

    /// Turn monitoring on for a chat.
    Activate {
        #[arg(allow_negative_numbers = true)]
        chat_id: SubscriberId,
    },

    /// Turn monitoring off for a chat. Messages already shown stay.
    Deactivate {
        #[arg(allow_negative_numbers = true)]
        chat_id: SubscriberId,
    },

    /// Change a chat's filter. Omitted options keep their value.
    SetFilter {
        #[arg(allow_negative_numbers = true)]
        chat_id: SubscriberId,

        /// Number of listing pages to watch
        #[clap(long)]
        pages: Option<u32>,

        /// Lowest floor price in USD
        #[clap(long)]
        price_min: Option<f64>,

        /// Highest floor price in USD ("inf" for no limit)
        #[clap(long)]
        price_max: Option<f64>,

        /// Largest floor/offer gap in percent
        #[clap(long, allow_negative_numbers = true)]
        spread_max: Option<f64>,
    },

    /// Never show a collection to this chat.
    Exclude {
        #[arg(allow_negative_numbers = true)]
        chat_id: SubscriberId,
        identity: String,
    },

    /// Undo an exclusion.
    Include {
        #[arg(allow_negative_numbers = true)]
        chat_id: SubscriberId,
        identity: String,
    },

    ClearExclusions {
        #[arg(allow_negative_numbers = true)]
        chat_id: SubscriberId,
    },

    /// Forget a chat entirely.
    Remove {
        #[arg(allow_negative_numbers = true)]
        chat_id: SubscriberId,
    },

    /// Upper bound on any chat's page count.
    SetMaxPages { max_pages: u32 },

    /// Print every known chat and its settings.
    List,

    /// Let a chat use the bot's commands.
    Allow {
        #[arg(allow_negative_numbers = true)]
        chat_id: SubscriberId,
    },

    /// Revoke a chat's access and stop its monitoring.
    Disallow {
        #[arg(allow_negative_numbers = true)]
        chat_id: SubscriberId,
    },

    /// Print the chats allowed to use the bot.
    Users,
}
