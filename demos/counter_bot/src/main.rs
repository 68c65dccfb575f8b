//! Counter Bot
//!
//! A small application exercising every route kind Rivet supports:
//!
//! - `/echo message:<text>`: plain command with a typed argument
//! - `/counter start:<n>`: posts a button whose count lives in its `custom_id`
//! - `/roll sides:<n>`: a blocking handler run on the worker pool
//! - `/fruit name:<text>`: autocomplete on a string option
//! - `/colour`: a select menu
//! - `/feedback`: opens a modal and acknowledges its submission; servers only
//!
//! # Usage
//!
//! ```bash
//! RIVET_APPLICATION__PUBLIC_KEY=<hex> cargo run --package counter-bot -- --profile dev
//! ```

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use clap::Parser;
use rivet::prelude::*;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "counter-bot", about = "Rivet interactions demo")]
struct Args {
    /// Configuration file; searched for as `rivet.toml` when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile (`dev`, `prod` or a custom name).
    #[arg(short, long)]
    profile: Option<String>,
}

// ============================================================================
// Commands
// ============================================================================

async fn echo(args: Arguments) -> String {
    args.get::<String>("message").unwrap_or_default()
}

const COUNTER: &str = "counter";

fn counter_message(count: i64) -> Result<Message> {
    let id = encode_state(COUNTER, (count,))?;
    Ok(Message::new(format!("Count: {count}"))
        .row(Component::button(ButtonStyle::Primary, "+1", id)))
}

async fn start_counter(args: Arguments, invoker: Invoker) -> Result<Reply> {
    let start = args.get::<i64>("start").unwrap_or(0);
    info!(user = %invoker.username, start, "Counter started");
    Ok(Reply::message(counter_message(start)?))
}

async fn increment(State((count,)): State<(i64,)>) -> Result<Reply> {
    let next = count
        .checked_add(1)
        .ok_or_else(|| anyhow::anyhow!("counter overflow"))?;
    Ok(Reply::update(counter_message(next)?))
}

async fn counter_failed(err: DispatchError) -> Reply {
    tracing::warn!(error = %err, "Counter update failed");
    Reply::ephemeral("This counter can't go any higher.")
}

/// Deliberately synchronous; runs on a worker thread.
fn roll(args: Arguments) -> String {
    let sides = args.get::<i64>("sides").unwrap_or(6).max(1) as u64;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or_default();
    format!("🎲 {}", nanos % sides + 1)
}

const FRUITS: &[&str] = &[
    "apple", "apricot", "banana", "blueberry", "cherry", "grape", "lemon", "mango", "orange",
    "peach", "pear", "plum",
];

async fn suggest_fruit(focused: FocusedOption) -> Reply {
    let typed = focused.text().to_lowercase();
    Reply::autocomplete(
        FRUITS
            .iter()
            .copied()
            .filter(|fruit| fruit.starts_with(&typed)),
    )
}

async fn pick_fruit(args: Arguments) -> String {
    let fruit = args.get::<String>("name").unwrap_or_default();
    format!("You picked {fruit}.")
}

const COLOUR: &str = "colour";

async fn colour_menu() -> Result<Reply> {
    let options = ["Red", "Green", "Blue"]
        .into_iter()
        .map(|c| SelectOption::new(c, c.to_lowercase()));
    let menu = Component::string_select(encode_state(COLOUR, ())?, options)
        .placeholder("Choose a colour");
    Ok(Reply::ephemeral(Message::new("Pick one:").row(menu)))
}

async fn colour_chosen(SelectValues(values): SelectValues) -> Reply {
    let choice = values.first().map(String::as_str).unwrap_or("nothing");
    Reply::update(Message::new(format!("You chose {choice}.")).components(Vec::new()))
}

const FEEDBACK: &str = "feedback";

async fn open_feedback() -> Result<Reply> {
    let modal = Modal::new(encode_state(FEEDBACK, ())?, "Send feedback")
        .row(Component::text_input("subject", TextInputStyle::Short, "Subject").length_range(1, 80))
        .row(
            Component::text_input("body", TextInputStyle::Paragraph, "What's on your mind?")
                .required(false),
        );
    Ok(Reply::modal(modal))
}

async fn feedback_submitted(fields: ModalFields, invoker: Invoker) -> Reply {
    let subject = fields.get("subject").unwrap_or("(none)");
    info!(user = %invoker.username, subject, "Feedback received");
    Reply::ephemeral(format!("Thanks for the feedback on \"{subject}\"!"))
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = RivetRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }

    let runtime = builder
        .command(
            CommandDefinition::new("echo")
                .description("Repeat a message")
                .param(ParameterSpec::string("message").length(1, 2000))
                .handler(echo),
        )
        .command(
            CommandDefinition::new("counter")
                .description("Post a counter button")
                .param(ParameterSpec::integer("start").optional())
                .handler(start_counter),
        )
        .component(
            ComponentDefinition::new::<(i64,)>(COUNTER)
                .handler(increment)
                .on_error(counter_failed),
        )
        .command(
            CommandDefinition::new("roll")
                .description("Roll a die")
                .param(ParameterSpec::integer("sides").range(2.0, 100.0).optional())
                .sync_handler(roll),
        )
        .command(
            CommandDefinition::new("fruit")
                .description("Pick a fruit")
                .param(ParameterSpec::string("name"))
                .handler(pick_fruit)
                .autocomplete("name", suggest_fruit),
        )
        .command(
            CommandDefinition::new("colour")
                .description("Choose a colour")
                .handler(colour_menu),
        )
        .component(ComponentDefinition::new::<()>(COLOUR).handler(colour_chosen))
        .command(
            CommandDefinition::new("feedback")
                .description("Send feedback")
                .check(Check::guild_only("Feedback can only be sent from a server."))
                .handler(open_feedback),
        )
        .component(ComponentDefinition::new::<()>(FEEDBACK).handler(feedback_submitted))
        .build()?;

    info!(
        addr = %runtime.config().server.addr(),
        path = %runtime.config().server.path,
        "Counter bot configured"
    );
    runtime.run().await?;
    Ok(())
}
