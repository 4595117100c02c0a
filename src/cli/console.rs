//! Operator console
//!
//! Line-oriented commands read from stdin while the controller runs.

use crate::controller::{ArmOutcome, ControllerStatus, SamplingController};
use crate::quote::{FilterError, LiveQuotes, PublisherType, Quote};
use crate::store::Sample;
use rust_decimal::Decimal;
use std::fmt::Write;
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  start               arm recording (one sample now, then every period)
  reset               disarm recording and clear the local history view
  purge               delete every stored sample
  amount <n>          set the transaction amount
  publisher <type>    none | merchant
  pay <TAG>           toggle a payment method (e.g. BANK)
  quotes              show the live buy/sell listings
  history             show recorded samples
  status              show controller state
  help                show this message
  quit                stop and exit";

/// A parsed operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Start,
    Reset,
    Purge,
    Amount(Decimal),
    Publisher(PublisherType),
    Pay(String),
    Quotes,
    History,
    Status,
    Help,
    Quit,
}

/// Unparseable operator input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl FromStr for OperatorCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts.next().ok_or(CommandError::Empty)?;
        let arg = parts.next();

        match command.to_lowercase().as_str() {
            "start" => Ok(OperatorCommand::Start),
            "reset" => Ok(OperatorCommand::Reset),
            "purge" => Ok(OperatorCommand::Purge),
            "amount" => {
                let raw = arg.ok_or(CommandError::MissingArgument("amount"))?;
                let amount =
                    Decimal::from_str(raw).map_err(|_| CommandError::InvalidAmount(raw.to_string()))?;
                Ok(OperatorCommand::Amount(amount))
            }
            "publisher" => {
                let raw = arg.ok_or(CommandError::MissingArgument("publisher type"))?;
                Ok(OperatorCommand::Publisher(raw.parse()?))
            }
            "pay" => {
                let tag = arg.ok_or(CommandError::MissingArgument("payment method"))?;
                Ok(OperatorCommand::Pay(tag.to_string()))
            }
            "quotes" => Ok(OperatorCommand::Quotes),
            "history" => Ok(OperatorCommand::History),
            "status" => Ok(OperatorCommand::Status),
            "help" | "?" => Ok(OperatorCommand::Help),
            "quit" | "exit" => Ok(OperatorCommand::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Whether the console should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Apply a command to the controller, returning the text to show the operator
pub async fn dispatch(controller: &SamplingController, command: OperatorCommand) -> (Flow, String) {
    let output = match command {
        OperatorCommand::Start => match controller.start_recording().await {
            ArmOutcome::Armed => "Recording started".to_string(),
            ArmOutcome::AlreadyArmed => "Recording is already running".to_string(),
        },
        OperatorCommand::Reset => {
            if controller.reset().await {
                "Recording stopped, local history cleared".to_string()
            } else {
                "Recording was not running, local history cleared".to_string()
            }
        }
        OperatorCommand::Purge => match controller.purge_all().await {
            Ok(count) => format!("Deleted {} document(s).", count),
            Err(e) => format!("Delete failed: {}", e),
        },
        OperatorCommand::Amount(amount) => match controller.set_trans_amount(amount).await {
            Ok(()) => format!("Transaction amount set to {}", amount),
            Err(e) => e.to_string(),
        },
        OperatorCommand::Publisher(publisher_type) => {
            controller.set_publisher_type(publisher_type).await;
            format!("Publisher type set to {}", publisher_type)
        }
        OperatorCommand::Pay(tag) => {
            if controller.toggle_pay_type(&tag).await {
                format!("Payment method {} selected", tag)
            } else {
                format!("Payment method {} removed", tag)
            }
        }
        OperatorCommand::Quotes => render_quotes(&controller.live_quotes().await),
        OperatorCommand::History => render_history(&controller.samples().await),
        OperatorCommand::Status => render_status(&controller.status().await),
        OperatorCommand::Help => HELP.to_string(),
        OperatorCommand::Quit => return (Flow::Quit, "Stopping".to_string()),
    };

    (Flow::Continue, output)
}

fn render_side(out: &mut String, title: &str, quotes: &[Quote]) {
    let _ = writeln!(out, "{}", title);
    if quotes.is_empty() {
        let _ = writeln!(out, "  (no listings)");
        return;
    }
    let _ = writeln!(out, "  {:>12}  {:<6}  Advertiser", "Price", "Asset");
    for quote in quotes {
        let _ = writeln!(
            out,
            "  {:>12}  {:<6}  {}",
            quote.price, quote.asset, quote.advertiser
        );
    }
}

/// Both sides of the live book as a table
pub fn render_quotes(quotes: &LiveQuotes) -> String {
    let mut out = String::new();
    render_side(&mut out, "Buy Orders", &quotes.buy);
    render_side(&mut out, "Sell Orders", &quotes.sell);
    out.trim_end().to_string()
}

/// Recorded samples as a table
pub fn render_history(samples: &[Sample]) -> String {
    if samples.is_empty() {
        return "No recorded samples".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<12}  {:>12}  {:>12}  Advertiser", "Time", "Buy", "Sell");
    for sample in samples {
        let _ = writeln!(
            out,
            "{:<12}  {:>12}  {:>12}  {}",
            sample.time, sample.buy, sample.sell, sample.advertiser
        );
    }
    out.trim_end().to_string()
}

pub fn render_status(status: &ControllerStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Recording: {}",
        if status.armed { "armed" } else { "idle" }
    );
    if let Some(at) = status.armed_at {
        let _ = writeln!(out, "  Armed at: {}", at.to_rfc3339());
        let _ = writeln!(out, "  Samples this session: {}", status.recorded);
    }
    let _ = writeln!(
        out,
        "Refresh: {}",
        if status.refreshing { "running" } else { "stopped" }
    );
    let _ = writeln!(
        out,
        "  Listings: {} buy / {} sell",
        status.buy_count, status.sell_count
    );
    if let Some(at) = status.last_refresh {
        let _ = writeln!(out, "  Last refresh: {}", at.to_rfc3339());
    }
    let _ = writeln!(
        out,
        "Filter: amount={} publisher={} pay=[{}]",
        status.filter.trans_amount,
        status.filter.publisher_type,
        status.filter.pay_types.join(", ")
    );
    let _ = writeln!(
        out,
        "History: {} sample(s) ({:?})",
        status.cached_samples, status.provenance
    );
    out.trim_end().to_string()
}
