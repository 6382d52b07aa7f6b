use clap::Args;
use habico_core::wisdom;

use super::{print_json, CliResult};

#[derive(Args)]
pub struct WisdomArgs {
    /// Deal only the first N cards
    #[arg(long)]
    count: Option<usize>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: WisdomArgs) -> CliResult {
    let mut deck = wisdom::shuffled_deck(&mut rand::thread_rng());
    if let Some(n) = args.count {
        deck.truncate(n);
    }

    if args.json {
        print_json(&deck)?;
    } else {
        for card in deck {
            println!("- {card}");
        }
    }
    Ok(())
}
