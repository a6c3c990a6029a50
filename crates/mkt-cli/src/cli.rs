use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mkt_types::{Address, ItemId};

#[derive(Parser)]
#[command(
    name = "mkt",
    about = "NFT marketplace client: mint, list, and buy items on a marketplace contract",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Marketplace configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Devnet state file
    #[arg(long, global = true, default_value = "devnet.json")]
    pub state: PathBuf,

    /// Signing account (defaults to devnet account 0)
    #[arg(long, global = true)]
    pub account: Option<Address>,

    /// Refuse the wallet's account request
    #[arg(long, global = true)]
    pub deny_consent: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy the marketplace contract at the configured address
    Deploy,
    /// List well-known devnet accounts
    Accounts(AccountsArgs),
    /// Show session and contract status
    Status,
    /// Synchronize and print inventory views
    Refresh(RefreshArgs),
    /// Ask the contract which items are for sale
    Available,
    /// Mint a new item
    Mint(MintArgs),
    /// Offer an item for sale
    List(ListArgs),
    /// Buy an item
    Buy(BuyArgs),
}

#[derive(Args)]
pub struct AccountsArgs {
    #[arg(short = 'n', long, default_value = "5")]
    pub count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewArg {
    ForSale,
    Minted,
    All,
}

#[derive(Args)]
pub struct RefreshArgs {
    #[arg(long, default_value = "all")]
    pub view: ViewArg,
}

#[derive(Args)]
pub struct MintArgs {
    /// Content URL of the new item
    #[arg(long)]
    pub url: String,
    /// Price in ether
    #[arg(long, default_value = "1")]
    pub price: String,
    /// Owner of the new item (defaults to the signer)
    #[arg(long)]
    pub owner: Option<Address>,
}

#[derive(Args)]
pub struct ListArgs {
    pub item: ItemId,
    /// Price in ether
    pub price: String,
}

#[derive(Args)]
pub struct BuyArgs {
    pub item: ItemId,
    /// Payment in ether (defaults to the listed price)
    #[arg(long)]
    pub price: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_deploy() {
        let cli = Cli::try_parse_from(["mkt", "deploy"]).unwrap();
        assert!(matches!(cli.command, Command::Deploy));
        assert_eq!(cli.state, PathBuf::from("devnet.json"));
        assert!(cli.account.is_none());
    }

    #[test]
    fn parse_refresh_default_view() {
        let cli = Cli::try_parse_from(["mkt", "refresh"]).unwrap();
        let Command::Refresh(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.view, ViewArg::All);
    }

    #[test]
    fn parse_refresh_for_sale() {
        let cli = Cli::try_parse_from(["mkt", "refresh", "--view", "for-sale"]).unwrap();
        let Command::Refresh(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.view, ViewArg::ForSale);
    }

    #[test]
    fn parse_mint() {
        let cli = Cli::try_parse_from(["mkt", "mint", "--url", "ipfs://a", "--price", "0.5"]).unwrap();
        let Command::Mint(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.url, "ipfs://a");
        assert_eq!(args.price, "0.5");
        assert!(args.owner.is_none());
    }

    #[test]
    fn parse_mint_default_price() {
        let cli = Cli::try_parse_from(["mkt", "mint", "--url", "ipfs://a"]).unwrap();
        let Command::Mint(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.price, "1");
    }

    #[test]
    fn parse_list() {
        let cli = Cli::try_parse_from(["mkt", "list", "#3", "2.5"]).unwrap();
        let Command::List(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.item.get(), 3);
        assert_eq!(args.price, "2.5");
    }

    #[test]
    fn parse_list_rejects_item_zero() {
        assert!(Cli::try_parse_from(["mkt", "list", "0", "1"]).is_err());
    }

    #[test]
    fn parse_buy() {
        let cli = Cli::try_parse_from(["mkt", "buy", "5"]).unwrap();
        let Command::Buy(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.item.get(), 5);
        assert!(args.price.is_none());
    }

    #[test]
    fn parse_account() {
        let addr = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
        let cli = Cli::try_parse_from(["mkt", "--account", addr, "status"]).unwrap();
        assert_eq!(cli.account.map(|a| a.to_hex()), Some(addr.to_string()));
    }

    #[test]
    fn parse_bad_account() {
        assert!(Cli::try_parse_from(["mkt", "--account", "0x12", "status"]).is_err());
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["mkt", "--verbose", "status"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["mkt", "--format", "json", "available"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
