use std::sync::Arc;

use anyhow::{anyhow, bail};
use colored::Colorize;
use mkt_ledger::{DevWallet, Devnet, TxReceipt, Wallet};
use mkt_sdk::{MarketConfig, MarketError, Marketplace, ViewKind};
use mkt_types::{Address, ListingRecord};
use serde_json::json;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => MarketConfig::load(path)?,
        None => MarketConfig::default(),
    };
    let devnet = Arc::new(Devnet::open(&cli.state)?);
    let account = cli.account.unwrap_or_else(|| Devnet::dev_account(0));
    let out = Output { format: cli.format };

    let result = match cli.command {
        Command::Deploy => cmd_deploy(&devnet, &config, account, &out),
        Command::Accounts(args) => cmd_accounts(args, &out),
        command => {
            let mut wallet = DevWallet::new(Arc::clone(&devnet), account);
            if cli.deny_consent {
                wallet = wallet.denying_consent();
            }
            let wallet: Arc<dyn Wallet> = Arc::new(wallet);
            let market = Marketplace::start(config, Some(wallet)).await;
            run_market_command(command, &market, &devnet, &out).await
        }
    };

    devnet.save(&cli.state)?;
    result
}

async fn run_market_command(
    command: Command,
    market: &Marketplace,
    devnet: &Devnet,
    out: &Output,
) -> anyhow::Result<()> {
    if let Command::Status = command {
        return cmd_status(market, devnet, out);
    }
    if let Some(e) = market.bind_error() {
        return Err(failed(market, e.clone()));
    }
    match command {
        Command::Refresh(args) => cmd_refresh(args, market, out).await,
        Command::Available => cmd_available(market, out).await,
        Command::Mint(args) => cmd_mint(args, market, out).await,
        Command::List(args) => cmd_list(args, market, out).await,
        Command::Buy(args) => cmd_buy(args, market, out).await,
        Command::Deploy | Command::Accounts(_) | Command::Status => Ok(()),
    }
}

/// Prefer the operation-labelled message from the error slot.
fn failed(market: &Marketplace, err: MarketError) -> anyhow::Error {
    match market.state().error_message() {
        Some(message) => anyhow!(message),
        None => anyhow::Error::new(err),
    }
}

struct Output {
    format: OutputFormat,
}

impl Output {
    fn json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    fn print_json(&self, value: serde_json::Value) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(&value)?);
        Ok(())
    }

    fn print_view(&self, kind: ViewKind, items: &[ListingRecord]) {
        let title = match kind {
            ViewKind::ForSale => "For sale",
            ViewKind::MintedNotForSale => "Minted, not for sale",
        };
        println!("{} ({})", title.bold(), items.len());
        if items.is_empty() {
            println!("  {}", "(none)".dimmed());
        }
        for item in items {
            println!(
                "  {:<5} {}  {} ETH  {}",
                item.item_id.to_string().yellow(),
                item.owner.short().cyan(),
                item.display_price().bold(),
                item.content_url.blue(),
            );
        }
    }

    fn print_receipt(&self, verb: &str, receipt: &TxReceipt) -> anyhow::Result<()> {
        if self.json() {
            return self.print_json(serde_json::to_value(receipt)?);
        }
        println!("{} {}", "✓".green().bold(), verb);
        println!("  Tx: {}", receipt.hash.to_hex().dimmed());
        println!("  From: {}", receipt.from.to_string().cyan());
        println!("  Block: {}", receipt.block);
        if let Some(item) = receipt.minted {
            println!("  Item: {}", item.to_string().yellow());
        }
        Ok(())
    }
}

fn cmd_deploy(devnet: &Devnet, config: &MarketConfig, deployer: Address, out: &Output) -> anyhow::Result<()> {
    let address = devnet.deploy(deployer, &config.contract_name, Some(config.contract_address))?;
    if out.json() {
        return out.print_json(json!({
            "contract": config.contract_name,
            "address": address,
            "deployer": deployer,
        }));
    }
    println!("{} deployed to: {}", config.contract_name, address.to_string().green());
    Ok(())
}

fn cmd_accounts(args: AccountsArgs, out: &Output) -> anyhow::Result<()> {
    let accounts: Vec<Address> = (0..args.count).map(Devnet::dev_account).collect();
    if out.json() {
        return out.print_json(json!(accounts));
    }
    for (i, account) in accounts.iter().enumerate() {
        println!("  {:>2}  {}", i, account.to_string().cyan());
    }
    Ok(())
}

fn cmd_status(market: &Marketplace, devnet: &Devnet, out: &Output) -> anyhow::Result<()> {
    let config = market.config();
    let deployed = devnet.is_deployed(&config.contract_address);
    let state = market.state();
    if out.json() {
        return out.print_json(json!({
            "signer": market.signer(),
            "contract": config.contract_address,
            "contract_name": config.contract_name,
            "deployed": deployed,
            "block": devnet.block_number(),
            "error": state.error_message(),
        }));
    }
    match market.signer() {
        Some(signer) => println!("Signer: {}", signer.to_string().cyan()),
        None => println!("Signer: {}", "not connected".red()),
    }
    let marker = if deployed { "deployed".green() } else { "not deployed".red() };
    println!(
        "Contract: {} {} ({})",
        config.contract_name.bold(),
        config.contract_address,
        marker
    );
    println!("Block: {}", devnet.block_number());
    if let Some(message) = state.error_message() {
        println!("{}", message.red());
    }
    Ok(())
}

async fn cmd_refresh(args: RefreshArgs, market: &Marketplace, out: &Output) -> anyhow::Result<()> {
    let kinds: &[ViewKind] = match args.view {
        ViewArg::ForSale => &[ViewKind::ForSale],
        ViewArg::Minted => &[ViewKind::MintedNotForSale],
        ViewArg::All => &[ViewKind::ForSale, ViewKind::MintedNotForSale],
    };
    let mut views = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let items = market.refresh(*kind).await.map_err(|e| failed(market, e))?;
        views.push((*kind, items));
    }
    if out.json() {
        let map: serde_json::Map<String, serde_json::Value> = views
            .iter()
            .map(|(kind, items)| -> Result<_, serde_json::Error> {
                Ok((kind.to_string(), serde_json::to_value(items)?))
            })
            .collect::<Result<_, _>>()?;
        return out.print_json(serde_json::Value::Object(map));
    }
    for (kind, items) in &views {
        out.print_view(*kind, items);
    }
    Ok(())
}

async fn cmd_available(market: &Marketplace, out: &Output) -> anyhow::Result<()> {
    let items = market.available_items().await.map_err(|e| failed(market, e))?;
    if out.json() {
        return out.print_json(json!(items));
    }
    if items.is_empty() {
        println!("No items for sale.");
    }
    for item in items {
        println!("  {}", item.to_string().yellow());
    }
    Ok(())
}

async fn cmd_mint(args: MintArgs, market: &Marketplace, out: &Output) -> anyhow::Result<()> {
    let owner = args.owner.or(market.signer()).ok_or_else(|| anyhow!("no owner"))?;
    let receipt = market
        .mint(owner, &args.price, &args.url)
        .await
        .map_err(|e| failed(market, e))?;
    out.print_receipt("Item minted", &receipt)
}

async fn cmd_list(args: ListArgs, market: &Marketplace, out: &Output) -> anyhow::Result<()> {
    let receipt = market
        .list(args.item, &args.price)
        .await
        .map_err(|e| failed(market, e))?;
    out.print_receipt(&format!("Item {} listed at {} ETH", args.item, args.price), &receipt)
}

async fn cmd_buy(args: BuyArgs, market: &Marketplace, out: &Output) -> anyhow::Result<()> {
    let result = match &args.price {
        Some(price) => market.purchase(args.item, price).await,
        None => {
            let listings = market.refresh_for_sale().await.map_err(|e| failed(market, e))?;
            let Some(listing) = listings.iter().find(|l| l.item_id == args.item) else {
                bail!("item {} is not for sale", args.item);
            };
            market.purchase_listing(listing).await
        }
    };
    let receipt = result.map_err(|e| failed(market, e))?;
    out.print_receipt(&format!("Bought item {}", args.item), &receipt)
}
