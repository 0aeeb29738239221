use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Symbols fetched by `fetch` when none are given: Nifty 50 plus liquid mid caps.
pub const DEFAULT_NSE_SYMBOLS: &[&str] = &[
    // Nifty 50
    "RELIANCE.NS", "TCS.NS", "HDFCBANK.NS", "INFY.NS", "ICICIBANK.NS",
    "HINDUNILVR.NS", "ITC.NS", "SBIN.NS", "BHARTIARTL.NS", "KOTAKBANK.NS",
    "BAJFINANCE.NS", "LT.NS", "ASIANPAINT.NS", "HCLTECH.NS", "AXISBANK.NS",
    "MARUTI.NS", "SUNPHARMA.NS", "TITAN.NS", "ULTRACEMCO.NS", "NESTLEIND.NS",
    "BAJAJFINSV.NS", "WIPRO.NS", "ADANIGREEN.NS", "ONGC.NS", "NTPC.NS",
    "TECHM.NS", "M&M.NS", "POWERGRID.NS", "TATASTEEL.NS", "JSWSTEEL.NS",
    "INDUSINDBK.NS", "GRASIM.NS", "DIVISLAB.NS", "EICHERMOT.NS", "TATAMOTORS.NS",
    "CIPLA.NS", "DRREDDY.NS", "BRITANNIA.NS", "BPCL.NS", "HINDALCO.NS",
    "COALINDIA.NS", "HEROMOTOCO.NS", "SHREECEM.NS", "UPL.NS", "BAJAJ-AUTO.NS",
    "ADANIPORTS.NS", "TATACONSUM.NS", "APOLLOHOSP.NS", "SBILIFE.NS", "HDFCLIFE.NS",
    // Mid caps
    "PIDILITIND.NS", "GODREJCP.NS", "MCDOWELL-N.NS", "BERGEPAINT.NS", "HAVELLS.NS",
    "DABUR.NS", "MARICO.NS", "BOSCHLTD.NS", "SIEMENS.NS", "ABB.NS",
    "BANDHANBNK.NS", "BANKBARODA.NS", "PNB.NS", "CANBK.NS", "UNIONBANK.NS",
    "VEDL.NS", "JINDALSTEL.NS", "SAIL.NS", "NMDC.NS", "GAIL.NS",
    "IOC.NS", "PETRONET.NS", "TATAPOWER.NS", "ADANIPOWER.NS", "TORNTPHARM.NS",
    "LUPIN.NS", "BIOCON.NS", "AUROPHARMA.NS", "CADILAHC.NS", "PAGEIND.NS",
    "DMART.NS", "TRENT.NS", "JUBLFOOD.NS", "PVR.NS", "MOTHERSON.NS",
    "BALKRISIND.NS", "MRF.NS", "APOLLOTYRE.NS", "CEAT.NS", "AMBUJACEM.NS",
    "ACC.NS", "RAMCOCEM.NS", "JKCEMENT.NS", "STARCEMENT.NS", "DLF.NS",
    "GODREJPROP.NS", "OBEROIRLTY.NS", "PRESTIGE.NS", "SOBHA.NS",
];

#[derive(Parser)]
#[command(name = "swing-scanner")]
#[command(about = "Swing trade signal scanner", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve,
    /// Fetch and store signals for a list of symbols
    Fetch {
        /// Symbols to fetch (defaults to the built-in NSE list)
        symbols: Vec<String>,
        /// File with symbols separated by commas or whitespace; `#` starts a comment
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Provider calls per minute (overrides API_RATE_LIMIT)
        #[arg(short, long)]
        rate: Option<u32>,
    },
}

/// Parse a symbol file.
pub fn parse_symbol_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}

/// Argument symbols followed by file symbols; the default list when both are empty.
pub fn resolve_symbols(args: &[String], file_symbols: Vec<String>) -> Vec<String> {
    let mut symbols: Vec<String> = args
        .iter()
        .flat_map(|a| a.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect();
    symbols.extend(file_symbols);

    if symbols.is_empty() {
        return DEFAULT_NSE_SYMBOLS.iter().map(|s| s.to_string()).collect();
    }
    symbols
}
