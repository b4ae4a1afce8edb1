use clap::Parser;
use jovi_crowdsale::{deploy, DeploymentConfig, DeploymentSummary, NativeBank, SystemClock};
use jovi_token::Address;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

const DEV_DEPLOYER: &str = "0x00000000000000000000000000000000000000d1";

#[derive(Parser, Debug)]
#[command(name = "jovi-deploy")]
#[command(about = "Deploy the JOVI token and its crowdsale")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
struct Cli {
    /// Path to a deployment TOML file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Deploying account
    #[arg(short, long, value_name = "ADDR", default_value = DEV_DEPLOYER)]
    deployer: Address,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => {
            log::info!("Loading deployment config from {}", path.display());
            DeploymentConfig::load(path)?
        }
        None => {
            log::warn!("No config file given, using the reference deployment");
            DeploymentConfig::default()
        }
    };

    let deployment = deploy(
        &config,
        cli.deployer,
        Arc::new(SystemClock),
        NativeBank::new().shared(),
    )?;
    let summary = deployment.summary();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render(&summary));
    }
    Ok(())
}

fn render(summary: &DeploymentSummary) -> String {
    let token = &summary.token;
    let sale = &summary.crowdsale;
    let rule = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
    let mut out = String::new();

    out.push_str(&format!("{}\n", "JOVI Deployment".cyan().bold()));
    out.push_str(&format!("{}\n", rule.bright_black()));
    out.push_str(&format!("Deployer:     {}\n", summary.deployer));
    out.push_str(&format!(
        "Token:        {} ({}, {} decimals) at {}\n",
        token.name, token.symbol, token.decimals, token.address
    ));
    out.push_str(&format!(
        "Paused:       {}\n",
        if token.paused { "yes" } else { "no" }
    ));

    out.push_str(&format!("\n{}\n", "Crowdsale".green().bold()));
    out.push_str(&format!("Address:      {}\n", sale.address));
    out.push_str(&format!("Wallet:       {}\n", sale.wallet));
    out.push_str(&format!(
        "Rates:        {} (PreICO) / {} (ICO)\n",
        sale.pre_ico_rate, sale.ico_rate
    ));
    out.push_str(&format!("Cap:          {}\n", sale.cap));
    if let Some(goal) = &sale.goal {
        out.push_str(&format!("Goal:         {}\n", goal));
    }
    out.push_str(&format!("Opens:        {}\n", sale.opening_time));
    out.push_str(&format!("Closes:       {}\n", sale.closing_time));
    if let Some(release) = &sale.release_time {
        out.push_str(&format!("Vaults open:  {}\n", release));
    }
    if let Some(dist) = &sale.distribution {
        out.push_str(&format!(
            "Split:        sale {}% / founders {}% / foundation {}% / partners {}%\n",
            dist.token_sale, dist.founders, dist.foundation, dist.partners
        ));
    }

    for vault in &sale.vaults {
        out.push_str(&format!(
            "  {:<11} {} -> {}\n",
            vault.label, vault.address, vault.beneficiary
        ));
    }
    out.push_str(&format!("{}\n", rule.bright_black()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use jovi_crowdsale::ManualClock;

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from(["jovi-deploy", "--json"]).unwrap();
        assert!(cli.json);
        assert!(cli.config.is_none());
        assert_eq!(cli.deployer, DEV_DEPLOYER.parse::<Address>().unwrap());

        let cli = Cli::try_parse_from([
            "jovi-deploy",
            "-c",
            "jovi.toml",
            "-d",
            "0x00000000000000000000000000000000000000aa",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("jovi.toml")));
        assert_eq!(cli.deployer, Address::from_low_u64(0xaa));

        assert!(Cli::try_parse_from(["jovi-deploy", "-d", "0x1234"]).is_err());
    }

    #[test]
    fn test_render_lists_vaults() {
        let deployment = deploy(
            &DeploymentConfig::default(),
            Address::from_low_u64(1),
            Arc::new(ManualClock::new(1_700_000_000)),
            NativeBank::new().shared(),
        )
        .unwrap();

        let text = render(&deployment.summary());
        assert!(text.contains("JoviToken (JOVI, 18 decimals)"));
        assert!(text.contains("500 (PreICO) / 250 (ICO)"));
        assert!(text.contains("founders"));
        assert!(text.contains("partners"));
    }
}
