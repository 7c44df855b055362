//! Command-line interface for the skypass boarding pass issuer.
//!
//! Issues sealed `.pkpass` artifacts from ticket JSON, manages airline
//! signing identities, and verifies scanned barcode payloads.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use skypass::model::{Airline, AirlineSettings, Ticket};
use skypass::{BarcodePayload, IssuerConfig, NullCatalog, PassIssuer};

#[derive(Parser)]
#[command(name = "skypass")]
#[command(about = "Apple Wallet boarding pass issuer")]
struct Cli {
    /// Directory holding per-identity key files
    #[arg(long, default_value = "keys")]
    keys_dir: PathBuf,

    /// Shared server secret mixed into barcode digests
    #[arg(long, env = "SKYPASS_SECRET", default_value = "")]
    secret: String,

    /// Skip RSA signatures, emit hash-only barcode digests
    #[arg(long)]
    no_signature: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an airline signing identity and print its public key
    Keygen {
        /// Identity name; omit for a content-derived anonymous name
        name: Option<String>,
    },

    /// Issue a boarding pass for a ticket
    Issue {
        /// Ticket JSON file
        ticket: PathBuf,

        /// Airline JSON file
        #[arg(short, long)]
        airline: PathBuf,

        /// Airline settings JSON file (defaults when omitted)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Pass-signing certificate (PEM or .p12)
        #[arg(short = 'c', long)]
        certificate: PathBuf,

        /// Password for a PKCS#12 certificate
        #[arg(long, default_value = "")]
        password: String,

        /// Directory with icon.png, icon@2x.png, logo.png
        #[arg(long, default_value = "images")]
        images_dir: PathBuf,

        /// Output file (default: {ticket_identifier}.pkpass)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Label language (en, fr, de, es)
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Print pass.json to stdout instead of writing an artifact
        #[arg(long)]
        json: bool,
    },

    /// Verify a scanned barcode payload against an airline identity
    Verify {
        /// Barcode payload JSON file, or `-` for stdin
        payload: PathBuf,

        /// Airline identity name
        #[arg(short, long)]
        identity: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = IssuerConfig {
        keys_dir: cli.keys_dir.clone(),
        secret: cli.secret.clone(),
        use_public_key_signature: !cli.no_signature,
        ..IssuerConfig::default()
    };

    match cli.command {
        Command::Keygen { name } => {
            let issuer = PassIssuer::new(config, Arc::new(NullCatalog));
            let identity = match name {
                Some(ref name) => issuer.key_store().load_or_create(name)?,
                None => issuer.key_store().create_anonymous()?,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&identity.export_public_key())?
            );
            Ok(ExitCode::SUCCESS)
        }

        Command::Issue {
            ticket,
            airline,
            settings,
            certificate,
            password,
            images_dir,
            output,
            language,
            json,
        } => {
            let ticket: Ticket = serde_json::from_slice(&fs::read(&ticket)?)?;
            let airline: Airline = serde_json::from_slice(&fs::read(&airline)?)?;
            let settings: AirlineSettings = match settings {
                Some(path) => serde_json::from_slice(&fs::read(&path)?)?,
                None => AirlineSettings::default(),
            };

            let config = IssuerConfig {
                certificate_path: certificate,
                certificate_password: password,
                images_dir,
                ..config
            };
            let issuer = PassIssuer::new(config, Arc::new(NullCatalog));

            if json {
                let document = issuer.pass_document(&ticket, &airline, &settings, &language)?;
                println!("{}", serde_json::to_string_pretty(&document)?);
                return Ok(ExitCode::SUCCESS);
            }

            let bytes = issuer.create_pass(&ticket, &airline, &settings, &language)?;
            let output = output
                .unwrap_or_else(|| PathBuf::from(format!("{}.pkpass", ticket.ticket_identifier)));
            fs::write(&output, bytes)?;
            println!("Issued: {}", output.display());
            Ok(ExitCode::SUCCESS)
        }

        Command::Verify { payload, identity } => {
            let data = if payload.as_os_str() == "-" {
                let mut buffer = String::new();
                std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)?;
                buffer.into_bytes()
            } else {
                fs::read(&payload)?
            };
            let payload: BarcodePayload = serde_json::from_slice(&data)?;

            let issuer = PassIssuer::new(config, Arc::new(NullCatalog));
            let airline = Airline {
                airline_name: None,
                apple_identifier: identity,
            };
            if issuer.verify_ticket(&airline, &payload.ticket, &payload.signature_digest)? {
                println!("valid: {}", payload.ticket);
                Ok(ExitCode::SUCCESS)
            } else {
                println!("invalid: {}", payload.ticket);
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
