#![forbid(unsafe_code)]

//! Kista CLI: decrypt SAML responses, encode logout requests.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kista::core::algorithm;
use kista::keys::PrivateKeyMaterial;
use kista::saml::{
    self, AttributeLookup, DecryptContext, ExtractionPolicy, IssuerPrefixStrip,
    LogoutRequestDescriptor,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "kista",
    about = "Kista: SAML 2.0 response decryption and logout request encoding",
    version
)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decrypt a SAML response and print the plaintext or its fields
    Decrypt {
        /// File holding the base64 SAMLResponse value (or raw XML)
        file: PathBuf,

        /// Service provider private key (PEM, PKCS#8 or PKCS#1)
        #[arg(short = 'k', long, env = "KISTA_PRIVATE_KEY")]
        key: PathBuf,

        /// RelayState received alongside the response
        #[arg(long = "relay-state")]
        relay_state: Option<String>,

        /// Issuer prefix handling: none, prefix:N or uri:URI
        #[arg(long = "strip-issuer", default_value = "none", value_parser = parse_issuer_strip)]
        strip_issuer: IssuerPrefixStrip,

        /// Attribute name template, `{name}` is replaced by the requested name
        #[arg(long = "attribute-template")]
        attribute_template: Option<String>,

        /// Attribute to extract (repeatable)
        #[arg(short = 'a', long = "attribute")]
        attributes: Vec<String>,

        /// Print a JSON report of the extracted fields instead of the XML
        #[arg(long)]
        json: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode an SP-initiated logout request
    Logout {
        /// Request ID (default: random)
        #[arg(long)]
        id: Option<String>,

        /// IdP host, e.g. dev-tenant.us.auth0.com
        #[arg(long)]
        issuer: String,

        #[arg(long = "client-id")]
        client_id: String,

        #[arg(long = "name-id")]
        name_id: String,

        #[arg(long = "session-index")]
        session_index: String,

        /// Path segment before the client id in the logout URL
        #[arg(long = "logout-path", default_value = "samlp")]
        logout_path: String,

        #[arg(long = "issuer-scheme", default_value = "https")]
        issuer_scheme: String,
    },

    /// List supported algorithms and key formats
    Info,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Decrypt {
            file,
            key,
            relay_state,
            strip_issuer,
            attribute_template,
            attributes,
            json,
            output,
        } => {
            let policy = ExtractionPolicy {
                issuer_strip: strip_issuer,
                attribute_lookup: attribute_template
                    .map(AttributeLookup::Template)
                    .unwrap_or_default(),
            };
            cmd_decrypt(
                &file,
                &key,
                relay_state.as_deref(),
                policy,
                &attributes,
                json,
                output,
            )
        }

        Commands::Logout {
            id,
            issuer,
            client_id,
            name_id,
            session_index,
            logout_path,
            issuer_scheme,
        } => {
            let request = LogoutRequestDescriptor {
                id: id.unwrap_or_else(|| format!("_{}", uuid::Uuid::new_v4())),
                issuer: format!("{issuer_scheme}://{issuer}"),
                client_id,
                name_id,
                session_index,
            };
            cmd_logout(&request, &issuer_scheme, &issuer, &logout_path)
        }

        Commands::Info => cmd_info(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn cmd_decrypt(
    file: &Path,
    key: &Path,
    relay_state: Option<&str>,
    policy: ExtractionPolicy,
    attributes: &[String],
    json: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let input = read_file(file)?;
    let material = PrivateKeyMaterial::from_file(key)
        .with_context(|| format!("loading private key {}", key.display()))?;
    let ctx = DecryptContext::new(material).with_policy(policy);

    tracing::info!(file = %file.display(), "processing SAML response");
    let processed = if input.trim_start().starts_with('<') {
        saml::process_xml(&ctx, input, relay_state)
    } else {
        saml::process_response(&ctx, &input, relay_state)
    }
    .with_context(|| format!("processing {}", file.display()))?;

    if !json {
        return write_output(output, processed.xml().as_bytes());
    }

    let names: Vec<&str> = attributes.iter().map(String::as_str).collect();
    let fields = processed.fields(&ctx, &names)?;
    let report = serde_json::json!({
        "encrypted": processed.was_encrypted(),
        "relayState": processed.relay_state(),
        "fields": fields,
    });
    let mut text = serde_json::to_string_pretty(&report)?;
    text.push('\n');
    write_output(output, text.as_bytes())
}

fn cmd_logout(
    request: &LogoutRequestDescriptor,
    scheme: &str,
    issuer: &str,
    logout_path: &str,
) -> Result<()> {
    let destination = logout_destination(scheme, issuer, logout_path, &request.client_id)?;
    let encoded = saml::encode_logout_request(request, &destination, chrono::Utc::now())?;
    println!("SAMLRequest: {encoded}");
    println!("Destination: {destination}");
    Ok(())
}

fn cmd_info() -> Result<()> {
    println!("Kista: SAML 2.0 response decryption");
    println!();
    println!("Supported key transport algorithms:");
    println!("  RSA-OAEP (SHA-1, MGF1-SHA-1)");
    println!("    {}", algorithm::RSA_OAEP);
    println!("    {}", algorithm::RSA_OAEP_ENC11);
    println!();
    println!("Supported encryption algorithms:");
    println!("  AES-128/192/256-CBC, leading IV");
    for uri in [
        algorithm::AES128_CBC,
        algorithm::AES192_CBC,
        algorithm::AES256_CBC,
    ] {
        println!("    {uri}");
    }
    println!();
    println!("Supported key formats:");
    println!("  PEM RSA private key, PKCS#8 then PKCS#1");
    Ok(())
}

// ── Utility functions ────────────────────────────────────────────────

fn parse_issuer_strip(value: &str) -> Result<IssuerPrefixStrip, String> {
    if value == "none" {
        return Ok(IssuerPrefixStrip::None);
    }
    if let Some(n) = value.strip_prefix("prefix:") {
        return n
            .parse()
            .map(IssuerPrefixStrip::FixedLength)
            .map_err(|e| format!("invalid prefix length {n:?}: {e}"));
    }
    if let Some(uri) = value.strip_prefix("uri:") {
        if uri.is_empty() {
            return Err("uri: needs a prefix to strip".into());
        }
        return Ok(IssuerPrefixStrip::NamespaceUri(uri.to_owned()));
    }
    Err(format!("expected none, prefix:N or uri:URI, got {value:?}"))
}

/// `{scheme}://{issuer}/{logout_path}/{client_id}/logout`
fn logout_destination(
    scheme: &str,
    issuer: &str,
    logout_path: &str,
    client_id: &str,
) -> Result<String> {
    if issuer.is_empty() || client_id.is_empty() {
        bail!("issuer and client id are required to address the logout endpoint");
    }
    let path = logout_path.trim_matches('/');
    if path.is_empty() {
        Ok(format!("{scheme}://{issuer}/{client_id}/logout"))
    } else {
        Ok(format!("{scheme}://{issuer}/{path}/{client_id}/logout"))
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn write_output(path: Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(p) => std::fs::write(&p, data).with_context(|| format!("writing {}", p.display())),
        None => {
            use std::io::Write;
            std::io::stdout().write_all(data).context("writing stdout")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_issuer_strip() {
        assert_eq!(parse_issuer_strip("none").unwrap(), IssuerPrefixStrip::None);
        assert_eq!(
            parse_issuer_strip("prefix:4").unwrap(),
            IssuerPrefixStrip::FixedLength(4)
        );
        assert_eq!(
            parse_issuer_strip("uri:urn:").unwrap(),
            IssuerPrefixStrip::NamespaceUri("urn:".into())
        );
        assert!(parse_issuer_strip("prefix:x").is_err());
        assert!(parse_issuer_strip("uri:").is_err());
        assert!(parse_issuer_strip("strip").is_err());
    }

    #[test]
    fn test_logout_destination() {
        assert_eq!(
            logout_destination("https", "dev-tenant.us.auth0.com", "samlp", "abc").unwrap(),
            "https://dev-tenant.us.auth0.com/samlp/abc/logout"
        );
        assert_eq!(
            logout_destination("https", "idp.example.com", "/", "abc").unwrap(),
            "https://idp.example.com/abc/logout"
        );
        assert!(logout_destination("https", "idp.example.com", "samlp", "").is_err());
    }

    #[test]
    fn test_decrypt_args() {
        let cli = Cli::try_parse_from([
            "kista",
            "decrypt",
            "response.b64",
            "--key",
            "sp.pem",
            "--strip-issuer",
            "prefix:4",
            "-a",
            "clientID",
            "-a",
            "email",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Decrypt {
                strip_issuer,
                attributes,
                json,
                ..
            } => {
                assert_eq!(strip_issuer, IssuerPrefixStrip::FixedLength(4));
                assert_eq!(attributes, vec!["clientID", "email"]);
                assert!(json);
            }
            _ => panic!("expected decrypt"),
        }
    }
}
