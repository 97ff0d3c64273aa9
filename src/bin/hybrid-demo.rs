//! Hybrid encryption demo
//!
//! Usage: hybrid-demo [OPTIONS]
//!
//! Options:
//!   -d, --demo               Run the full demonstration (default)
//!   --curve <CURVE>          Curve for a single message: 25519 or secp256r1
//!   -c, --config <FILE>      JSON configuration selecting the curve
//!   -m, --message <TEXT>     Message to encrypt and decrypt
//!   -h, --help               Print help information

use std::env;

use anyhow::{bail, Context};
use num_bigint::BigUint;

use hybridcrypt::{Curve, Error, HybridConfig, HybridCrypto, KeyMaterial};

fn main() -> anyhow::Result<()> {
    // Initialize tracing; RUST_LOG overrides the default level (e.g. RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        return run_demo();
    }

    let mut config = HybridConfig::default();
    let mut message: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            "-d" | "--demo" => return run_demo(),
            "--curve" => {
                let value = iter.next().context("--curve requires a value")?;
                config.curve = value.parse()?;
            }
            "-c" | "--config" => {
                let path = iter.next().context("--config requires a file path")?;
                config = load_config(path)?;
            }
            "-m" | "--message" => {
                message = Some(iter.next().context("--message requires a value")?.clone());
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                return Ok(());
            }
        }
    }

    match message {
        Some(message) => run_single(&config, &message),
        None => bail!("--message is required with --curve or --config"),
    }
}

fn print_usage() {
    println!(
        r#"hybrid-demo - ECDH + HKDF + AES-CTR message encryption

USAGE:
    hybrid-demo [OPTIONS]

OPTIONS:
    -d, --demo               Run the full demonstration (default)
    --curve <CURVE>          Curve for a single message: 25519 or secp256r1
    -c, --config <FILE>      JSON configuration selecting the curve
    -m, --message <TEXT>     Message to encrypt and decrypt
    -h, --help               Print help information

CONFIGURATION FILE FORMAT (JSON):
    {{
        "curve": "secp256r1",
        "strict_public_keys": true
    }}

EXAMPLES:
    Full demonstration:
        hybrid-demo

    One message over P-256:
        hybrid-demo --curve secp256r1 --message "hola"
"#
    );
}

fn load_config(path: &str) -> anyhow::Result<HybridConfig> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    Ok(HybridConfig::from_json(&content)?)
}

fn run_single(config: &HybridConfig, message: &str) -> anyhow::Result<()> {
    let crypto = HybridCrypto::from_config(config);
    let (alice_private, alice_public) = crypto.generate_keypair();
    let (bob_private, bob_public) = crypto.generate_keypair();

    let sealed = crypto.encrypt(&alice_private, &bob_public, message)?;
    println!("curve:      {}", crypto.curve());
    println!("nonce:      {}", hex::encode(sealed.nonce));
    println!("ciphertext: {}", hex::encode(&sealed.ciphertext));

    let opened = crypto.decrypt(&bob_private, &alice_public, &sealed.nonce, &sealed.ciphertext)?;
    println!("decrypted:  {opened}");
    if opened != message {
        bail!("decrypted message does not match the original");
    }
    Ok(())
}

fn run_demo() -> anyhow::Result<()> {
    full_cycle()?;
    message_battery()?;
    error_handling()?;
    tracing::info!("All demonstrations completed");
    Ok(())
}

fn full_cycle() -> anyhow::Result<()> {
    for curve in Curve::all() {
        println!("\n----- Full cycle with {curve} -----");
        let crypto = HybridCrypto::with_curve(curve);

        let (alice_private, alice_public) = crypto.generate_keypair();
        let (bob_private, bob_public) = crypto.generate_keypair();

        let original = format!("Hello Bob, this is a secret message using {curve}!");
        let sealed = crypto.encrypt(&alice_private, &bob_public, &original)?;
        let decrypted =
            crypto.decrypt(&bob_private, &alice_public, &sealed.nonce, &sealed.ciphertext)?;

        println!("Original:  {original}");
        println!("Decrypted: {decrypted}");
        if decrypted != original {
            bail!("round trip failed for {curve}");
        }
        tracing::info!(%curve, "round trip succeeded");
    }
    Ok(())
}

fn message_battery() -> anyhow::Result<()> {
    println!("\n----- Different kinds of messages -----");
    let crypto = HybridCrypto::default();
    let (alice_private, alice_public) = crypto.generate_keypair();
    let (bob_private, bob_public) = crypto.generate_keypair();

    let messages = [
        "Short message".to_string(),
        "A somewhat longer message to exercise more than one block".to_string(),
        "A very long message ".repeat(100),
        "Special characters: áéíóú ñ @#$%^&*()_+".to_string(),
        String::new(),
    ];

    for message in &messages {
        let sealed = crypto.encrypt(&alice_private, &bob_public, message)?;
        let decrypted =
            crypto.decrypt(&bob_private, &alice_public, &sealed.nonce, &sealed.ciphertext)?;
        if &decrypted != message {
            bail!("round trip failed for {:?}", preview(message));
        }
        println!("OK: {:?}", preview(message));
    }
    Ok(())
}

fn preview(message: &str) -> String {
    message.chars().take(20).collect()
}

fn error_handling() -> anyhow::Result<()> {
    println!("\n----- Error handling -----");

    report("unsupported curve", HybridCrypto::new("invalid_curve").map(|_| ()));

    let crypto = HybridCrypto::default();
    let (alice_private, alice_public) = crypto.generate_keypair();
    let bad_key = KeyMaterial::from(b"invalid_key".as_slice());

    report(
        "malformed private key",
        crypto.encrypt(&bad_key, &alice_public, "message").map(|_| ()),
    );
    report(
        "malformed public key",
        crypto
            .decrypt(&alice_private, &bad_key, b"nonce", b"ciphertext")
            .map(|_| ()),
    );
    report(
        "all-zero X25519 public key",
        crypto
            .encrypt(&alice_private, &KeyMaterial::from([0u8; 32]), "message")
            .map(|_| ()),
    );

    let p256 = HybridCrypto::with_curve(Curve::Secp256r1);
    let point = KeyMaterial::from((BigUint::from(1u32), BigUint::from(2u32)));
    report(
        "byte private key on secp256r1",
        p256.encrypt(&bad_key, &point, "message").map(|_| ()),
    );
    let (p256_private, _) = p256.generate_keypair();
    report(
        "off-curve secp256r1 public key",
        p256.encrypt(&p256_private, &point, "message").map(|_| ()),
    );
    Ok(())
}

fn report(case: &str, outcome: Result<(), Error>) {
    match outcome {
        Ok(()) => println!("UNEXPECTED: {case} was accepted"),
        Err(err) => println!("OK: {case} rejected ({err})"),
    }
}
