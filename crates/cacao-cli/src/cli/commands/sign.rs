//! `cacao sign` - Sign a playbook document.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use cacao_core::playbook::codec;
use cacao_core::{PrivateKey, Signature};

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Playbook document (JSON)
    pub playbook: PathBuf,

    /// Private key file (PKCS#8 PEM)
    #[arg(long, short)]
    pub key: PathBuf,

    /// Signing algorithm
    #[arg(long, default_value = "RS256")]
    pub algorithm: String,

    /// Name of the signing party, recorded in the signature
    #[arg(long)]
    pub signee: Option<String>,

    /// Output file (required unless --in-place)
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Modify input file in place
    #[arg(long, short = 'i', conflicts_with = "out")]
    pub in_place: bool,
}

pub fn cmd_sign(args: SignArgs) -> i32 {
    match run_sign(args) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e:#}");
            super::exit_code_for(&e)
        }
    }
}

fn run_sign(args: SignArgs) -> Result<()> {
    let output_path = if args.in_place {
        args.playbook.clone()
    } else if let Some(out) = args.out {
        out
    } else {
        anyhow::bail!("must specify --out <PATH> or --in-place");
    };

    let pem = fs::read_to_string(&args.key)
        .with_context(|| format!("failed to read key file: {}", args.key.display()))?;
    let key = PrivateKey::from_pkcs8_pem(&pem)?;

    let data = fs::read(&args.playbook)
        .with_context(|| format!("failed to read playbook file: {}", args.playbook.display()))?;
    let mut playbook = codec::decode(&data)?;

    let mut signature = Signature::new();
    signature.signee = args.signee.clone();
    signature.related_to = playbook.id.clone();
    signature.related_version = playbook.modified.clone();
    signature.public_keys = vec![key.public_key().to_spki_base64()?];

    playbook.sign(&args.algorithm, &key, signature)?;
    debug!(algorithm = %args.algorithm, key_type = key.kind(), "signed playbook");

    // self-check before anything is written out
    let index = playbook.signatures.len() - 1;
    playbook.verify_signature(index, None)?.require_valid()?;

    let output = codec::encode_to_string(&playbook)?;
    fs::write(&output_path, output)
        .with_context(|| format!("failed to write output: {}", output_path.display()))?;

    println!("Signed playbook:");
    println!("  Input:  {}", args.playbook.display());
    println!("  Output: {}", output_path.display());
    println!();
    println!("Signature:");
    println!("  algorithm: {}", args.algorithm);
    println!("  key type:  {}", key.kind());
    if let Some(signee) = &args.signee {
        println!("  signee:    {signee}");
    }

    Ok(())
}
