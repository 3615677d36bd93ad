//! `cacao verify` - Verify the signatures of a playbook document.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use cacao_core::playbook::codec;
use cacao_core::{PublicKey, Verification};

use crate::exit_codes::{SIGNATURE_INVALID, SUCCESS};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Signed playbook document (JSON)
    pub playbook: PathBuf,

    /// Public key file (SPKI PEM); defaults to the keys embedded in each signature
    #[arg(long)]
    pub pubkey: Option<PathBuf>,

    /// Verify only the signature at this index
    #[arg(long)]
    pub index: Option<usize>,

    /// Quiet mode - only exit code, no output
    #[arg(long, short)]
    pub quiet: bool,
}

pub fn cmd_verify(args: &VerifyArgs) -> i32 {
    match run_verify(args) {
        Ok(code) => code,
        Err(e) => {
            if !args.quiet {
                eprintln!("error: {e:#}");
            }
            super::exit_code_for(&e)
        }
    }
}

fn run_verify(args: &VerifyArgs) -> Result<i32> {
    let data = fs::read(&args.playbook)
        .with_context(|| format!("failed to read playbook file: {}", args.playbook.display()))?;
    let playbook = codec::decode(&data)?;

    if playbook.signatures.is_empty() {
        anyhow::bail!("the playbook carries no signatures");
    }

    let key = match &args.pubkey {
        Some(path) => {
            let pem = fs::read_to_string(path)
                .with_context(|| format!("failed to read key file: {}", path.display()))?;
            Some(PublicKey::from_public_key_pem(&pem)?)
        }
        None => None,
    };

    let indexes: Vec<usize> = match args.index {
        Some(i) => vec![i],
        None => (0..playbook.signatures.len()).collect(),
    };

    let mut code = SUCCESS;
    for i in indexes {
        let outcome = playbook.verify_signature(i, key.as_ref())?;
        if !args.quiet {
            let signee = playbook.signatures[i].signee.as_deref().unwrap_or("unknown signee");
            println!("signature {i} ({signee}): {outcome}");
        }
        if outcome != Verification::Valid {
            code = SIGNATURE_INVALID;
        }
    }
    Ok(code)
}
