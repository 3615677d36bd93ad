//! `cacao keygen` - Generate a keypair for playbook signing.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use cacao_core::PrivateKey;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Key type to generate
    #[arg(long, default_value = "rsa", value_parser = ["rsa", "p256", "p384", "p521"])]
    pub algorithm: String,

    /// RSA key size in bits (ignored for EC keys)
    #[arg(long, default_value_t = 2048)]
    pub bits: usize,

    /// Output directory for keypair files
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Force overwrite existing files
    #[arg(long, short)]
    pub force: bool,
}

pub fn cmd_keygen(args: &KeygenArgs) -> i32 {
    match run_keygen(args) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e:#}");
            super::exit_code_for(&e)
        }
    }
}

fn run_keygen(args: &KeygenArgs) -> Result<()> {
    if !args.out.exists() {
        fs::create_dir_all(&args.out)
            .with_context(|| format!("failed to create directory: {}", args.out.display()))?;
    }

    let private_path = args.out.join("private_key.pem");
    let public_path = args.out.join("public_key.pem");

    if !args.force {
        if private_path.exists() {
            anyhow::bail!(
                "private key already exists: {} (use --force to overwrite)",
                private_path.display()
            );
        }
        if public_path.exists() {
            anyhow::bail!(
                "public key already exists: {} (use --force to overwrite)",
                public_path.display()
            );
        }
    }

    let key = match args.algorithm.as_str() {
        "rsa" => PrivateKey::generate_rsa(args.bits)?,
        "p256" => PrivateKey::generate("ES256")?,
        "p384" => PrivateKey::generate("ES384")?,
        "p521" => PrivateKey::generate("ES512")?,
        other => anyhow::bail!("unknown key type: {other}"),
    };

    let private_pem = key.to_pkcs8_pem()?;
    let public_pem = key.public_key().to_public_key_pem()?;

    fs::write(&private_path, private_pem.as_bytes())
        .with_context(|| format!("failed to write private key: {}", private_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(&private_path, perms)
            .with_context(|| format!("failed to set permissions on: {}", private_path.display()))?;
    }

    fs::write(&public_path, public_pem)
        .with_context(|| format!("failed to write public key: {}", public_path.display()))?;

    println!("Generated {} keypair:", key.kind());
    println!(
        "  Private key: {} (PKCS#8 PEM, mode 0600)",
        private_path.display()
    );
    println!("  Public key:  {} (SPKI PEM)", public_path.display());

    Ok(())
}
