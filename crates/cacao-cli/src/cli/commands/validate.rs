//! `cacao validate` - Decode a playbook and check its properties.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

use cacao_core::playbook::codec;

use crate::exit_codes::{FAILURE, SUCCESS};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Playbook document (JSON), or `-` for stdin
    #[arg(default_value = "-")]
    pub file: PathBuf,

    /// Also print the checks that passed
    #[arg(long)]
    pub debug: bool,
}

pub fn cmd_validate(args: &ValidateArgs) -> i32 {
    match run_validate(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            super::exit_code_for(&e)
        }
    }
}

fn run_validate(args: &ValidateArgs) -> Result<i32> {
    let data = read_input(&args.file)?;
    let playbook = codec::decode(&data)?;

    let (valid, count, details) = playbook.validate(args.debug);
    println!("Object valid: {valid}");
    println!("Error Count: {count}");
    println!();
    println!("Details:");
    for record in &details {
        println!("{record}");
    }

    if valid {
        Ok(SUCCESS)
    } else {
        Ok(FAILURE)
    }
}

fn read_input(file: &PathBuf) -> Result<Vec<u8>> {
    if file.as_os_str() == "-" {
        let mut data = Vec::new();
        std::io::stdin()
            .read_to_end(&mut data)
            .context("failed to read stdin")?;
        Ok(data)
    } else {
        fs::read(file).with_context(|| format!("failed to read playbook file: {}", file.display()))
    }
}
