use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cacao",
    version,
    about = "Create, validate, sign and verify CACAO security playbooks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode a playbook document and check its properties
    Validate(super::commands::validate::ValidateArgs),
    /// Sign a playbook document
    Sign(super::commands::sign::SignArgs),
    /// Verify the signatures of a playbook document
    Verify(super::commands::verify::VerifyArgs),
    /// Generate a signing keypair
    Keygen(super::commands::keygen::KeygenArgs),
    /// Print the version
    Version,
}
