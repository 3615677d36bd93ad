use super::args::{Cli, Command};

pub mod keygen;
pub mod sign;
pub mod validate;
pub mod verify;

use crate::exit_codes::{DECODE_ERROR, SUCCESS};
use cacao_core::CacaoError;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Validate(args) => Ok(validate::cmd_validate(&args)),
        Command::Sign(args) => Ok(sign::cmd_sign(args)),
        Command::Verify(args) => Ok(verify::cmd_verify(&args)),
        Command::Keygen(args) => Ok(keygen::cmd_keygen(&args)),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}

/// Maps command errors onto the exit code contract. Domain errors carry
/// their own grouping; anything else is an input or usage problem.
pub(crate) fn exit_code_for(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<CacaoError>() {
        Some(err) => err.exit_code(),
        None => DECODE_ERROR,
    }
}
