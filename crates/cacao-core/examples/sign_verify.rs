//! Signs a playbook, verifies it, then shows tamper detection.

use cacao_core::playbook::codec;
use cacao_core::{Playbook, PrivateKey, Signature};

fn main() -> anyhow::Result<()> {
    let mut playbook = Playbook::new();
    playbook.name = Some("Block outbound beacon".to_string());
    playbook.add_playbook_types("mitigation");
    playbook.created_by = Some("identity--5abe695c-7bd5-4c31-8824-2528696cdbf1".to_string());

    let key = PrivateKey::generate("ES256")?;

    let mut signature = Signature::new();
    signature.signee = Some("ACME Cyber Company".to_string());
    signature.related_to = playbook.id.clone();
    signature.related_version = playbook.modified.clone();
    signature.public_keys = vec![key.public_key().to_spki_base64()?];
    playbook.sign("ES256", &key, signature)?;

    println!("{}", codec::encode_to_string(&playbook)?);
    println!();

    let outcome = playbook.verify_signature(0, None)?;
    println!("fresh signature: {outcome}");

    playbook.name = Some("Allow outbound beacon".to_string());
    let outcome = playbook.verify_signature(0, None)?;
    println!("after tampering: {outcome}");

    Ok(())
}
