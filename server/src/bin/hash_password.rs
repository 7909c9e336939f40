// subvault_server/src/bin/hash_password.rs

//! Prints an argon2 PHC string for `STAFF_PASSWORD_HASH`.
//!
//! Usage: `hash_password <password>`, or pipe the password on stdin.

use std::io::{self, BufRead};

use anyhow::{bail, Context};
use subvault_server::services::auth_service::hash_password;

fn main() -> anyhow::Result<()> {
  let password = match std::env::args().nth(1) {
    Some(arg) => arg,
    None => {
      let mut line = String::new();
      io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
      line.trim_end_matches(['\r', '\n']).to_string()
    }
  };

  if password.is_empty() {
    bail!("Refusing to hash an empty password.");
  }

  let hash = hash_password(&password)?;
  println!("{}", hash);
  Ok(())
}
