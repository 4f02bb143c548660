//! Keysweep Basic Example
//!
//! Hide the low 16 bits of a DES key and recover them:
//! `keysweep::search(&prefix, &plaintext, &ciphertext, 16)`.

#![allow(clippy::pedantic, clippy::nursery)]

use keysweep::{BlockCipherOracle, Des, Keyspace};

fn main() -> Result<(), keysweep::SearchError> {
    let key = [0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
    let plaintext = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
    let ciphertext = Des.encrypt(&key, &plaintext);

    // Bytes 0 and 1 become unknown.
    let prefix = Keyspace::new(16)?.clear(&key);

    println!("Backend:    {}", keysweep::active_backend());
    println!("Prefix:     {}", hex::encode(prefix));
    match keysweep::search(&prefix, &plaintext, &ciphertext, 16)? {
        Some(found) => println!("Recovered:  {}", hex::encode(Des.normalize_key(&found))),
        None => println!("Not found"),
    }
    Ok(())
}
