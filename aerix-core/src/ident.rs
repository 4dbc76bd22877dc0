use rand::Rng;

/// Uppercase-alphanumeric alphabet shared by PNRs and ticket numbers.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// PNR length: the 6-character record locator handed to passengers.
pub const PNR_LEN: usize = 6;

/// Ticket numbers are longer; collisions are practically impossible but the
/// store is still probed before commit.
pub const TICKET_NUMBER_LEN: usize = 10;

/// How many candidates to try before giving up on a unique code.
pub const MAX_CODE_ATTEMPTS: usize = 16;

#[derive(Debug, thiserror::Error)]
#[error("no unique code found after {attempts} attempts")]
pub struct CodeSpaceExhausted {
    pub attempts: usize,
}

/// Generate one uniform random candidate code of `len` characters.
pub fn candidate(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Generate candidates until `is_taken` reports one free, bounded by
/// `MAX_CODE_ATTEMPTS`. The uniqueness probe is injected so callers can back
/// it with a store lookup and tests can script collisions.
pub fn unique_code<F>(len: usize, mut is_taken: F) -> Result<String, CodeSpaceExhausted>
where
    F: FnMut(&str) -> bool,
{
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = candidate(len);
        if !is_taken(&code) {
            return Ok(code);
        }
    }
    Err(CodeSpaceExhausted { attempts: MAX_CODE_ATTEMPTS })
}
